use std::sync::Arc;

use super::Role;
use crate::analysis::{SentimentVerdict, Summary, TopicScore};
use crate::error::Result;
use crate::pipelines::sentiment::{SentimentAnalysisModel, SentimentAnalysisPipeline};
use crate::pipelines::summarization::{SummarizationModel, SummarizationPipeline, SummaryBounds};
use crate::pipelines::zero_shot::{ZeroShotClassificationModel, ZeroShotClassificationPipeline};

/// Single-label text classifier.
pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<SentimentVerdict>;
}

/// Zero-shot classifier scoring each label independently.
pub trait TopicClassifier: Send + Sync {
    /// One score per label, in any order.
    fn score_multi_label(&self, text: &str, labels: &[&str]) -> Result<Vec<TopicScore>>;
}

/// Abstractive summarizer.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str, bounds: SummaryBounds) -> Result<Summary>;
}

/// A constructed pipeline, shared read-only.
#[derive(Clone)]
pub enum PipelineHandle {
    Sentiment(Arc<dyn SentimentClassifier>),
    Summarizer(Arc<dyn Summarizer>),
    TopicClassifier(Arc<dyn TopicClassifier>),
}

impl PipelineHandle {
    pub fn role(&self) -> Role {
        match self {
            PipelineHandle::Sentiment(_) => Role::Sentiment,
            PipelineHandle::Summarizer(_) => Role::Summarizer,
            PipelineHandle::TopicClassifier(_) => Role::TopicClassifier,
        }
    }
}

impl std::fmt::Debug for PipelineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PipelineHandle").field(&self.role()).finish()
    }
}

impl<M> SentimentClassifier for SentimentAnalysisPipeline<M>
where
    M: SentimentAnalysisModel + Send + Sync,
{
    fn classify(&self, text: &str) -> Result<SentimentVerdict> {
        let output = self.run(text)?;
        tracing::debug!("sentiment inference took {:?}", output.stats.total_time);
        Ok(SentimentVerdict {
            label: output.prediction.label,
            score: output.prediction.score,
        })
    }
}

impl<M> TopicClassifier for ZeroShotClassificationPipeline<M>
where
    M: ZeroShotClassificationModel + Send + Sync,
{
    fn score_multi_label(&self, text: &str, labels: &[&str]) -> Result<Vec<TopicScore>> {
        let output = self.run_multi_label(text, labels)?;
        tracing::debug!(
            "topic scoring of {} labels took {:?}",
            output.stats.sequences,
            output.stats.total_time
        );
        Ok(output
            .predictions
            .into_iter()
            .map(|p| TopicScore {
                label: p.label,
                score: p.score,
            })
            .collect())
    }
}

impl<M> Summarizer for SummarizationPipeline<M>
where
    M: SummarizationModel + Send + Sync,
{
    fn summarize(&self, text: &str, bounds: SummaryBounds) -> Result<Summary> {
        let output = self.run(text, bounds)?;
        tracing::debug!(
            "summary: {} prompt tokens, {} generated, {:.1} tok/s",
            output.stats.prompt_tokens,
            output.stats.tokens_generated,
            output.stats.tokens_per_second
        );
        Ok(Summary {
            text: output.summary,
            tokens_generated: output.stats.tokens_generated,
        })
    }
}
