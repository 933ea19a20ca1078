use super::model::SentimentAnalysisModel;
use crate::error::Result;
use crate::pipelines::stats::PipelineStats;
use tokenizers::Tokenizer;

/// Raw label/score pair as a model reports it.
#[derive(Debug, Clone)]
pub struct SentimentResult {
    pub label: String,
    pub score: f32,
}

// ============ Output types ============

/// A sentiment prediction with label and confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// The predicted label as named by the checkpoint (e.g. "positive", "negative", "neutral").
    pub label: String,
    /// Confidence score (0.0 to 1.0).
    pub score: f32,
}

/// Output from `run()`.
#[derive(Debug)]
pub struct Output {
    /// Sentiment prediction.
    pub prediction: Prediction,
    /// Execution statistics.
    pub stats: PipelineStats,
}

// ============ Pipeline ============

/// Classifies text sentiment.
///
/// Construct with [`SentimentAnalysisPipelineBuilder`](super::SentimentAnalysisPipelineBuilder).
///
/// ```rust,no_run
/// # use earnings_lens::pipelines::sentiment::SentimentAnalysisPipelineBuilder;
/// # fn main() -> earnings_lens::error::Result<()> {
/// let pipeline = SentimentAnalysisPipelineBuilder::bert("ProsusAI/finbert").build()?;
///
/// let output = pipeline.run("Operating margin expanded 120 basis points.")?;
/// println!("{}: {:.2}", output.prediction.label, output.prediction.score);
/// # Ok(())
/// # }
/// ```
pub struct SentimentAnalysisPipeline<M: SentimentAnalysisModel> {
    pub(crate) model: M,
    pub(crate) tokenizer: Tokenizer,
}

impl<M: SentimentAnalysisModel> SentimentAnalysisPipeline<M> {
    /// Analyze text sentiment.
    pub fn run(&self, text: &str) -> Result<Output> {
        let stats_builder = PipelineStats::start();

        let result = self.model.predict_with_score(&self.tokenizer, text)?;

        Ok(Output {
            prediction: Prediction {
                label: result.label,
                score: result.score,
            },
            stats: stats_builder.finish(1),
        })
    }
}
