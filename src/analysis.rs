//! The analysis facade: one request in, three independent views out.
//!
//! [`AnalysisFacade::run`] normalizes pasted text, acquires the pipelines it needs
//! from a shared [`PipelineRegistry`], and runs sentiment, topic focus and summary
//! side by side on blocking workers. Each view carries its own `Result`, so a
//! failing summarizer still leaves sentiment and topics usable.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use earnings_lens::analysis::AnalysisFacade;
//! use earnings_lens::config::PipelineConfig;
//! use earnings_lens::registry::PipelineRegistry;
//! use earnings_lens::topics::TopicSet;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), earnings_lens::error::AnalysisError> {
//! let registry = Arc::new(PipelineRegistry::new(PipelineConfig::default()));
//! let facade = AnalysisFacade::new(registry);
//!
//! let report = facade
//!     .run("Pricing held up, but input costs squeezed margins.", &TopicSet::default_selection())
//!     .await?;
//! if let Ok(verdict) = &report.sentiment {
//!     println!("{} ({:.2})", verdict.label, verdict.score);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::error::{AnalysisError, PipelineError};
use crate::normalize::{NormalizedInput, DEFAULT_MAX_CHARS};
use crate::pipelines::summarization::SummaryBounds;
use crate::registry::{PipelineRegistry, Role};
use crate::topics::TopicSet;

/// Most topic scores returned per request.
pub const TOP_TOPICS: usize = 7;

// ============ Result types ============

/// Sentiment label and confidence, exactly as the model reports them.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentVerdict {
    pub label: String,
    /// Probability in `[0, 1]`.
    pub score: f32,
}

/// Relevance of one topic to the text.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicScore {
    pub label: String,
    /// Independent probability in `[0, 1]`.
    pub score: f32,
}

/// A generated summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub text: String,
    /// Tokens produced by the decoder, end token excluded.
    pub tokens_generated: usize,
}

/// Topic view of an analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum TopicFocus {
    /// Scores sorted by descending relevance.
    Ranked(Vec<TopicScore>),
    /// The request carried no topics, so the classifier was not run.
    NoTopicsSelected,
}

impl TopicFocus {
    pub fn scores(&self) -> &[TopicScore] {
        match self {
            TopicFocus::Ranked(scores) => scores,
            TopicFocus::NoTopicsSelected => &[],
        }
    }

    /// Message to show in place of scores, if any.
    pub fn warning(&self) -> Option<&'static str> {
        match self {
            TopicFocus::Ranked(_) => None,
            TopicFocus::NoTopicsSelected => Some("Select at least one topic."),
        }
    }
}

/// Three views of one input, each succeeding or failing on its own.
#[derive(Debug)]
pub struct AnalysisReport {
    pub sentiment: Result<SentimentVerdict, AnalysisError>,
    pub topics: Result<TopicFocus, AnalysisError>,
    pub summary: Result<Summary, AnalysisError>,
}

// ============ Facade ============

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Character budget applied by [`AnalysisFacade::run`].
    pub max_chars: usize,
    /// Topic scores kept after ranking.
    pub top_topics: usize,
    pub summary_bounds: SummaryBounds,
    /// Limit for each sub-operation. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            top_topics: TOP_TOPICS,
            summary_bounds: SummaryBounds::default(),
            timeout: None,
        }
    }
}

pub struct AnalysisFacade {
    registry: Arc<PipelineRegistry>,
    options: AnalysisOptions,
}

impl AnalysisFacade {
    pub fn new(registry: Arc<PipelineRegistry>) -> Self {
        Self::with_options(registry, AnalysisOptions::default())
    }

    pub fn with_options(registry: Arc<PipelineRegistry>, options: AnalysisOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &Arc<PipelineRegistry> {
        &self.registry
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Normalize `raw` with the configured budget, then [`analyze`](Self::analyze) it.
    pub async fn run(
        &self,
        raw: &str,
        topics: &TopicSet,
    ) -> Result<AnalysisReport, AnalysisError> {
        let input = NormalizedInput::new(raw, self.options.max_chars);
        self.analyze(&input, topics).await
    }

    /// Run all three views over already normalized input.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::EmptyInput`] before anything is loaded when `input` is
    /// blank, and [`AnalysisError::Construction`] when a needed pipeline cannot be
    /// built. Inference failures are reported inside the [`AnalysisReport`].
    pub async fn analyze(
        &self,
        input: &NormalizedInput,
        topics: &TopicSet,
    ) -> Result<AnalysisReport, AnalysisError> {
        if input.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let sentiment = self.acquire(Role::Sentiment, |r| r.sentiment()).await?;
        let summarizer = self.acquire(Role::Summarizer, |r| r.summarizer()).await?;
        let topic_classifier = if topics.is_empty() {
            None
        } else {
            Some(
                self.acquire(Role::TopicClassifier, |r| r.topic_classifier())
                    .await?,
            )
        };

        let text: Arc<str> = Arc::from(input.as_str());

        let sentiment_fut = {
            let text = Arc::clone(&text);
            self.invoke(Role::Sentiment, move || sentiment.classify(&text))
        };

        let summary_fut = {
            let text = Arc::clone(&text);
            let bounds = self.options.summary_bounds;
            self.invoke(Role::Summarizer, move || summarizer.summarize(&text, bounds))
        };

        let topics_fut = async {
            match topic_classifier {
                None => Ok(TopicFocus::NoTopicsSelected),
                Some(classifier) => {
                    let text = Arc::clone(&text);
                    let labels: Vec<String> = topics.iter().map(str::to_owned).collect();
                    let top = self.options.top_topics;
                    self.invoke(Role::TopicClassifier, move || {
                        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
                        classifier.score_multi_label(&text, &labels)
                    })
                    .await
                    .map(|scores| TopicFocus::Ranked(rank_topics(scores, top)))
                }
            }
        };

        let (sentiment, topics, summary) = tokio::join!(sentiment_fut, topics_fut, summary_fut);

        Ok(AnalysisReport {
            sentiment,
            topics,
            summary,
        })
    }

    /// Get a handle from the registry without blocking the async runtime.
    async fn acquire<T, F>(&self, role: Role, get: F) -> Result<T, AnalysisError>
    where
        T: Send + 'static,
        F: FnOnce(&PipelineRegistry) -> Result<T, AnalysisError> + Send + 'static,
    {
        let registry = Arc::clone(&self.registry);
        match tokio::task::spawn_blocking(move || get(registry.as_ref())).await {
            Ok(result) => result,
            Err(e) => Err(AnalysisError::Construction {
                role,
                model: self.registry.config().model_for(role).to_string(),
                source: PipelineError::Unexpected(format!("construction worker failed: {e}")),
            }),
        }
    }

    /// Run one sub-operation on a blocking worker, bounded by the configured timeout.
    async fn invoke<T, F>(&self, role: Role, work: F) -> Result<T, AnalysisError>
    where
        T: Send + 'static,
        F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    {
        let task = tokio::task::spawn_blocking(work);
        let joined = match self.options.timeout {
            Some(after) => match tokio::time::timeout(after, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!("{} did not finish within {:?}", role, after);
                    return Err(AnalysisError::Timeout { role, after });
                }
            },
            None => task.await,
        };

        let source = match joined {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e,
            Err(e) => PipelineError::Unexpected(format!("inference worker failed: {e}")),
        };
        warn!("{} inference failed: {}", role, source);
        Err(AnalysisError::Inference { role, source })
    }
}

/// Sort by descending score, keeping at most `limit` entries. Ties keep input order.
pub fn rank_topics(mut scores: Vec<TopicScore>, limit: usize) -> Vec<TopicScore> {
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores.truncate(limit);
    scores
}
