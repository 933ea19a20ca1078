//! Sentiment analysis pipeline.
//!
//! Classify text with a fine-tuned sequence-classification checkpoint. Labels come
//! from the checkpoint's own `id2label` map (FinBERT uses `positive`, `negative`,
//! `neutral`), paired with the probability of the winning class.
//!
//! ```rust,no_run
//! use earnings_lens::pipelines::sentiment::SentimentAnalysisPipelineBuilder;
//!
//! # fn main() -> earnings_lens::error::Result<()> {
//! let pipeline = SentimentAnalysisPipelineBuilder::bert("ProsusAI/finbert").build()?;
//! let output = pipeline.run("Free cash flow came in well ahead of guidance.")?;
//! println!("sentiment: {} (confidence: {:.2})", output.prediction.label, output.prediction.score);
//! # Ok(())
//! # }
//! ```
//!
//! | Model | Builder Method |
//! |-------|----------------|
//! | BERT (FinBERT family) | [`SentimentAnalysisPipelineBuilder::bert`] |

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod model;
pub(crate) mod pipeline;

// ============ Public API ============

pub use crate::pipelines::stats::PipelineStats;
pub use builder::SentimentAnalysisPipelineBuilder;
pub use model::SentimentAnalysisModel;
pub use pipeline::{Output, Prediction, SentimentAnalysisPipeline, SentimentResult};

/// Only for generic annotations. Use [`SentimentAnalysisPipelineBuilder::bert`].
pub type SentimentBert = crate::models::bert::SentimentBertModel;
