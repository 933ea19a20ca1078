//! Sentiment, topic focus and abstractive summaries for financial text.
//!
//! Paste an earnings-call transcript (or any financial prose) and get three views
//! of it, each from a local [Candle](https://github.com/huggingface/candle)
//! pipeline pulled from the Hugging Face Hub:
//!
//! - a sentiment label with its confidence,
//! - a ranked relevance score for each selected topic (zero-shot, multi-label),
//! - a short abstractive summary.
//!
//! [`analysis::AnalysisFacade`] is the entry point. Pipelines are built lazily by a
//! [`registry::PipelineRegistry`] and reused for every later request.

// ============ Internal API ============

pub(crate) mod loaders;
pub(crate) mod models;

// ============ Public API ============

pub mod analysis;
pub mod config;
pub mod error;
pub mod normalize;
pub mod pipelines;
pub mod registry;
pub mod topics;

pub use analysis::{AnalysisFacade, AnalysisOptions, AnalysisReport, TopicFocus};
pub use config::PipelineConfig;
pub use error::{AnalysisError, PipelineError};
pub use normalize::NormalizedInput;
pub use registry::{PipelineRegistry, Role};
pub use topics::{Topic, TopicSet};
