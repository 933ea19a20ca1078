//! Abstractive summarization pipeline.
//!
//! Generates new text that condenses the input, using greedy decoding so the same
//! input always yields the same summary. Length is bounded in tokens by
//! [`SummaryBounds`].
//!
//! | Model | Builder Method |
//! |-------|----------------|
//! | T5 | [`SummarizationPipelineBuilder::t5`] |

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod model;
pub(crate) mod pipeline;

// ============ Public API ============

pub use crate::pipelines::stats::GenerationStats;
pub use builder::SummarizationPipelineBuilder;
pub use model::SummarizationModel;
pub use pipeline::{Output, SummarizationPipeline, SummaryBounds};

/// Only for generic annotations. Use [`SummarizationPipelineBuilder::t5`].
pub type SummarizerT5 = crate::models::t5::SummarizerT5Model;
