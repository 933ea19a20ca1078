//! Zero-shot text classification pipeline.
//!
//! Classify text into categories you define at runtime, no training required.
//! Each candidate label becomes an NLI hypothesis (`"This example is {label}."`)
//! scored against the text as premise.
//!
//! # Single-Label vs Multi-Label
//!
//! **Single-label** (`run`): Scores sum to 1.0 - use when categories are mutually exclusive.
//!
//! **Multi-label** (`run_multi_label`): Independent probabilities - use when multiple labels can apply.
//!
//! | Model | Builder Method |
//! |-------|----------------|
//! | ModernBERT | [`ZeroShotClassificationPipelineBuilder::modernbert`] |

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod model;
pub(crate) mod pipeline;

// ============ Public API ============

pub use crate::pipelines::stats::PipelineStats;
pub use builder::ZeroShotClassificationPipelineBuilder;
pub use model::{LabelScores, ZeroShotClassificationModel};
pub use pipeline::{Output, Prediction, ZeroShotClassificationPipeline};

/// Only for generic annotations. Use [`ZeroShotClassificationPipelineBuilder::modernbert`].
pub type ZeroShotModernBert = crate::models::modernbert::ZeroShotModernBertModel;
