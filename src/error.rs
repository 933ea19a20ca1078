//! Error types for this crate.
//!
//! Two layers:
//! - [`PipelineError`] is what a model or pipeline reports (download, tokenization,
//!   device, generation failures).
//! - [`AnalysisError`] is what the [`AnalysisFacade`](crate::analysis::AnalysisFacade)
//!   reports, tagged with the pipeline [`Role`] it came from.
//!
//! # Example
//!
//! ```rust,no_run
//! use earnings_lens::error::AnalysisError;
//!
//! fn render(e: &AnalysisError) {
//!     eprintln!("{}", e.user_message());
//!     if let Some(detail) = e.detail() {
//!         eprintln!("  {detail}");
//!     }
//! }
//! ```

use std::time::Duration;

use thiserror::Error;

use crate::registry::Role;

/// A [`Result`](std::result::Result) alias using [`PipelineError`] as the error type.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised while loading or running a single pipeline.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    /// Network or download failure.
    #[error("{0}")]
    Download(String),

    /// Tokenizer could not be loaded or could not encode/decode the input.
    #[error("{0}")]
    Tokenization(String),

    /// Device initialization failure. Fall back to CPU.
    #[error("{0}")]
    Device(String),

    /// Text generation failed mid-decode.
    #[error("{0}")]
    Generation(String),

    /// Checkpoint or user configuration is unusable.
    #[error("{0}")]
    Config(String),

    /// Internal error. Report if seen.
    #[error("{0}")]
    Unexpected(String),
}

impl From<hf_hub::api::sync::ApiError> for PipelineError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        PipelineError::Download(format!("HuggingFace API error: {}", value))
    }
}

impl From<candle_core::Error> for PipelineError {
    fn from(value: candle_core::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(value: std::io::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(value: serde_json::Error) -> Self {
        PipelineError::Config(format!("Malformed model config: {}", value))
    }
}

/// Errors surfaced by an analysis request.
///
/// `Construction` and `EmptyInput` stop the whole request. `Inference` and
/// `Timeout` are reported per sub-operation inside an
/// [`AnalysisReport`](crate::analysis::AnalysisReport).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AnalysisError {
    /// A pipeline could not be built from its configured model.
    #[error("failed to load the {role} pipeline from '{model}': {source}")]
    Construction {
        /// Pipeline that failed to build.
        role: Role,
        /// Model identifier it was bound to.
        model: String,
        /// Underlying failure.
        #[source]
        source: PipelineError,
    },

    /// Normalized input was empty.
    #[error("input text is empty")]
    EmptyInput,

    /// A pipeline failed while running on this input.
    #[error("{role} inference failed: {source}")]
    Inference {
        /// Pipeline that failed.
        role: Role,
        /// Underlying failure.
        #[source]
        source: PipelineError,
    },

    /// A pipeline did not answer within the configured timeout.
    #[error("{role} did not finish within {after:?}")]
    Timeout {
        /// Pipeline that timed out.
        role: Role,
        /// Configured limit.
        after: Duration,
    },
}

impl AnalysisError {
    /// Short message meant for the person who pasted the text.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Construction { role, .. } => {
                format!("Could not load the {} model.", role.display_name())
            }
            AnalysisError::EmptyInput => "Please paste some text.".to_string(),
            AnalysisError::Inference {
                role: Role::Summarizer,
                ..
            } => "Summarization failed. Try shorter text.".to_string(),
            AnalysisError::Inference { role, .. } => {
                format!("{} failed.", role.display_name())
            }
            AnalysisError::Timeout { role, after } => format!(
                "{} took longer than {}s and was abandoned.",
                role.display_name(),
                after.as_secs()
            ),
        }
    }

    /// Raw underlying error text, if there is one.
    pub fn detail(&self) -> Option<String> {
        match self {
            AnalysisError::Construction { source, .. } | AnalysisError::Inference { source, .. } => {
                Some(source.to_string())
            }
            AnalysisError::EmptyInput | AnalysisError::Timeout { .. } => None,
        }
    }

    /// Pipeline this error belongs to, if any.
    pub fn role(&self) -> Option<Role> {
        match self {
            AnalysisError::Construction { role, .. }
            | AnalysisError::Inference { role, .. }
            | AnalysisError::Timeout { role, .. } => Some(*role),
            AnalysisError::EmptyInput => None,
        }
    }
}
