//! Model source identifiers for the three pipeline roles.
//!
//! This is the whole external configuration surface of the registry. It can be
//! built in code, or read from a TOML file:
//!
//! ```toml
//! sentiment_model = "ProsusAI/finbert"
//! summarizer_model = "google-t5/t5-small"
//! topic_model = "MoritzLaurer/ModernBERT-base-zeroshot-v2.0"
//! ```
//!
//! Missing keys fall back to [`PipelineConfig::default`].

use std::path::Path;

use serde::Deserialize;

use crate::error::{PipelineError, Result};
use crate::registry::Role;

/// Fine-tuned FinBERT sentiment checkpoint.
pub const DEFAULT_SENTIMENT_MODEL: &str = "mparkai/FinalProjectMijiPark";
/// General-purpose T5 summarizer.
pub const DEFAULT_SUMMARIZER_MODEL: &str = "google-t5/t5-small";
/// General-purpose ModernBERT NLI checkpoint for zero-shot scoring.
pub const DEFAULT_TOPIC_MODEL: &str = "MoritzLaurer/ModernBERT-large-zeroshot-v2.0";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub sentiment_model: String,
    pub summarizer_model: String,
    pub topic_model: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sentiment_model: DEFAULT_SENTIMENT_MODEL.to_string(),
            summarizer_model: DEFAULT_SUMMARIZER_MODEL.to_string(),
            topic_model: DEFAULT_TOPIC_MODEL.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| PipelineError::Config(format!("Invalid pipeline config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("Failed to read '{}': {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Model identifier bound to `role`.
    pub fn model_for(&self, role: Role) -> &str {
        match role {
            Role::Sentiment => &self.sentiment_model,
            Role::Summarizer => &self.summarizer_model,
            Role::TopicClassifier => &self.topic_model,
        }
    }

    /// Replace the identifier for `role`.
    pub fn set_model(&mut self, role: Role, model: impl Into<String>) {
        let model = model.into();
        match role {
            Role::Sentiment => self.sentiment_model = model,
            Role::Summarizer => self.summarizer_model = model,
            Role::TopicClassifier => self.topic_model = model,
        }
    }

    /// Reject blank identifiers.
    pub fn validate(&self) -> Result<()> {
        for role in Role::ALL {
            if self.model_for(role).trim().is_empty() {
                return Err(PipelineError::Config(format!(
                    "Model identifier for '{role}' is empty"
                )));
            }
        }
        Ok(())
    }
}
