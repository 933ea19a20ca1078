//! Lazily constructed, memoized pipelines.
//!
//! A [`PipelineRegistry`] owns at most one pipeline per [`Role`] for its whole
//! lifetime. The first request for a role builds it through the configured
//! [`PipelineLoader`]; later requests get the same `Arc` back. Concurrent first
//! requests for a role block on a single construction.
//!
//! ```rust,no_run
//! use earnings_lens::config::PipelineConfig;
//! use earnings_lens::registry::{PipelineRegistry, Role};
//!
//! let registry = PipelineRegistry::new(PipelineConfig::default());
//! let sentiment = registry.sentiment()?;
//! assert!(registry.is_loaded(Role::Sentiment));
//! # Ok::<(), earnings_lens::error::AnalysisError>(())
//! ```

mod handles;
mod loader;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::{AnalysisError, Result};

pub use handles::{PipelineHandle, SentimentClassifier, Summarizer, TopicClassifier};
pub use loader::{HubLoader, PipelineLoader};

/// The three pipelines an analysis uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Sentiment,
    Summarizer,
    TopicClassifier,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Sentiment, Role::Summarizer, Role::TopicClassifier];

    /// Stable identifier used in logs and configuration errors.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Sentiment => "sentiment",
            Role::Summarizer => "summarizer",
            Role::TopicClassifier => "topic_classifier",
        }
    }

    /// Human-readable name for user-facing messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Role::Sentiment => "Sentiment analysis",
            Role::Summarizer => "Summarization",
            Role::TopicClassifier => "Topic scoring",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct PipelineRegistry {
    config: PipelineConfig,
    loader: Arc<dyn PipelineLoader>,
    sentiment: OnceCell<Arc<dyn SentimentClassifier>>,
    summarizer: OnceCell<Arc<dyn Summarizer>>,
    topic_classifier: OnceCell<Arc<dyn TopicClassifier>>,
}

impl PipelineRegistry {
    /// Registry that loads from the Hugging Face Hub on CPU.
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_loader(config, Arc::new(HubLoader::default()))
    }

    pub fn with_loader(config: PipelineConfig, loader: Arc<dyn PipelineLoader>) -> Self {
        Self {
            config,
            loader,
            sentiment: OnceCell::new(),
            summarizer: OnceCell::new(),
            topic_classifier: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Handle for `role`, constructing it on first use.
    pub fn get(&self, role: Role) -> std::result::Result<PipelineHandle, AnalysisError> {
        Ok(match role {
            Role::Sentiment => PipelineHandle::Sentiment(self.sentiment()?),
            Role::Summarizer => PipelineHandle::Summarizer(self.summarizer()?),
            Role::TopicClassifier => PipelineHandle::TopicClassifier(self.topic_classifier()?),
        })
    }

    pub fn sentiment(&self) -> std::result::Result<Arc<dyn SentimentClassifier>, AnalysisError> {
        self.sentiment
            .get_or_try_init(|| {
                self.construct(Role::Sentiment, |loader, model| loader.load_sentiment(model))
            })
            .cloned()
    }

    pub fn summarizer(&self) -> std::result::Result<Arc<dyn Summarizer>, AnalysisError> {
        self.summarizer
            .get_or_try_init(|| {
                self.construct(Role::Summarizer, |loader, model| loader.load_summarizer(model))
            })
            .cloned()
    }

    pub fn topic_classifier(&self) -> std::result::Result<Arc<dyn TopicClassifier>, AnalysisError> {
        self.topic_classifier
            .get_or_try_init(|| {
                self.construct(Role::TopicClassifier, |loader, model| {
                    loader.load_topic_classifier(model)
                })
            })
            .cloned()
    }

    /// Whether `role` has been constructed.
    pub fn is_loaded(&self, role: Role) -> bool {
        match role {
            Role::Sentiment => self.sentiment.get().is_some(),
            Role::Summarizer => self.summarizer.get().is_some(),
            Role::TopicClassifier => self.topic_classifier.get().is_some(),
        }
    }

    /// Construct every role now, stopping at the first failure.
    pub fn warm_up(&self) -> std::result::Result<(), AnalysisError> {
        for role in Role::ALL {
            self.get(role)?;
        }
        Ok(())
    }

    fn construct<T>(
        &self,
        role: Role,
        load: impl FnOnce(&dyn PipelineLoader, &str) -> Result<T>,
    ) -> std::result::Result<T, AnalysisError> {
        let model = self.config.model_for(role);
        info!("Loading {} pipeline from {}", role, model);
        let start = Instant::now();

        match load(self.loader.as_ref(), model) {
            Ok(handle) => {
                info!(
                    "{} pipeline ready ({}, {:.2}s)",
                    role,
                    model,
                    start.elapsed().as_secs_f64()
                );
                Ok(handle)
            }
            Err(source) => {
                warn!("Failed to load {} pipeline from {}: {}", role, model, source);
                Err(AnalysisError::Construction {
                    role,
                    model: model.to_string(),
                    source,
                })
            }
        }
    }
}

impl fmt::Debug for PipelineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loaded: Vec<Role> = Role::ALL
            .into_iter()
            .filter(|r| self.is_loaded(*r))
            .collect();
        f.debug_struct("PipelineRegistry")
            .field("config", &self.config)
            .field("loaded", &loaded)
            .finish()
    }
}
