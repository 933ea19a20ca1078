use std::sync::Arc;

use super::handles::{SentimentClassifier, Summarizer, TopicClassifier};
use crate::error::Result;
use crate::pipelines::sentiment::SentimentAnalysisPipelineBuilder;
use crate::pipelines::summarization::SummarizationPipelineBuilder;
use crate::pipelines::utils::DeviceRequest;
use crate::pipelines::zero_shot::ZeroShotClassificationPipelineBuilder;

/// Builds a pipeline for a role from a model identifier.
///
/// Each call is a full, blocking construction. Memoization is the registry's job.
pub trait PipelineLoader: Send + Sync {
    fn load_sentiment(&self, model_id: &str) -> Result<Arc<dyn SentimentClassifier>>;

    fn load_summarizer(&self, model_id: &str) -> Result<Arc<dyn Summarizer>>;

    fn load_topic_classifier(&self, model_id: &str) -> Result<Arc<dyn TopicClassifier>>;
}

/// Loads checkpoints from the Hugging Face Hub and runs them with candle.
#[derive(Debug, Clone, Copy, Default)]
pub struct HubLoader {
    device: DeviceRequest,
}

impl HubLoader {
    pub fn new(device: DeviceRequest) -> Self {
        Self { device }
    }
}

impl PipelineLoader for HubLoader {
    fn load_sentiment(&self, model_id: &str) -> Result<Arc<dyn SentimentClassifier>> {
        let pipeline = SentimentAnalysisPipelineBuilder::bert(model_id)
            .with_device(self.device)
            .build()?;
        Ok(Arc::new(pipeline))
    }

    fn load_summarizer(&self, model_id: &str) -> Result<Arc<dyn Summarizer>> {
        let pipeline = SummarizationPipelineBuilder::t5(model_id)
            .with_device(self.device)
            .build()?;
        Ok(Arc::new(pipeline))
    }

    fn load_topic_classifier(&self, model_id: &str) -> Result<Arc<dyn TopicClassifier>> {
        let pipeline = ZeroShotClassificationPipelineBuilder::modernbert(model_id)
            .with_device(self.device)
            .build()?;
        Ok(Arc::new(pipeline))
    }
}
