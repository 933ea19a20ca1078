use super::model::ZeroShotClassificationModel;
use super::pipeline::ZeroShotClassificationPipeline;
use crate::error::Result;
use crate::pipelines::utils::{BasePipelineBuilder, DeviceRequest, StandardPipelineBuilder};

crate::pipelines::utils::impl_device_methods!(delegated: ZeroShotClassificationPipelineBuilder<M: ZeroShotClassificationModel>);

/// Builder for creating [`ZeroShotClassificationPipeline`] instances.
///
/// Use [`Self::modernbert`] as the entry point.
pub struct ZeroShotClassificationPipelineBuilder<M: ZeroShotClassificationModel>(
    StandardPipelineBuilder<M::Options>,
);

impl<M: ZeroShotClassificationModel> ZeroShotClassificationPipelineBuilder<M> {
    pub(crate) fn new(options: M::Options) -> Self {
        Self(StandardPipelineBuilder::new(options))
    }

    /// Builds the pipeline with configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if model loading or device initialization fails.
    pub fn build(self) -> Result<ZeroShotClassificationPipeline<M>> {
        BasePipelineBuilder::build(self)
    }
}

impl<M: ZeroShotClassificationModel> BasePipelineBuilder
    for ZeroShotClassificationPipelineBuilder<M>
{
    type Model = M;
    type Pipeline = ZeroShotClassificationPipeline<M>;
    type Options = M::Options;

    fn options(&self) -> &Self::Options {
        &self.0.options
    }

    fn device_request(&self) -> DeviceRequest {
        self.0.device_request
    }

    fn create_model(options: Self::Options, device: candle_core::Device) -> Result<M> {
        M::new(options, device)
    }

    fn get_tokenizer(options: Self::Options) -> Result<tokenizers::Tokenizer> {
        M::get_tokenizer(options)
    }

    fn construct_pipeline(model: M, tokenizer: tokenizers::Tokenizer) -> Result<Self::Pipeline> {
        Ok(ZeroShotClassificationPipeline { model, tokenizer })
    }
}

impl ZeroShotClassificationPipelineBuilder<super::ZeroShotModernBert> {
    /// Creates a builder for a ModernBERT NLI checkpoint.
    pub fn modernbert(model_id: impl Into<String>) -> Self {
        Self::new(model_id.into())
    }
}
