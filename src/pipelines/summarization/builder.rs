use super::model::SummarizationModel;
use super::pipeline::SummarizationPipeline;
use crate::error::Result;
use crate::pipelines::utils::{BasePipelineBuilder, DeviceRequest, StandardPipelineBuilder};

crate::pipelines::utils::impl_device_methods!(delegated: SummarizationPipelineBuilder<M: SummarizationModel>);

/// Builder for creating [`SummarizationPipeline`] instances.
///
/// Use [`Self::t5`] as the entry point.
pub struct SummarizationPipelineBuilder<M: SummarizationModel>(StandardPipelineBuilder<M::Options>);

impl<M: SummarizationModel> SummarizationPipelineBuilder<M> {
    pub(crate) fn new(options: M::Options) -> Self {
        Self(StandardPipelineBuilder::new(options))
    }

    /// Builds the pipeline with configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if model loading or device initialization fails.
    pub fn build(self) -> Result<SummarizationPipeline<M>> {
        BasePipelineBuilder::build(self)
    }
}

impl<M: SummarizationModel> BasePipelineBuilder for SummarizationPipelineBuilder<M> {
    type Model = M;
    type Pipeline = SummarizationPipeline<M>;
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
        Ok(SummarizationPipeline { model, tokenizer })
    }
}

impl SummarizationPipelineBuilder<super::SummarizerT5> {
    /// Creates a builder for a T5 conditional-generation checkpoint.
    pub fn t5(model_id: impl Into<String>) -> Self {
        Self::new(model_id.into())
    }
}
