use super::pipeline::SummaryBounds;
use crate::error::Result;
use crate::pipelines::stats::GenerationStats;
use tokenizers::Tokenizer;

pub trait SummarizationModel {
    type Options: std::fmt::Debug + Clone;

    fn new(options: Self::Options, device: candle_core::Device) -> Result<Self>
    where
        Self: Sized;

    /// Generate a summary of `text` whose length in tokens respects `bounds`.
    fn summarize(
        &self,
        tokenizer: &Tokenizer,
        text: &str,
        bounds: SummaryBounds,
    ) -> Result<(String, GenerationStats)>;

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer>;
}
