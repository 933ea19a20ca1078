use crate::error::Result;
use tokenizers::Tokenizer;

pub trait SentimentAnalysisModel {
    type Options: std::fmt::Debug + Clone;

    fn new(options: Self::Options, device: candle_core::Device) -> Result<Self>
    where
        Self: Sized;

    /// Predict the most likely label and its probability.
    fn predict_with_score(
        &self,
        tokenizer: &Tokenizer,
        text: &str,
    ) -> Result<super::pipeline::SentimentResult>;

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer>;
}
