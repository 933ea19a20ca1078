use crate::error::Result;
use tokenizers::Tokenizer;

/// `(label, score)` pairs sorted by descending score.
pub type LabelScores = Vec<(String, f32)>;

pub trait ZeroShotClassificationModel {
    type Options: std::fmt::Debug + Clone;

    fn new(options: Self::Options, device: candle_core::Device) -> Result<Self>
    where
        Self: Sized;

    /// Predict with normalized probabilities for single-label classification (probabilities sum to 1)
    fn predict(
        &self,
        tokenizer: &Tokenizer,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<LabelScores>;

    /// Predict with independent entailment probabilities for multi-label classification
    fn predict_multi_label(
        &self,
        tokenizer: &Tokenizer,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<LabelScores>;

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer>;
}
