use super::model::ZeroShotClassificationModel;
use crate::error::Result;
use crate::pipelines::stats::PipelineStats;
use tokenizers::Tokenizer;

// ============ Output types ============

/// A label with confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Label name.
    pub label: String,
    /// Confidence score (0.0 to 1.0).
    pub score: f32,
}

/// Output from `run()` or `run_multi_label()`.
#[derive(Debug)]
pub struct Output {
    /// All labels ranked by confidence.
    pub predictions: Vec<Prediction>,
    /// Execution statistics.
    pub stats: PipelineStats,
}

// ============ Pipeline ============

/// Classifies text into arbitrary categories without training.
///
/// Construct with [`ZeroShotClassificationPipelineBuilder`](super::ZeroShotClassificationPipelineBuilder).
///
/// ```rust,no_run
/// # use earnings_lens::pipelines::zero_shot::ZeroShotClassificationPipelineBuilder;
/// # fn main() -> earnings_lens::error::Result<()> {
/// let pipeline = ZeroShotClassificationPipelineBuilder::modernbert(
///     "MoritzLaurer/ModernBERT-base-zeroshot-v2.0",
/// )
/// .build()?;
/// let labels = &["Pricing", "Demand", "Margins"];
///
/// let output = pipeline.run_multi_label("We took two price increases this year.", labels)?;
/// for p in &output.predictions {
///     println!("{}: {:.3}", p.label, p.score);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ZeroShotClassificationPipeline<M: ZeroShotClassificationModel> {
    pub(crate) model: M,
    pub(crate) tokenizer: Tokenizer,
}

impl<M: ZeroShotClassificationModel> ZeroShotClassificationPipeline<M> {
    /// Classify into one label (scores sum to 1.0).
    pub fn run(&self, text: &str, candidate_labels: &[&str]) -> Result<Output> {
        self.run_internal(text, candidate_labels, false)
    }

    /// Classify with independent probabilities (scores don't sum to 1.0).
    ///
    /// Use when text can match multiple categories.
    pub fn run_multi_label(&self, text: &str, candidate_labels: &[&str]) -> Result<Output> {
        self.run_internal(text, candidate_labels, true)
    }

    fn run_internal(&self, text: &str, candidate_labels: &[&str], multi_label: bool) -> Result<Output> {
        let stats_builder = PipelineStats::start();

        let scores = if multi_label {
            self.model
                .predict_multi_label(&self.tokenizer, text, candidate_labels)?
        } else {
            self.model.predict(&self.tokenizer, text, candidate_labels)?
        };

        let predictions = scores
            .into_iter()
            .map(|(label, score)| Prediction { label, score })
            .collect();

        Ok(Output {
            predictions,
            stats: stats_builder.finish(candidate_labels.len()),
        })
    }
}
