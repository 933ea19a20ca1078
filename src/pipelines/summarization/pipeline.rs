use super::model::SummarizationModel;
use crate::error::{PipelineError, Result};
use crate::pipelines::stats::GenerationStats;
use tokenizers::Tokenizer;

/// Length limits for a generated summary, in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryBounds {
    /// End-of-sequence is suppressed until this many tokens exist.
    pub min_length: usize,
    /// Generation stops here even without an end token.
    pub max_length: usize,
}

impl Default for SummaryBounds {
    fn default() -> Self {
        Self {
            min_length: 50,
            max_length: 140,
        }
    }
}

impl SummaryBounds {
    pub fn new(min_length: usize, max_length: usize) -> Result<Self> {
        let bounds = Self {
            min_length,
            max_length,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_length == 0 {
            return Err(PipelineError::Config(
                "max_length must be at least 1".to_string(),
            ));
        }
        if self.min_length > self.max_length {
            return Err(PipelineError::Config(format!(
                "min_length ({}) exceeds max_length ({})",
                self.min_length, self.max_length
            )));
        }
        Ok(())
    }
}

// ============ Output types ============

/// Output from `run()`.
#[derive(Debug)]
pub struct Output {
    /// Generated summary text.
    pub summary: String,
    /// Generation statistics, including the number of tokens produced.
    pub stats: GenerationStats,
}

// ============ Pipeline ============

/// Abstractive summarization with an encoder-decoder model.
///
/// Construct with [`SummarizationPipelineBuilder`](super::SummarizationPipelineBuilder).
///
/// ```rust,no_run
/// # use earnings_lens::pipelines::summarization::{SummarizationPipelineBuilder, SummaryBounds};
/// # fn main() -> earnings_lens::error::Result<()> {
/// let pipeline = SummarizationPipelineBuilder::t5("google-t5/t5-small").build()?;
///
/// let output = pipeline.run(
///     "Revenue rose 12% on higher volumes while gross margin narrowed on input costs.",
///     SummaryBounds::new(5, 30)?,
/// )?;
/// println!("{} ({} tokens)", output.summary, output.stats.tokens_generated);
/// # Ok(())
/// # }
/// ```
pub struct SummarizationPipeline<M: SummarizationModel> {
    pub(crate) model: M,
    pub(crate) tokenizer: Tokenizer,
}

impl<M: SummarizationModel> SummarizationPipeline<M> {
    /// Summarize `text` within `bounds`.
    pub fn run(&self, text: &str, bounds: SummaryBounds) -> Result<Output> {
        bounds.validate()?;
        let (summary, stats) = self.model.summarize(&self.tokenizer, text, bounds)?;
        Ok(Output { summary, stats })
    }
}
