use std::time::{Duration, Instant};

// ============ Encoder stats (classification) ============

/// Statistics for encoder inference (sentiment, zero-shot).
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Total execution time.
    pub total_time: Duration,
    /// Number of forward passes in the batch (one per candidate label for zero-shot).
    pub sequences: usize,
}

impl PipelineStats {
    /// Create a new stats tracker (call at start of operation).
    pub(crate) fn start() -> PipelineStatsBuilder {
        PipelineStatsBuilder {
            start_time: Instant::now(),
        }
    }
}

/// Tracks timing from creation to finish.
pub(crate) struct PipelineStatsBuilder {
    start_time: Instant,
}

impl PipelineStatsBuilder {
    pub fn finish(self, sequences: usize) -> PipelineStats {
        PipelineStats {
            total_time: self.start_time.elapsed(),
            sequences,
        }
    }
}

// ============ Generation stats (summarization) ============

/// Statistics for a single encoder-decoder generation.
#[derive(Debug, Clone)]
pub struct GenerationStats {
    /// Number of tokens in the encoded input.
    pub prompt_tokens: usize,
    /// Number of tokens generated, excluding the end token.
    pub tokens_generated: usize,
    /// Total generation time.
    pub total_time: Duration,
    /// Throughput in tokens per second.
    pub tokens_per_second: f64,
    start_time: Instant,
}

impl GenerationStats {
    pub(crate) fn new() -> Self {
        Self {
            prompt_tokens: 0,
            tokens_generated: 0,
            total_time: Duration::default(),
            tokens_per_second: 0.0,
            start_time: Instant::now(),
        }
    }

    pub(crate) fn set_prompt_tokens(&mut self, prompt_tokens: usize) {
        self.prompt_tokens = prompt_tokens;
    }

    pub(crate) fn record_token(&mut self) {
        self.tokens_generated += 1;
    }

    pub(crate) fn finalize(&mut self) {
        self.total_time = self.start_time.elapsed();
        let secs = self.total_time.as_secs_f64();
        self.tokens_per_second = if secs > 0.0 {
            self.tokens_generated as f64 / secs
        } else {
            0.0
        };
    }

    #[cfg(test)]
    pub(crate) fn override_start(&mut self, start_time: Instant) {
        self.start_time = start_time;
    }
}
