use std::borrow::Cow;
use std::sync::Mutex;

use candle_core::{DType, Device, Tensor};
use candle_transformers::generation::{LogitsProcessor, Sampling};
use candle_transformers::models::t5::{Config, T5ForConditionalGeneration};
use serde::Deserialize;
use tokenizers::Tokenizer;
use tracing::warn;

use crate::error::{PipelineError, Result};
use crate::loaders::{preview, HfLoader};
use crate::pipelines::stats::GenerationStats;
use crate::pipelines::summarization::SummaryBounds;

/// Longest input the encoder is run on.
const ENCODER_WINDOW: usize = 512;

#[derive(Debug, Default, Deserialize)]
struct TaskParamsJson {
    #[serde(default)]
    task_specific_params: Option<TaskSpecificParams>,
}

#[derive(Debug, Default, Deserialize)]
struct TaskSpecificParams {
    #[serde(default)]
    summarization: Option<SummarizationParams>,
}

#[derive(Debug, Default, Deserialize)]
struct SummarizationParams {
    #[serde(default)]
    prefix: Option<String>,
    #[serde(default)]
    no_repeat_ngram_size: Option<usize>,
}

/// T5 conditional generation used as a summarizer.
///
/// The decoder keeps a KV cache across steps, so the model sits behind a lock and
/// the cache is cleared at the start and end of every call.
pub struct SummarizerT5Model {
    model: Mutex<T5ForConditionalGeneration>,
    config: Config,
    prefix: String,
    no_repeat_ngram_size: usize,
    device: Device,
}

impl SummarizerT5Model {
    pub fn new(model_id: &str, device: Device) -> Result<Self> {
        let files = HfLoader::new(model_id).fetch()?;
        let config_str = files.read_config()?;
        let config: Config = serde_json::from_str(&config_str)?;
        let params = serde_json::from_str::<TaskParamsJson>(&config_str)?
            .task_specific_params
            .and_then(|p| p.summarization)
            .unwrap_or_default();

        let vb = files.var_builder(&device)?;
        let model = T5ForConditionalGeneration::load(vb, &config)?;

        Ok(Self {
            model: Mutex::new(model),
            config,
            prefix: params.prefix.unwrap_or_default(),
            no_repeat_ngram_size: params.no_repeat_ngram_size.unwrap_or(0),
            device,
        })
    }

    pub fn summarize(
        &self,
        tokenizer: &Tokenizer,
        text: &str,
        bounds: SummaryBounds,
    ) -> Result<(String, GenerationStats)> {
        let input = format!("{}{}", self.prefix, text);
        let encoding = tokenizer.encode(input.as_str(), true).map_err(|e| {
            PipelineError::Tokenization(format!(
                "Tokenization failed on '{}': {}",
                preview(text),
                e
            ))
        })?;
        let eos_token = self.config.eos_token_id as u32;
        let full_len = encoding.get_ids().len();
        let input_ids = fit_encoder_window(encoding.get_ids(), eos_token, ENCODER_WINDOW);
        if input_ids.len() < full_len {
            warn!(
                "Summarizer input truncated from {} to {} tokens",
                full_len,
                input_ids.len()
            );
        }

        let mut stats = GenerationStats::new();
        stats.set_prompt_tokens(input_ids.len());

        let mut model = self
            .model
            .lock()
            .map_err(|_| PipelineError::Unexpected("T5 model lock poisoned".to_string()))?;
        model.clear_kv_cache();

        let device = &self.device;
        let encoder_input = Tensor::new(input_ids.as_ref(), device)?.unsqueeze(0)?;
        let encoder_output = model.encode(&encoder_input)?;

        let start_token = self
            .config
            .decoder_start_token_id
            .unwrap_or(self.config.pad_token_id) as u32;
        let use_cache = self.config.use_cache;

        let generated = greedy_decode(
            start_token,
            eos_token,
            bounds,
            self.no_repeat_ngram_size,
            &mut stats,
            |output, index| {
                let decoder_input = if index == 0 || !use_cache {
                    Tensor::new(output, device)?.unsqueeze(0)?
                } else {
                    Tensor::new(&output[output.len() - 1..], device)?.unsqueeze(0)?
                };
                Ok(model.decode(&decoder_input, &encoder_output)?.squeeze(0)?)
            },
        );
        model.clear_kv_cache();
        drop(model);

        let tokens = generated?;
        let summary = tokenizer.decode(&tokens, true).map_err(|e| {
            PipelineError::Tokenization(format!("Failed to decode summary tokens: {e}"))
        })?;

        stats.finalize();
        Ok((summary.trim().to_string(), stats))
    }

    pub fn get_tokenizer(model_id: &str) -> Result<Tokenizer> {
        let mut tokenizer = HfLoader::new(model_id).tokenizer()?;
        // `summarize` cuts to the encoder window itself so it can keep EOS and log the cut.
        tokenizer
            .with_truncation(None)
            .map_err(|e| PipelineError::Tokenization(format!("Failed to disable truncation: {e}")))?;
        Ok(tokenizer)
    }
}

impl crate::pipelines::summarization::SummarizationModel for SummarizerT5Model {
    type Options = String;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        SummarizerT5Model::new(&options, device)
    }

    fn summarize(
        &self,
        tokenizer: &Tokenizer,
        text: &str,
        bounds: SummaryBounds,
    ) -> Result<(String, GenerationStats)> {
        self.summarize(tokenizer, text, bounds)
    }

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer> {
        Self::get_tokenizer(&options)
    }
}

/// Keep at most `limit` leading tokens, re-appending a trailing `eos` that the cut removed.
fn fit_encoder_window(ids: &[u32], eos: u32, limit: usize) -> Cow<'_, [u32]> {
    if ids.len() <= limit {
        return Cow::Borrowed(ids);
    }
    match ids.last() {
        Some(&last) if last == eos && limit > 0 => {
            let mut kept = ids[..limit - 1].to_vec();
            kept.push(eos);
            Cow::Owned(kept)
        }
        _ => Cow::Borrowed(&ids[..limit]),
    }
}

/// Arg-max decoding loop shared by every decoder step function.
///
/// `step` receives the tokens so far (starting with `start_token`) and the step
/// index, and returns next-token logits of shape `[vocab]`. Returns the generated
/// tokens without the start and end tokens.
pub(crate) fn greedy_decode<F>(
    start_token: u32,
    eos_token: u32,
    bounds: SummaryBounds,
    no_repeat_ngram_size: usize,
    stats: &mut GenerationStats,
    mut step: F,
) -> Result<Vec<u32>>
where
    F: FnMut(&[u32], usize) -> Result<Tensor>,
{
    let mut logits_processor = LogitsProcessor::from_sampling(0, Sampling::ArgMax);
    let mut output = vec![start_token];

    for index in 0..bounds.max_length {
        let logits = step(&output, index)?;

        let mut banned = banned_ngram_tokens(&output[1..], no_repeat_ngram_size);
        if index < bounds.min_length {
            banned.push(eos_token);
        }
        let logits = suppress_tokens(&logits, &banned)?;

        let next_token = logits_processor
            .sample(&logits)
            .map_err(|e| PipelineError::Generation(format!("Sampling failed: {e}")))?;
        if next_token == eos_token {
            break;
        }
        output.push(next_token);
        stats.record_token();
    }

    Ok(output.split_off(1))
}

fn suppress_tokens(logits: &Tensor, banned: &[u32]) -> Result<Tensor> {
    if banned.is_empty() {
        return Ok(logits.clone());
    }
    let mut values = logits.to_dtype(DType::F32)?.to_vec1::<f32>()?;
    for &token in banned {
        if let Some(v) = values.get_mut(token as usize) {
            *v = f32::NEG_INFINITY;
        }
    }
    Ok(Tensor::new(values, logits.device())?)
}

/// Tokens that would complete an n-gram already present in `tokens`.
fn banned_ngram_tokens(tokens: &[u32], n: usize) -> Vec<u32> {
    if n == 0 || tokens.len() < n {
        return vec![];
    }
    let prefix = &tokens[tokens.len() - (n - 1)..];
    tokens
        .windows(n)
        .filter(|w| &w[..n - 1] == prefix)
        .map(|w| w[n - 1])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EOS: u32 = 1;

    fn logits(values: &[f32]) -> Result<Tensor> {
        Ok(Tensor::new(values, &Device::Cpu)?)
    }

    #[test]
    fn end_token_is_held_back_until_min_length() {
        let mut stats = GenerationStats::new();
        let bounds = SummaryBounds::new(3, 10).unwrap();
        let out = greedy_decode(0, EOS, bounds, 0, &mut stats, |_, _| {
            logits(&[0.0, 10.0, 1.0, 0.0])
        })
        .unwrap();
        assert_eq!(out, vec![2, 2, 2]);
        assert_eq!(stats.tokens_generated, 3);
    }

    #[test]
    fn generation_is_capped_at_max_length() {
        let mut stats = GenerationStats::new();
        let bounds = SummaryBounds::new(0, 4).unwrap();
        let out = greedy_decode(0, EOS, bounds, 0, &mut stats, |_, _| {
            logits(&[0.0, 0.0, 5.0, 0.0])
        })
        .unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(stats.tokens_generated, 4);
    }

    #[test]
    fn step_sees_tokens_so_far() {
        let mut stats = GenerationStats::new();
        let bounds = SummaryBounds::new(0, 3).unwrap();
        let mut seen = Vec::new();
        greedy_decode(7, EOS, bounds, 0, &mut stats, |output, index| {
            seen.push((index, output.to_vec()));
            logits(&[0.0, 0.0, 0.0, 9.0])
        })
        .unwrap();
        assert_eq!(
            seen,
            vec![(0, vec![7]), (1, vec![7, 3]), (2, vec![7, 3, 3])]
        );
    }

    #[test]
    fn repeated_ngrams_are_blocked() {
        assert_eq!(banned_ngram_tokens(&[2, 3, 2], 2), vec![3]);
        assert_eq!(banned_ngram_tokens(&[2, 3, 4, 2, 3], 3), vec![4]);
        assert!(banned_ngram_tokens(&[2, 3], 3).is_empty());
        assert!(banned_ngram_tokens(&[2, 2, 2], 0).is_empty());

        let mut stats = GenerationStats::new();
        let bounds = SummaryBounds::new(0, 3).unwrap();
        // Token 2 wins unless banned; once "2 2" exists it cannot occur again.
        let out = greedy_decode(0, EOS, bounds, 2, &mut stats, |_, _| {
            logits(&[0.0, -5.0, 9.0, 8.0])
        })
        .unwrap();
        assert_eq!(out, vec![2, 2, 3]);
    }

    #[test]
    fn suppressed_tokens_lose_arg_max() {
        let t = suppress_tokens(&logits(&[0.0, 3.0, 1.0]).unwrap(), &[1]).unwrap();
        let v = t.to_vec1::<f32>().unwrap();
        assert_eq!(v[1], f32::NEG_INFINITY);
        assert_eq!(v[2], 1.0);
    }

    #[test]
    fn input_within_window_is_untouched() {
        let ids = [5, 6, 7, EOS];
        let fitted = fit_encoder_window(&ids, EOS, 4);
        assert!(matches!(fitted, Cow::Borrowed(_)));
        assert_eq!(fitted.as_ref(), &ids);
    }

    #[test]
    fn long_input_is_cut_to_window_and_keeps_end_token() {
        let mut ids: Vec<u32> = (10..2_010).collect();
        ids.push(EOS);
        let fitted = fit_encoder_window(&ids, EOS, ENCODER_WINDOW);
        assert_eq!(fitted.len(), ENCODER_WINDOW);
        assert_eq!(fitted[..ENCODER_WINDOW - 1], ids[..ENCODER_WINDOW - 1]);
        assert_eq!(fitted.last(), Some(&EOS));
    }

    #[test]
    fn long_input_without_end_token_is_plainly_cut() {
        let ids: Vec<u32> = (10..20).collect();
        let fitted = fit_encoder_window(&ids, EOS, 4);
        assert_eq!(fitted.as_ref(), &[10, 11, 12, 13]);
    }
}
