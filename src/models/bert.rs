use std::collections::HashMap;

use candle_core::{Device, IndexOp, Tensor, D};
use candle_nn::{linear, ops::softmax, Linear, Module};
use candle_transformers::models::bert::{BertModel, Config};
use tokenizers::{Tokenizer, TruncationParams};

use crate::error::{PipelineError, Result};
use crate::loaders::{preview, ClassifierConfigJson, HfLoader};
use crate::pipelines::sentiment::SentimentResult;

const DEFAULT_MAX_POSITIONS: usize = 512;

/// `BertForSequenceClassification`: encoder, tanh pooler over `[CLS]`, linear head.
pub struct SentimentBertModel {
    bert: BertModel,
    pooler: Linear,
    classifier: Linear,
    id2label: HashMap<String, String>,
    device: Device,
}

impl SentimentBertModel {
    pub fn new(model_id: &str, device: Device) -> Result<Self> {
        let files = HfLoader::new(model_id).fetch()?;
        let config_str = files.read_config()?;
        let config: Config = serde_json::from_str(&config_str)?;
        let class_cfg = ClassifierConfigJson::parse(&config_str)?;

        if class_cfg.id2label.is_empty() {
            return Err(PipelineError::Config(format!(
                "'{model_id}' has no id2label mapping; not a classification checkpoint"
            )));
        }
        let hidden_size = class_cfg.hidden_size.ok_or_else(|| {
            PipelineError::Config(format!("'{model_id}' config.json is missing hidden_size"))
        })?;

        let vb = files.var_builder(&device)?;
        let bert = BertModel::load(vb.pp("bert"), &config)?;
        let pooler = linear(hidden_size, hidden_size, vb.pp("bert.pooler.dense"))?;
        let classifier = linear(hidden_size, class_cfg.num_labels(), vb.pp("classifier"))?;

        Ok(Self {
            bert,
            pooler,
            classifier,
            id2label: class_cfg.id2label,
            device,
        })
    }

    pub fn predict_with_score(&self, tokenizer: &Tokenizer, text: &str) -> Result<SentimentResult> {
        let tokens = tokenizer.encode(text, true).map_err(|e| {
            PipelineError::Tokenization(format!(
                "Tokenization failed on '{}': {}",
                preview(text),
                e
            ))
        })?;

        let input_ids = Tensor::new(tokens.get_ids(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;
        let attention_mask =
            Tensor::new(tokens.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        // [1, seq, hidden] -> [CLS] -> pooled -> [1, num_labels]
        let hidden = self
            .bert
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let cls = hidden.i((.., 0))?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        let logits = self.classifier.forward(&pooled)?;

        let probs = softmax(&logits, D::Minus1)?.squeeze(0)?.to_vec1::<f32>()?;
        let (pred_id, score) = probs
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or_else(|| PipelineError::Unexpected("Model returned no logits".to_string()))?;

        let label = self
            .id2label
            .get(&pred_id.to_string())
            .ok_or_else(|| {
                let available: Vec<&str> = self.id2label.keys().map(String::as_str).collect();
                PipelineError::Unexpected(format!(
                    "Predicted label ID {} not in id2label. Available: {}",
                    pred_id,
                    available.join(", ")
                ))
            })?
            .clone();

        Ok(SentimentResult { label, score })
    }

    /// Tokenizer truncating to the checkpoint's position window.
    pub fn get_tokenizer(model_id: &str) -> Result<Tokenizer> {
        let loader = HfLoader::new(model_id);
        let max_positions = ClassifierConfigJson::parse(&loader.config()?)?
            .max_position_embeddings
            .unwrap_or(DEFAULT_MAX_POSITIONS);

        let mut tokenizer = loader.tokenizer()?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_positions,
                ..Default::default()
            }))
            .map_err(|e| {
                PipelineError::Tokenization(format!("Failed to configure truncation: {e}"))
            })?;
        Ok(tokenizer)
    }
}

impl crate::pipelines::sentiment::SentimentAnalysisModel for SentimentBertModel {
    type Options = String;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        SentimentBertModel::new(&options, device)
    }

    fn predict_with_score(&self, tokenizer: &Tokenizer, text: &str) -> Result<SentimentResult> {
        self.predict_with_score(tokenizer, text)
    }

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer> {
        Self::get_tokenizer(&options)
    }
}
