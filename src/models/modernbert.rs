use std::collections::HashMap;

use candle_core::{Device, Tensor};
use candle_transformers::models::modernbert::{
    ClassifierConfig, ClassifierPooling, Config,
    ModernBertForSequenceClassification as CandleModernBertForSequenceClassification,
};
use tokenizers::Tokenizer;

use crate::error::{PipelineError, Result};
use crate::loaders::{pad_token_id, preview, ClassifierConfigJson, HfLoader};
use crate::pipelines::zero_shot::LabelScores;

const HYPOTHESIS_TEMPLATE: &str = "This example is {}.";

/// ModernBERT NLI checkpoint used as a zero-shot classifier.
pub struct ZeroShotModernBertModel {
    model: CandleModernBertForSequenceClassification,
    device: Device,
    entailment_id: usize,
    contradiction_id: Option<usize>,
}

impl ZeroShotModernBertModel {
    pub fn new(model_id: &str, device: Device) -> Result<Self> {
        let files = HfLoader::new(model_id).fetch()?;
        let config_str = files.read_config()?;
        let mut config: Config = serde_json::from_str(&config_str)?;
        let class_cfg = ClassifierConfigJson::parse(&config_str)?;

        let entailment_id = class_cfg.class_index("entailment").ok_or_else(|| {
            let available: Vec<&str> = class_cfg.label2id.keys().map(String::as_str).collect();
            PipelineError::Config(format!(
                "Missing 'entailment' in label2id mapping of '{model_id}'. Available: {}",
                available.join(", ")
            ))
        })?;
        let contradiction_id = class_cfg.class_index("contradiction");

        patch_config_num_labels(&mut config, class_cfg.num_labels());

        let vb = files.var_builder(&device)?;
        let model = CandleModernBertForSequenceClassification::load(vb, &config)?;

        Ok(Self {
            model,
            device,
            entailment_id,
            contradiction_id,
        })
    }

    pub fn predict_single_label(
        &self,
        tokenizer: &Tokenizer,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<LabelScores> {
        let probs = self.pair_probabilities(tokenizer, text, candidate_labels)?;
        Ok(ranked(
            candidate_labels,
            single_label_scores(&probs, self.entailment_id),
        ))
    }

    pub fn predict_multi_label(
        &self,
        tokenizer: &Tokenizer,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<LabelScores> {
        let probs = self.pair_probabilities(tokenizer, text, candidate_labels)?;
        Ok(ranked(
            candidate_labels,
            multi_label_scores(&probs, self.entailment_id, self.contradiction_id),
        ))
    }

    /// One row of class probabilities per candidate label.
    ///
    /// The candle classification head already applies a softmax over classes.
    fn pair_probabilities(
        &self,
        tokenizer: &Tokenizer,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<Vec<Vec<f32>>> {
        if candidate_labels.is_empty() {
            return Ok(vec![]);
        }

        let mut encodings = Vec::with_capacity(candidate_labels.len());
        for &label in candidate_labels {
            let hypothesis = HYPOTHESIS_TEMPLATE.replace("{}", label);
            let encoding = tokenizer
                .encode((text, hypothesis.as_str()), true)
                .map_err(|e| {
                    PipelineError::Tokenization(format!(
                        "Tokenization failed on '{}': {}",
                        preview(text),
                        e
                    ))
                })?;
            encodings.push(encoding);
        }

        let max_len = encodings.iter().map(|e| e.len()).max().unwrap_or(0);
        let pad_token_id = pad_token_id(tokenizer);

        let mut all_token_ids: Vec<u32> = Vec::with_capacity(encodings.len() * max_len);
        let mut all_attention_masks: Vec<u32> = Vec::with_capacity(encodings.len() * max_len);

        for encoding in encodings {
            let mut token_ids = encoding.get_ids().to_vec();
            let mut attention_mask = encoding.get_attention_mask().to_vec();
            token_ids.resize(max_len, pad_token_id);
            attention_mask.resize(max_len, 0);
            all_token_ids.extend(token_ids);
            all_attention_masks.extend(attention_mask);
        }

        let input_ids = Tensor::from_vec(
            all_token_ids,
            (candidate_labels.len(), max_len),
            &self.device,
        )?;
        let attention_mask = Tensor::from_vec(
            all_attention_masks,
            (candidate_labels.len(), max_len),
            &self.device,
        )?;

        let probs = self.model.forward(&input_ids, &attention_mask)?;
        Ok(probs.to_vec2::<f32>()?)
    }

    pub fn get_tokenizer(model_id: &str) -> Result<Tokenizer> {
        HfLoader::new(model_id).tokenizer()
    }
}

impl crate::pipelines::zero_shot::ZeroShotClassificationModel for ZeroShotModernBertModel {
    type Options = String;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        ZeroShotModernBertModel::new(&options, device)
    }

    fn predict(
        &self,
        tokenizer: &Tokenizer,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<LabelScores> {
        self.predict_single_label(tokenizer, text, candidate_labels)
    }

    fn predict_multi_label(
        &self,
        tokenizer: &Tokenizer,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<LabelScores> {
        self.predict_multi_label(tokenizer, text, candidate_labels)
    }

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer> {
        Self::get_tokenizer(&options)
    }
}

/// Entailment probability normalized across labels.
fn single_label_scores(probs: &[Vec<f32>], entailment_id: usize) -> Vec<f32> {
    let entailment: Vec<f32> = probs
        .iter()
        .map(|row| row.get(entailment_id).copied().unwrap_or(0.0))
        .collect();
    let sum: f32 = entailment.iter().sum();
    if sum <= 0.0 {
        return vec![0.0; entailment.len()];
    }
    entailment.into_iter().map(|p| p / sum).collect()
}

/// Each label scored on its own row.
///
/// With a contradiction class the score is `p_e / (p_e + p_c)`, which equals a
/// softmax over the entailment and contradiction logits alone. Two-class
/// checkpoints (`entailment` / `not_entailment`) use `p_e` as is.
fn multi_label_scores(
    probs: &[Vec<f32>],
    entailment_id: usize,
    contradiction_id: Option<usize>,
) -> Vec<f32> {
    probs
        .iter()
        .map(|row| {
            let entailment = row.get(entailment_id).copied().unwrap_or(0.0);
            match contradiction_id.and_then(|c| row.get(c).copied()) {
                Some(contradiction) if entailment + contradiction > 0.0 => {
                    entailment / (entailment + contradiction)
                }
                Some(_) => 0.0,
                None => entailment,
            }
        })
        .collect()
}

fn ranked(candidate_labels: &[&str], scores: Vec<f32>) -> LabelScores {
    let mut results: LabelScores = candidate_labels
        .iter()
        .map(|&l| l.to_string())
        .zip(scores)
        .collect();
    results.sort_by(|a, b| b.1.total_cmp(&a.1));
    results
}

fn patch_config_num_labels(config: &mut Config, num_labels: usize) {
    if config
        .classifier_config
        .as_ref()
        .map(|c| c.id2label.len())
        .unwrap_or(0)
        != num_labels
    {
        let id2label: HashMap<String, String> = (0..num_labels)
            .map(|i| (i.to_string(), format!("label_{i}")))
            .collect();
        let label2id: HashMap<String, String> = id2label
            .iter()
            .map(|(k, v)| (v.clone(), k.clone()))
            .collect();

        config.classifier_config = Some(ClassifierConfig {
            id2label,
            label2id,
            classifier_pooling: ClassifierPooling::default(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_label_scores_are_independent() {
        // Softmax rows as the classification head returns them:
        // [contradiction, neutral, entailment]
        let probs = vec![
            vec![0.005, 0.005, 0.99],
            vec![0.005, 0.005, 0.99],
            vec![0.99, 0.005, 0.005],
        ];
        let scores = multi_label_scores(&probs, 2, Some(0));
        assert!((scores[0] - scores[1]).abs() < 1e-6);
        assert!(scores[0] > 0.99, "entailed label scored {}", scores[0]);
        assert!(scores[2] < 0.01, "contradicted label scored {}", scores[2]);
        let sum: f32 = scores.iter().sum();
        assert!(sum > 1.5, "multi-label scores must not be renormalized, got {sum}");
    }

    #[test]
    fn multi_label_matches_two_way_softmax_of_logits() {
        let logits = [1.5f32, -0.3, 2.2];
        let exps: Vec<f32> = logits.iter().map(|l| l.exp()).collect();
        let total: f32 = exps.iter().sum();
        let row: Vec<f32> = exps.iter().map(|e| e / total).collect();

        let expected = 1.0 / (1.0 + (logits[0] - logits[2]).exp());
        let scores = multi_label_scores(&[row], 2, Some(0));
        assert!((scores[0] - expected).abs() < 1e-5);
    }

    #[test]
    fn neutral_heavy_row_is_scored_against_contradiction_only() {
        let probs = vec![vec![0.1, 0.8, 0.1]];
        let scores = multi_label_scores(&probs, 2, Some(0));
        assert!((scores[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn two_class_checkpoint_uses_entailment_probability() {
        // [entailment, not_entailment]
        let probs = vec![vec![0.97, 0.03], vec![0.2, 0.8]];
        let scores = multi_label_scores(&probs, 0, None);
        assert_eq!(scores, vec![0.97, 0.2]);
    }

    #[test]
    fn single_label_scores_sum_to_one() {
        let probs = vec![vec![0.1, 0.9], vec![0.4, 0.6], vec![0.7, 0.3]];
        let scores = single_label_scores(&probs, 1);
        let sum: f32 = scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!((scores[0] - 0.5).abs() < 1e-5);
        assert!(scores[0] > scores[1] && scores[1] > scores[2]);
    }

    #[test]
    fn single_label_with_no_entailment_mass_is_zero() {
        let scores = single_label_scores(&[vec![1.0, 0.0], vec![1.0, 0.0]], 1);
        assert_eq!(scores, vec![0.0, 0.0]);
    }

    #[test]
    fn ranked_sorts_descending() {
        let out = ranked(&["Pricing", "Demand", "Margins"], vec![0.9, 0.4, 0.95]);
        let labels: Vec<&str> = out.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["Margins", "Pricing", "Demand"]);
    }
}
