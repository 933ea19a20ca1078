//! Hugging Face Hub file resolution for checkpoints.
//!
//! Files land in the standard hf-hub cache, so a checkpoint is downloaded once per
//! machine. Everything here is blocking; callers run it on a blocking worker.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use hf_hub::api::sync::{Api, ApiRepo};
use hf_hub::{Repo, RepoType};
use serde::Deserialize;
use tokenizers::Tokenizer;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone)]
pub struct HfLoader {
    pub repo: String,
}

impl HfLoader {
    pub fn new(repo: &str) -> Self {
        Self { repo: repo.into() }
    }

    fn api_repo(&self) -> Result<ApiRepo> {
        let api = Api::new().map_err(|e| {
            PipelineError::Download(format!("Failed to initialize HuggingFace API: {e}"))
        })?;
        Ok(api.repo(Repo::new(self.repo.clone(), RepoType::Model)))
    }

    /// Resolve one file of the repository to a local path.
    pub fn get(&self, filename: &str) -> Result<PathBuf> {
        self.api_repo()?.get(filename).map_err(|e| {
            PipelineError::Download(format!(
                "Failed to download '{}' from '{}': {}",
                filename, self.repo, e
            ))
        })
    }

    pub fn tokenizer(&self) -> Result<Tokenizer> {
        tokenizer_from_file(&self.get("tokenizer.json")?)
    }

    pub fn config(&self) -> Result<String> {
        Ok(std::fs::read_to_string(self.get("config.json")?)?)
    }

    /// Resolve `config.json` and the weights file.
    ///
    /// Prefers `model.safetensors`, falls back to `pytorch_model.bin`.
    pub fn fetch(&self) -> Result<ModelFiles> {
        let repo = self.api_repo()?;
        let download = |filename: &str| {
            repo.get(filename).map_err(|e| {
                PipelineError::Download(format!(
                    "Failed to download '{}' from '{}': {}",
                    filename, self.repo, e
                ))
            })
        };

        let config_path = download("config.json")?;
        let weights_path = download("model.safetensors").or_else(|_| download("pytorch_model.bin"))?;

        Ok(ModelFiles {
            config_path,
            weights_path,
        })
    }
}

/// Local paths of one checkpoint.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config_path: PathBuf,
    pub weights_path: PathBuf,
}

impl ModelFiles {
    pub fn read_config(&self) -> Result<String> {
        Ok(std::fs::read_to_string(&self.config_path)?)
    }

    pub fn var_builder(&self, device: &Device) -> Result<VarBuilder<'static>> {
        let vb = if self
            .weights_path
            .extension()
            .is_some_and(|e| e == "safetensors")
        {
            // SAFETY: the mmap'd file lives in the hub cache and is not rewritten while loaded.
            unsafe {
                VarBuilder::from_mmaped_safetensors(&[&self.weights_path], DType::F32, device)?
            }
        } else {
            VarBuilder::from_pth(&self.weights_path, DType::F32, device)?
        };
        Ok(vb)
    }
}

fn tokenizer_from_file(path: &Path) -> Result<Tokenizer> {
    Tokenizer::from_file(path).map_err(|e| {
        PipelineError::Tokenization(format!(
            "Failed to load tokenizer from '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Label maps and sizes that classification checkpoints keep in `config.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfigJson {
    #[serde(default)]
    pub id2label: HashMap<String, String>,
    #[serde(default)]
    pub label2id: HashMap<String, u32>,
    #[serde(default)]
    pub hidden_size: Option<usize>,
    #[serde(default)]
    pub max_position_embeddings: Option<usize>,
}

impl ClassifierConfigJson {
    pub fn parse(config_str: &str) -> Result<Self> {
        Ok(serde_json::from_str(config_str)?)
    }

    pub fn num_labels(&self) -> usize {
        self.label2id.len().max(self.id2label.len())
    }

    /// Class index for `label`, matched case-insensitively across both maps.
    pub fn class_index(&self, label: &str) -> Option<usize> {
        self.label2id
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(label))
            .map(|(_, &id)| id as usize)
            .or_else(|| {
                self.id2label
                    .iter()
                    .find(|(_, name)| name.eq_ignore_ascii_case(label))
                    .and_then(|(id, _)| id.parse().ok())
            })
    }
}

/// Pad id declared by the tokenizer, or the usual pad tokens.
pub fn pad_token_id(tokenizer: &Tokenizer) -> u32 {
    tokenizer
        .get_padding()
        .map(|p| p.pad_id)
        .or_else(|| tokenizer.token_to_id("<pad>"))
        .or_else(|| tokenizer.token_to_id("[PAD]"))
        .unwrap_or(0)
}

/// First 50 characters of `text`, for error messages.
pub(crate) fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}
