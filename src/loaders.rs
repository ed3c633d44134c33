use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use hf_hub::api::sync::{ApiBuilder, ApiRepo};
use hf_hub::{Repo, RepoType};
use serde::Deserialize;
use tokenizers::{Tokenizer, TruncationParams};

use crate::error::{PipelineError, Result};

/// Where a checkpoint lives: a HuggingFace Hub repository or a local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// A Hub repository at a given revision (branch, tag or commit).
    Hub {
        /// Repository id, e.g. `distilbert-base-uncased-finetuned-sst-2-english`.
        repo: String,
        /// Revision to download.
        revision: String,
    },
    /// A directory holding `config.json`, weights and tokenizer files.
    Local(PathBuf),
}

impl ModelSource {
    /// A Hub repository on its `main` revision.
    pub fn hub(repo: &str) -> Self {
        Self::Hub {
            repo: repo.into(),
            revision: "main".into(),
        }
    }

    /// Interpret a user-supplied model reference.
    ///
    /// Existing directories are treated as local checkpoints, anything else as a Hub repo id.
    pub fn parse(model: &str, revision: &str) -> Self {
        let path = Path::new(model);
        if path.is_dir() {
            Self::Local(path.to_path_buf())
        } else {
            Self::Hub {
                repo: model.into(),
                revision: revision.into(),
            }
        }
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::Hub { repo, revision } if revision == "main" => write!(f, "{repo}"),
            ModelSource::Hub { repo, revision } => write!(f, "{repo}@{revision}"),
            ModelSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

enum FileStore {
    Hub(ApiRepo),
    Local(PathBuf),
}

/// Resolves checkpoint file names to paths on disk, downloading from the Hub when needed.
pub struct ModelFiles {
    source: ModelSource,
    store: FileStore,
}

impl ModelFiles {
    pub fn open(source: &ModelSource, cache_dir: Option<&Path>) -> Result<Self> {
        let store = match source {
            ModelSource::Hub { repo, revision } => {
                let mut builder = ApiBuilder::new().with_progress(false);
                if let Some(dir) = cache_dir {
                    builder = builder.with_cache_dir(dir.to_path_buf());
                }
                let api = builder.build().map_err(|e| {
                    PipelineError::Download(format!("Failed to initialize HuggingFace API: {e}"))
                })?;
                FileStore::Hub(api.repo(Repo::with_revision(
                    repo.clone(),
                    RepoType::Model,
                    revision.clone(),
                )))
            }
            ModelSource::Local(dir) => {
                if !dir.is_dir() {
                    return Err(PipelineError::Config(format!(
                        "Model directory '{}' does not exist",
                        dir.display()
                    )));
                }
                FileStore::Local(dir.clone())
            }
        };

        Ok(Self {
            source: source.clone(),
            store,
        })
    }

    pub fn source(&self) -> &ModelSource {
        &self.source
    }

    pub fn get(&self, filename: &str) -> Result<PathBuf> {
        match &self.store {
            FileStore::Hub(repo) => repo.get(filename).map_err(|e| {
                PipelineError::Download(format!(
                    "Failed to download '{}' from '{}': {}",
                    filename, self.source, e
                ))
            }),
            FileStore::Local(dir) => {
                let path = dir.join(filename);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(PipelineError::Config(format!(
                        "'{}' not found in '{}'",
                        filename,
                        dir.display()
                    )))
                }
            }
        }
    }

    /// First of `filenames` that resolves. The error of the last candidate is returned if none do.
    pub fn get_any(&self, filenames: &[&str]) -> Result<PathBuf> {
        let mut last_err = PipelineError::Unexpected("No candidate file names given".into());
        for filename in filenames {
            match self.get(filename) {
                Ok(path) => return Ok(path),
                Err(e) => last_err = e,
            }
        }
        Err(last_err)
    }
}

/// The parts of a classifier's `config.json` shared by every supported architecture.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub id2label: HashMap<String, String>,
    #[serde(default)]
    pub label2id: HashMap<String, u32>,
    #[serde(default)]
    pub max_position_embeddings: Option<usize>,
}

impl ClassifierConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn num_labels(&self) -> usize {
        self.label2id.len().max(self.id2label.len())
    }

    /// Labels ordered by class id. Ids must be exactly `0..n`.
    pub fn labels(&self) -> Result<Vec<String>> {
        if self.id2label.is_empty() {
            return Err(PipelineError::Config(
                "config.json has no id2label mapping; not a classification checkpoint".into(),
            ));
        }

        let mut labels: Vec<Option<String>> = vec![None; self.id2label.len()];
        for (id, label) in &self.id2label {
            let index = id.parse::<usize>().map_err(|_| {
                PipelineError::Config(format!("id2label key '{id}' is not a class index"))
            })?;
            let slot = labels.get_mut(index).ok_or_else(|| {
                PipelineError::Config(format!(
                    "id2label key {index} is out of range for {} labels",
                    self.id2label.len()
                ))
            })?;
            *slot = Some(label.clone());
        }

        labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| {
                label.ok_or_else(|| PipelineError::Config(format!("id2label is missing id {i}")))
            })
            .collect()
    }
}

pub struct ClassifierConfigLoader<'a> {
    files: &'a ModelFiles,
}

impl<'a> ClassifierConfigLoader<'a> {
    pub fn new(files: &'a ModelFiles) -> Self {
        Self { files }
    }

    /// Returns the parsed shared fields together with the raw JSON, which the
    /// architecture-specific loaders parse again into their own config types.
    pub fn load(&self) -> Result<(ClassifierConfig, String)> {
        let config_path = self.files.get("config.json")?;
        let raw = std::fs::read_to_string(&config_path)?;
        let config = ClassifierConfig::from_json(&raw)?;
        Ok((config, raw))
    }
}

pub struct WeightsLoader<'a> {
    files: &'a ModelFiles,
}

impl<'a> WeightsLoader<'a> {
    pub fn new(files: &'a ModelFiles) -> Self {
        Self { files }
    }

    pub fn load(&self, device: &Device) -> Result<VarBuilder<'static>> {
        let weights_path = self
            .files
            .get_any(&["model.safetensors", "pytorch_model.bin"])?;

        let vb = if weights_path.extension().is_some_and(|e| e == "safetensors") {
            // SAFETY: the file is owned by the model cache or a local checkpoint and is
            // not modified while the process runs.
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? }
        } else {
            VarBuilder::from_pth(&weights_path, DType::F32, device)?
        };

        Ok(vb)
    }
}

#[derive(Deserialize)]
struct TokenizerConfigJson {
    #[serde(default = "default_lowercase")]
    do_lower_case: bool,
}

fn default_lowercase() -> bool {
    true
}

pub struct TokenizerLoader<'a> {
    files: &'a ModelFiles,
}

impl<'a> TokenizerLoader<'a> {
    pub fn new(files: &'a ModelFiles) -> Self {
        Self { files }
    }

    /// Load `tokenizer.json`, or assemble a BERT WordPiece tokenizer from `vocab.txt`
    /// for older checkpoints that ship without one. Inputs are truncated to `max_length` tokens.
    pub fn load(&self, max_length: usize) -> Result<Tokenizer> {
        let mut tokenizer = match self.files.get("tokenizer.json") {
            Ok(path) => Tokenizer::from_file(&path).map_err(|e| {
                PipelineError::Tokenization(format!(
                    "Failed to load tokenizer from '{}': {}",
                    path.display(),
                    e
                ))
            })?,
            Err(json_err) => {
                let vocab_path = self.files.get("vocab.txt").map_err(|_| json_err)?;
                let lowercase = self
                    .files
                    .get("tokenizer_config.json")
                    .ok()
                    .and_then(|path| std::fs::read_to_string(path).ok())
                    .and_then(|raw| serde_json::from_str::<TokenizerConfigJson>(&raw).ok())
                    .map(|c| c.do_lower_case)
                    .unwrap_or(true);
                let vocab = std::fs::read_to_string(&vocab_path)?;
                wordpiece_tokenizer(&vocab, lowercase)?
            }
        };

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| {
                PipelineError::Tokenization(format!("Failed to configure truncation: {e}"))
            })?;

        Ok(tokenizer)
    }
}

const BERT_SPECIAL_TOKENS: [&str; 5] = ["[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]"];

/// Build a BERT-style tokenizer from the contents of a `vocab.txt` (one token per line,
/// line number is the token id).
pub(crate) fn wordpiece_tokenizer(vocab: &str, lowercase: bool) -> Result<Tokenizer> {
    let vocab: serde_json::Map<String, serde_json::Value> = vocab
        .lines()
        .enumerate()
        .map(|(id, token)| (token.to_string(), serde_json::Value::from(id)))
        .collect();

    let token_id = |token: &str| -> Result<u64> {
        vocab.get(token).and_then(|v| v.as_u64()).ok_or_else(|| {
            PipelineError::Tokenization(format!("vocab.txt is missing special token {token}"))
        })
    };

    let sep_id = token_id("[SEP]")?;
    let cls_id = token_id("[CLS]")?;

    let added_tokens = BERT_SPECIAL_TOKENS
        .iter()
        .filter_map(|token| {
            vocab.get(*token).map(|id| {
                serde_json::json!({
                    "id": id,
                    "content": token,
                    "single_word": false,
                    "lstrip": false,
                    "rstrip": false,
                    "normalized": false,
                    "special": true,
                })
            })
        })
        .collect::<Vec<_>>();

    let spec = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": added_tokens,
        "normalizer": {
            "type": "BertNormalizer",
            "clean_text": true,
            "handle_chinese_chars": true,
            "strip_accents": null,
            "lowercase": lowercase,
        },
        "pre_tokenizer": { "type": "BertPreTokenizer" },
        "post_processor": {
            "type": "BertProcessing",
            "sep": ["[SEP]", sep_id],
            "cls": ["[CLS]", cls_id],
        },
        "decoder": { "type": "WordPiece", "prefix": "##", "cleanup": true },
        "model": {
            "type": "WordPiece",
            "unk_token": "[UNK]",
            "continuing_subword_prefix": "##",
            "max_input_chars_per_word": 100,
            "vocab": vocab,
        },
    });

    spec.to_string().parse::<Tokenizer>().map_err(|e| {
        PipelineError::Tokenization(format!("Failed to build WordPiece tokenizer: {e}"))
    })
}
