//! Configuration types for the offline inference driver.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::extract::STOP_MARKER;

/// Reserved vocabulary ids partitioning the prompt id space.
///
/// These must match the trained model's vocabulary layout exactly. They are
/// fixed configuration, never computed: the text vocabulary occupies the
/// bottom of the id space, two boundary markers follow it, and the speech
/// codec alphabet lives in its own range above the offset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpecialTokenIds {
    /// Marker opening the text segment of a prompt.
    #[serde(default = "default_text_start_id")]
    pub text_start_id: u32,

    /// Marker opening the speech segment of a prompt.
    #[serde(default = "default_speech_start_id")]
    pub speech_start_id: u32,

    /// Additive offset mapping codec ids into their private vocabulary range.
    #[serde(default = "default_speech_id_offset")]
    pub speech_id_offset: u32,

    /// Size of the speech codec alphabet.
    #[serde(default = "default_speech_vocab_size")]
    pub speech_vocab_size: u32,
}

fn default_text_start_id() -> u32 {
    151_936
}
fn default_speech_start_id() -> u32 {
    151_937
}
fn default_speech_id_offset() -> u32 {
    151_938
}
fn default_speech_vocab_size() -> u32 {
    6_561
}

impl Default for SpecialTokenIds {
    fn default() -> Self {
        Self {
            text_start_id: default_text_start_id(),
            speech_start_id: default_speech_start_id(),
            speech_id_offset: default_speech_id_offset(),
            speech_vocab_size: default_speech_vocab_size(),
        }
    }
}

impl SpecialTokenIds {
    /// Total model vocabulary size implied by the id layout. The speech
    /// subrange sits at the top of the vocabulary, so the last valid id is
    /// `speech_id_offset + speech_vocab_size - 1`.
    pub fn model_vocab_size(&self) -> usize {
        (self.speech_id_offset + self.speech_vocab_size) as usize
    }
}

/// Decoding configuration shared read-only by every request in a batch call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodingConfig {
    /// Sampling temperature; `0.0` selects deterministic greedy decoding.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Number of candidate sequences decoded per prompt.
    #[serde(default = "default_best_of")]
    pub best_of: usize,

    /// Number of candidates returned per prompt.
    #[serde(default = "default_num_return_sequences")]
    pub num_return_sequences: usize,

    /// Penalty discouraging immediate token repetition.
    #[serde(default = "default_repetition_penalty")]
    pub repetition_penalty: f32,

    /// Maximum number of newly generated tokens per sequence.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Strings whose emission terminates decoding for a sequence.
    #[serde(default = "default_stop")]
    pub stop: Vec<String>,
}

fn default_temperature() -> f32 {
    0.0
}
fn default_best_of() -> usize {
    1
}
fn default_num_return_sequences() -> usize {
    1
}
fn default_repetition_penalty() -> f32 {
    1.3
}
fn default_max_tokens() -> usize {
    4096
}
fn default_stop() -> Vec<String> {
    vec![STOP_MARKER.to_string()]
}

impl Default for DecodingConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            best_of: default_best_of(),
            num_return_sequences: default_num_return_sequences(),
            repetition_penalty: default_repetition_penalty(),
            max_tokens: default_max_tokens(),
            stop: default_stop(),
        }
    }
}

/// Engine-facing settings consumed by engine implementations and the bias
/// asset loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory holding the merged model, tokenizer, and bias asset.
    pub model_dir: PathBuf,

    /// Weight data type requested from the engine.
    #[serde(default = "default_dtype")]
    pub dtype: String,

    /// Maximum model context length (prompt plus generated tokens).
    #[serde(default = "default_max_model_len")]
    pub max_model_len: usize,

    /// Tensor-parallel degree requested from the engine.
    #[serde(default = "default_tensor_parallel_size")]
    pub tensor_parallel_size: usize,

    /// Bias asset filename within `model_dir`.
    #[serde(default = "default_bias_filename")]
    pub bias_filename: String,
}

fn default_dtype() -> String {
    "bfloat16".to_string()
}
fn default_max_model_len() -> usize {
    4096
}
fn default_tensor_parallel_size() -> usize {
    1
}
fn default_bias_filename() -> String {
    "bias.safetensors".to_string()
}

impl EngineConfig {
    /// Create a config for the model directory with default engine settings.
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            dtype: default_dtype(),
            max_model_len: default_max_model_len(),
            tensor_parallel_size: default_tensor_parallel_size(),
            bias_filename: default_bias_filename(),
        }
    }

    /// Load from a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Full path of the bias asset.
    pub fn bias_path(&self) -> PathBuf {
        self.model_dir.join(&self.bias_filename)
    }
}
