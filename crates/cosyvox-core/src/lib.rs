//! Cosyvox Core - batch offline inference driver for speech-token generation.
//!
//! Given parallel lists of text token ids and reference speech token ids,
//! the driver builds one flat prompt per request, submits the whole batch to
//! an external autoregressive generation engine under a deterministic
//! bias-constrained decoding configuration, and extracts the generated
//! speech-token ids from each decoded output.
//!
//! The engine itself (attention, KV-cache management, scheduling) is out of
//! scope and consumed through the [`GenerationEngine`] trait; the bias
//! tensor is an opaque versioned asset loaded once via [`BiasVector::load`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cosyvox_core::{
//!     BiasVector, DecodingConfig, EngineConfig, OfflineInference, SpecialTokenIds,
//! };
//!
//! let engine_config = EngineConfig::new("pretrained_models/cosyvoice2-merged");
//! let tokens = SpecialTokenIds::default();
//! let bias = BiasVector::load(&engine_config.bias_path(), tokens.model_vocab_size())?;
//!
//! let driver = OfflineInference::new(engine, bias, tokens, DecodingConfig::default())?;
//! let speech_tokens = driver.batch_infer(&text_id_lists, &ref_speech_id_lists)?;
//! ```

pub mod bias;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod infer;
pub mod logits;
pub mod prompt;

/// Token ID type shared across the text and speech vocabularies.
pub type TokenId = u32;

pub use bias::BiasVector;
pub use config::{DecodingConfig, EngineConfig, SpecialTokenIds};
pub use engine::{CandidateOutput, EngineOutput, FinishReason, GenerationEngine};
pub use error::{Error, Result};
pub use extract::{extract_speech_tokens, STOP_MARKER};
pub use infer::OfflineInference;
pub use logits::{BiasLogitsProcessor, LogitsProcessor};
