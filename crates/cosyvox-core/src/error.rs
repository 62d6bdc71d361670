//! Error types for the offline inference driver.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the offline inference driver.
///
/// None of these are retried internally: a constrained deterministic decode
/// either succeeds or fails the whole batch call.
#[derive(Debug, Error)]
pub enum Error {
    /// The two request lists passed to `batch_infer` differ in length.
    /// Raised before any engine call is made.
    #[error(
        "input length mismatch: {text_lists} text token lists vs {speech_lists} reference speech token lists"
    )]
    InputLengthMismatch {
        text_lists: usize,
        speech_lists: usize,
    },

    /// The bias vector does not cover the vocabulary it is applied to.
    /// Fatal at initialization; also raised per step if the engine hands the
    /// logits hook a vector of the wrong length.
    #[error("shape mismatch: expected {expected} vocabulary entries, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// The bias asset is missing or could not be parsed.
    #[error("failed to load bias asset: {0}")]
    AssetLoad(String),

    /// Opaque failure surfaced unchanged from the generation engine
    /// (context overflow, out-of-memory, tokenizer errors, ...).
    #[error("engine failure: {0}")]
    Engine(String),

    /// Malformed or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),
}
