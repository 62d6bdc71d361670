//! External generation engine boundary.
//!
//! The autoregressive engine (attention, KV-cache management, scheduling,
//! the sampling loop itself) is an external collaborator. This crate only
//! requires one blocking, order-preserving batched `generate` call that
//! honors a shared decoding configuration and invokes the supplied logits
//! hook each step.

use crate::config::DecodingConfig;
use crate::error::Result;
use crate::logits::LogitsProcessor;
use crate::TokenId;

/// Why decoding ended for a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// A configured stop string was produced.
    StopSequence,
    /// The `max_tokens` budget was exhausted.
    MaxTokens,
}

/// One decoded candidate for a prompt.
#[derive(Debug, Clone)]
pub struct CandidateOutput {
    /// Decoded text of the generated continuation.
    pub text: String,
    /// Raw generated token ids.
    pub token_ids: Vec<TokenId>,
    pub finish_reason: FinishReason,
}

impl CandidateOutput {
    pub fn new(text: impl Into<String>, finish_reason: FinishReason) -> Self {
        Self {
            text: text.into(),
            token_ids: Vec::new(),
            finish_reason,
        }
    }

    pub fn with_token_ids(mut self, token_ids: Vec<TokenId>) -> Self {
        self.token_ids = token_ids;
        self
    }
}

/// Engine output for one prompt. With `best_of = 1` and
/// `num_return_sequences = 1` exactly one candidate is expected.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    pub candidates: Vec<CandidateOutput>,
}

impl EngineOutput {
    pub fn single(candidate: CandidateOutput) -> Self {
        Self {
            candidates: vec![candidate],
        }
    }

    /// First returned candidate, if any.
    pub fn first(&self) -> Option<&CandidateOutput> {
        self.candidates.first()
    }
}

/// The external autoregressive generation capability.
///
/// Implementations own batching strategy and internal parallelism; callers
/// only rely on the output list being index-aligned with `prompts`. Engine
/// failures (context overflow, out-of-memory, ...) are surfaced unchanged
/// as [`crate::Error::Engine`].
pub trait GenerationEngine: Send + Sync {
    /// Decode one output per prompt under a shared decoding configuration,
    /// invoking `logits_processor` once per step per active sequence.
    fn generate(
        &self,
        prompts: &[Vec<TokenId>],
        config: &DecodingConfig,
        logits_processor: &dyn LogitsProcessor,
    ) -> Result<Vec<EngineOutput>>;
}
