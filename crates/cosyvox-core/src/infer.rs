//! Batch offline inference orchestration.

use std::sync::Arc;

use tracing::{debug, info};

use crate::bias::BiasVector;
use crate::config::{DecodingConfig, SpecialTokenIds};
use crate::engine::GenerationEngine;
use crate::error::{Error, Result};
use crate::extract::extract_speech_tokens;
use crate::logits::BiasLogitsProcessor;
use crate::prompt::PromptEncoder;
use crate::TokenId;

/// Long-lived driver for batched speech-token generation.
///
/// Constructed once per process; holds the engine handle, the prompt
/// encoder, the bias-constrained logits hook, and the shared decoding
/// configuration. All held state is immutable after construction, so a
/// single instance may serve concurrent batch calls without locking.
pub struct OfflineInference {
    engine: Arc<dyn GenerationEngine>,
    encoder: PromptEncoder,
    logits: BiasLogitsProcessor,
    decoding: DecodingConfig,
}

impl std::fmt::Debug for OfflineInference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineInference")
            .field("encoder", &self.encoder)
            .field("logits", &self.logits)
            .field("decoding", &self.decoding)
            .finish_non_exhaustive()
    }
}

impl OfflineInference {
    /// Wire up the driver.
    ///
    /// Fails with [`Error::ShapeMismatch`] when the bias vector does not
    /// cover the model vocabulary implied by the token id layout.
    pub fn new(
        engine: Arc<dyn GenerationEngine>,
        bias: BiasVector,
        tokens: SpecialTokenIds,
        decoding: DecodingConfig,
    ) -> Result<Self> {
        let expected = tokens.model_vocab_size();
        if bias.len() != expected {
            return Err(Error::ShapeMismatch {
                expected,
                actual: bias.len(),
            });
        }

        info!(
            "Offline inference ready: vocab {} entries, up to {} new tokens per sequence",
            bias.len(),
            decoding.max_tokens
        );
        Ok(Self {
            engine,
            encoder: PromptEncoder::new(tokens),
            logits: BiasLogitsProcessor::new(Arc::new(bias)),
            decoding,
        })
    }

    pub fn decoding_config(&self) -> &DecodingConfig {
        &self.decoding
    }

    pub fn encoder(&self) -> &PromptEncoder {
        &self.encoder
    }

    /// Run one batched decode over parallel lists of text token ids and
    /// reference speech token ids.
    ///
    /// Returns one generated speech-token sequence per request, index-aligned
    /// with the inputs. The whole batch is one engine call: an engine failure
    /// fails every request, with no partial results and no retry. An empty
    /// batch returns without touching the engine.
    pub fn batch_infer(
        &self,
        text_lists: &[Vec<TokenId>],
        ref_speech_lists: &[Vec<TokenId>],
    ) -> Result<Vec<Vec<u32>>> {
        if text_lists.len() != ref_speech_lists.len() {
            return Err(Error::InputLengthMismatch {
                text_lists: text_lists.len(),
                speech_lists: ref_speech_lists.len(),
            });
        }
        if text_lists.is_empty() {
            return Ok(Vec::new());
        }

        let prompts: Vec<Vec<TokenId>> = text_lists
            .iter()
            .zip(ref_speech_lists)
            .map(|(text, ref_speech)| self.encoder.encode(text, ref_speech))
            .collect();
        debug!("Submitting batch of {} prompts", prompts.len());

        let outputs = self
            .engine
            .generate(&prompts, &self.decoding, &self.logits)?;
        if outputs.len() != prompts.len() {
            return Err(Error::Engine(format!(
                "engine returned {} outputs for {} prompts",
                outputs.len(),
                prompts.len()
            )));
        }

        let mut results = Vec::with_capacity(outputs.len());
        for output in &outputs {
            let candidate = output
                .first()
                .ok_or_else(|| Error::Engine("engine output has no candidates".to_string()))?;
            results.push(extract_speech_tokens(&candidate.text));
        }
        debug!("Extracted speech tokens for {} requests", results.len());
        Ok(results)
    }
}
