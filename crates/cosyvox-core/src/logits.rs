//! Per-step logits transforms.

use std::sync::Arc;

use crate::bias::BiasVector;
use crate::error::{Error, Result};
use crate::TokenId;

/// Hook applied to the raw vocabulary logits before the engine's own token
/// choice, once per decoding step per active sequence.
///
/// `generated` holds the ids already decoded for the sequence, per the
/// engine's calling convention; transforms are free to ignore it.
/// Implementations must be stateless across steps: the engine may interleave
/// sequences and batches arbitrarily.
pub trait LogitsProcessor: Send + Sync {
    fn apply(&self, logits: &mut [f32], generated: &[TokenId]) -> Result<()>;
}

/// Adds a fixed bias vector to every step's logits.
///
/// This is the sole constraint mechanism: the bias carries large negative
/// values outside the valid speech-token subrange, so a greedy downstream
/// choice is effectively restricted to legal continuations. Holds only an
/// immutable shared reference, so one instance serves any number of
/// concurrent batches.
#[derive(Debug, Clone)]
pub struct BiasLogitsProcessor {
    bias: Arc<BiasVector>,
}

impl BiasLogitsProcessor {
    pub fn new(bias: Arc<BiasVector>) -> Self {
        Self { bias }
    }

    pub fn bias(&self) -> &BiasVector {
        &self.bias
    }
}

impl LogitsProcessor for BiasLogitsProcessor {
    fn apply(&self, logits: &mut [f32], _generated: &[TokenId]) -> Result<()> {
        let bias = self.bias.values();
        if bias.len() != logits.len() {
            return Err(Error::ShapeMismatch {
                expected: bias.len(),
                actual: logits.len(),
            });
        }
        for (logit, b) in logits.iter_mut().zip(bias) {
            *logit += b;
        }
        Ok(())
    }
}
