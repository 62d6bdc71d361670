//! Bias vector asset loading.

use std::path::Path;

use candle_core::{DType, Device};
use tracing::info;

use crate::error::{Error, Result};

/// Additive per-vocabulary-position logit correction.
///
/// The numeric values are an opaque external asset produced alongside the
/// trained model: large negative entries outside the valid speech-token
/// subrange are what restrict a greedy decoder to legal continuations.
/// Loaded once at startup and immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct BiasVector {
    values: Vec<f32>,
}

impl BiasVector {
    /// Tensor name expected inside the safetensors asset.
    pub const TENSOR_NAME: &'static str = "bias";

    /// Load the bias vector from a safetensors file containing a single
    /// rank-1 `bias` tensor, converting to `f32` regardless of stored dtype.
    ///
    /// Fails with [`Error::AssetLoad`] when the file is missing or corrupt,
    /// and with [`Error::ShapeMismatch`] when the stored length differs from
    /// `expected_len` (the model vocabulary size).
    pub fn load(path: &Path, expected_len: usize) -> Result<Self> {
        let tensors = candle_core::safetensors::load(path, &Device::Cpu)
            .map_err(|e| Error::AssetLoad(format!("{}: {e}", path.display())))?;

        let tensor = tensors.get(Self::TENSOR_NAME).ok_or_else(|| {
            Error::AssetLoad(format!(
                "{}: missing `{}` tensor",
                path.display(),
                Self::TENSOR_NAME
            ))
        })?;

        let values = tensor
            .flatten_all()
            .and_then(|t| t.to_dtype(DType::F32))
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(|e| Error::AssetLoad(format!("{}: {e}", path.display())))?;

        if values.len() != expected_len {
            return Err(Error::ShapeMismatch {
                expected: expected_len,
                actual: values.len(),
            });
        }

        info!(
            "Loaded bias vector ({} entries) from {}",
            values.len(),
            path.display()
        );
        Ok(Self { values })
    }

    /// Build from in-memory values (tests, alternative asset stores).
    pub fn from_values(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}
