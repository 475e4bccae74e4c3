//! Scoring model abstraction and the bundled feed-forward network.
//!
//! The classifier only relies on [`ScoringModel`]: a fixed-width vector in,
//! one score per class out. [`MlpModel`] is the implementation shipped with
//! the service. It reads a safetensors file holding dense layers named
//! `layers.{i}.weight` (`[out, in]`) and `layers.{i}.bias` (`[out]`), applies
//! ReLU between layers and softmax on the output.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use candle_core::{DType, Device, Module, Tensor, D};
use candle_nn::Linear;

use crate::constants::FEATURE_LEN;
use crate::error::{SignError, SignResult};

/// An opaque scoring function: feature vector in, class scores out.
///
/// Implementations are shared read-only between concurrent requests, so
/// `score` takes `&self`. A model that needs exclusive access must do its own
/// locking.
pub trait ScoringModel: Send + Sync {
    /// Width of the expected input vector.
    fn input_len(&self) -> usize;

    /// Number of scores returned per call.
    fn output_len(&self) -> usize;

    /// Scores one feature vector.
    fn score(&self, features: &[f32]) -> SignResult<Vec<f32>>;
}

/// Dense feed-forward classifier evaluated with candle on the CPU.
pub struct MlpModel {
    layers: Vec<Linear>,
    /// `(in, out)` per layer.
    shapes: Vec<(usize, usize)>,
    device: Device,
}

impl fmt::Debug for MlpModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MlpModel")
            .field("shapes", &self.shapes)
            .finish_non_exhaustive()
    }
}

impl MlpModel {
    /// Loads a model from a safetensors file.
    pub fn load(path: &Path) -> SignResult<Self> {
        let load_error = |reason: String| SignError::ModelLoad {
            path: path.to_path_buf(),
            reason,
        };

        if !path.is_file() {
            return Err(load_error("file not found".to_string()));
        }

        let device = Device::Cpu;
        let tensors =
            candle_core::safetensors::load(path, &device).map_err(|e| load_error(e.to_string()))?;

        Self::from_tensors(tensors, device).map_err(load_error)
    }

    /// Builds a model from named tensors.
    ///
    /// Layers must be numbered contiguously from 0, each layer's input width
    /// must match the previous layer's output, and the first layer must take
    /// a full feature vector.
    pub fn from_tensors(
        mut tensors: HashMap<String, Tensor>,
        device: Device,
    ) -> Result<Self, String> {
        let mut layers = Vec::new();
        let mut shapes: Vec<(usize, usize)> = Vec::new();

        for index in 0.. {
            let Some(weight) = tensors.remove(&format!("layers.{index}.weight")) else {
                break;
            };
            let bias = tensors
                .remove(&format!("layers.{index}.bias"))
                .ok_or_else(|| format!("layers.{index}.bias is missing"))?;

            let (out_features, in_features) = weight
                .dims2()
                .map_err(|e| format!("layers.{index}.weight: {e}"))?;
            let bias_len = bias
                .dims1()
                .map_err(|e| format!("layers.{index}.bias: {e}"))?;

            if bias_len != out_features {
                return Err(format!(
                    "layers.{index}.bias has {bias_len} values, expected {out_features}"
                ));
            }
            if let Some(&(_, prev_out)) = shapes.last() {
                if in_features != prev_out {
                    return Err(format!(
                        "layers.{index} takes {in_features} inputs, previous layer gives {prev_out}"
                    ));
                }
            }

            let weight = weight.to_dtype(DType::F32).map_err(|e| e.to_string())?;
            let bias = bias.to_dtype(DType::F32).map_err(|e| e.to_string())?;
            layers.push(Linear::new(weight, Some(bias)));
            shapes.push((in_features, out_features));
        }

        if layers.is_empty() {
            return Err("no layers found (expected layers.0.weight)".to_string());
        }

        if let Some(stray) = tensors.keys().find(|name| name.starts_with("layers.")) {
            return Err(format!("{stray} is not part of a contiguous layer sequence"));
        }

        let input_len = shapes[0].0;
        if input_len != FEATURE_LEN {
            return Err(format!(
                "model takes {input_len} inputs, expected {FEATURE_LEN}"
            ));
        }

        Ok(Self {
            layers,
            shapes,
            device,
        })
    }

    /// Returns `(in, out)` for every layer.
    #[must_use]
    pub fn layer_shapes(&self) -> &[(usize, usize)] {
        &self.shapes
    }

    fn forward(&self, features: &[f32]) -> candle_core::Result<Vec<f32>> {
        let mut x = Tensor::from_slice(features, (1, features.len()), &self.device)?;

        let last = self.layers.len() - 1;
        for (index, layer) in self.layers.iter().enumerate() {
            x = layer.forward(&x)?;
            if index < last {
                x = x.relu()?;
            }
        }

        candle_nn::ops::softmax(&x, D::Minus1)?
            .squeeze(0)?
            .to_vec1::<f32>()
    }
}

impl ScoringModel for MlpModel {
    fn input_len(&self) -> usize {
        self.shapes[0].0
    }

    fn output_len(&self) -> usize {
        self.shapes[self.shapes.len() - 1].1
    }

    fn score(&self, features: &[f32]) -> SignResult<Vec<f32>> {
        if features.len() != self.input_len() {
            return Err(SignError::inference(format!(
                "expected {} features, got {}",
                self.input_len(),
                features.len()
            )));
        }

        self.forward(features).map_err(SignError::inference)
    }
}
