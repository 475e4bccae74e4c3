//! Shared test fixtures for the pipeline and web API tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use candle_core::{Device, Tensor};
use serde_json::{json, Value};
use sign_api::classifier::{LabelTable, ScoringModel, SignClassifier};
use sign_api::config::ModelConfig;
use sign_api::constants::FEATURE_LEN;
use sign_api::{Landmark, LandmarkFrame, SignError, SignResult};
use tempfile::TempDir;

/// Labels of the on-disk test model; "-" is the reserved class.
pub const TEST_LABELS: [&str; 3] = ["A", "B", "-"];

/// Model that returns fixed scores and counts how often it was called.
pub struct FixedModel {
    scores: Vec<f32>,
    calls: AtomicUsize,
}

impl FixedModel {
    pub fn new(scores: Vec<f32>) -> Arc<Self> {
        Arc::new(Self {
            scores,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ScoringModel for FixedModel {
    fn input_len(&self) -> usize {
        FEATURE_LEN
    }

    fn output_len(&self) -> usize {
        self.scores.len()
    }

    fn score(&self, features: &[f32]) -> SignResult<Vec<f32>> {
        assert_eq!(features.len(), FEATURE_LEN);
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.scores.clone())
    }
}

/// Model whose every call fails.
pub struct FailingModel;

impl ScoringModel for FailingModel {
    fn input_len(&self) -> usize {
        FEATURE_LEN
    }

    fn output_len(&self) -> usize {
        3
    }

    fn score(&self, _features: &[f32]) -> SignResult<Vec<f32>> {
        Err(SignError::inference("device lost"))
    }
}

/// Classifier over `model` with labels A, B, C.
pub fn classifier_with(model: Arc<dyn ScoringModel>) -> SignClassifier {
    SignClassifier::new(model, LabelTable::new(["A", "B", "C"]), None)
        .expect("Failed to build classifier")
}

/// Single-layer 42 -> 3 network.
///
/// Class "A" fires when landmark 1 sits right of the wrist, "B" when it sits
/// left of it, and the reserved class "-" when it sits below it. A collapsed
/// hand scores all classes equally.
pub fn test_model_tensors() -> HashMap<String, Tensor> {
    let mut weight = vec![0.0f32; 3 * FEATURE_LEN];
    weight[2] = 3.0;
    weight[FEATURE_LEN + 2] = -3.0;
    weight[2 * FEATURE_LEN + 3] = 3.0;

    HashMap::from([
        (
            "layers.0.weight".to_string(),
            Tensor::from_vec(weight, (3, FEATURE_LEN), &Device::Cpu).unwrap(),
        ),
        (
            "layers.0.bias".to_string(),
            Tensor::from_vec(vec![0.0f32; 3], 3, &Device::Cpu).unwrap(),
        ),
    ])
}

/// Writes the test model and label table into `dir`.
pub fn write_model_files(dir: &Path) -> ModelConfig {
    let model_path = dir.join("sign_model.safetensors");
    let label_path = dir.join("label.csv");

    candle_core::safetensors::save(&test_model_tensors(), &model_path)
        .expect("Failed to write model");
    fs::write(&label_path, format!("\u{feff}{}\n", TEST_LABELS.join("\n")))
        .expect("Failed to write labels");

    ModelConfig {
        model_path,
        label_path,
        reserved_index: Some(2),
    }
}

/// Temp dir holding the test model files plus the matching config.
pub fn model_dir() -> (TempDir, ModelConfig) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_model_files(temp_dir.path());
    (temp_dir, config)
}

/// 21 points all at the wrist position.
pub fn collapsed_points(x: f64, y: f64) -> Vec<Landmark> {
    vec![Landmark::new(x, y); 21]
}

/// Collapsed hand with only landmark 1 moved by `(dx, dy)`.
pub fn one_finger_points(dx: f64, dy: f64) -> Vec<Landmark> {
    let mut points = collapsed_points(0.5, 0.5);
    points[1] = Landmark::new(0.5 + dx, 0.5 + dy);
    points
}

/// Deterministic, irregular hand-like frames for property checks.
pub fn varied_frames() -> Vec<LandmarkFrame> {
    (1..=12)
        .map(|seed: u32| {
            let s = f64::from(seed);
            let points: Vec<Landmark> = (0..21u32)
                .map(|i| {
                    let t = f64::from(i);
                    Landmark::new(
                        0.4 + 0.3 * (s * 0.7 + t * 1.3).sin() * (t / 20.0),
                        0.6 - 0.25 * (s * 1.1 + t * 0.9).cos() * (t / 20.0),
                    )
                })
                .collect();
            LandmarkFrame::try_from(points).unwrap()
        })
        .collect()
}

/// JSON body with positional landmark pairs.
pub fn landmarks_body(points: &[Landmark]) -> Value {
    let pairs: Vec<Value> = points.iter().map(|p| json!([p.x, p.y])).collect();
    json!({ "landmarks": pairs })
}

/// JSON body with named landmark objects.
pub fn named_landmarks_body(points: &[Landmark]) -> Value {
    let objects: Vec<Value> = points
        .iter()
        .map(|p| json!({ "x": p.x, "y": p.y, "z": 0.0 }))
        .collect();
    json!({ "landmarks": objects })
}
