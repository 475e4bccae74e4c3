//! Sign classification: scoring model, label table and decision policy.
//!
//! [`SignClassifier`] is built once at startup and shared read-only.
//! [`ClassifierState`] wraps it so a failed load leaves the service running
//! but reporting itself unavailable.

pub mod labels;
pub mod model;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::ModelConfig;
use crate::constants::{CONFIDENCE_DECIMALS, CONFIDENCE_THRESHOLD, FEATURE_LEN};
use crate::error::{SignError, SignResult};
use crate::landmarks::LandmarkFrame;
use crate::normalizer::{normalize, FeatureVector};

pub use labels::LabelTable;
pub use model::{MlpModel, ScoringModel};

/// Outcome of classifying one frame.
///
/// Either a letter with its rounded confidence, or the no-decision value
/// (empty letter, zero confidence).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Predicted letter, empty when no decision was made.
    pub letter: String,
    /// Confidence in `[0, 1]`, rounded to four decimals.
    pub confidence: f64,
}

impl Classification {
    /// The no-decision result.
    #[must_use]
    pub fn none() -> Self {
        Self {
            letter: String::new(),
            confidence: 0.0,
        }
    }

    /// True if a letter was predicted.
    #[must_use]
    pub fn is_decision(&self) -> bool {
        !self.letter.is_empty()
    }
}

/// Immutable classifier: scoring model, labels and reserved index.
pub struct SignClassifier {
    model: Arc<dyn ScoringModel>,
    labels: LabelTable,
    /// Class index that means "no confident class", if the model has one.
    reserved_index: Option<usize>,
}

impl std::fmt::Debug for SignClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignClassifier")
            .field("labels", &self.labels.len())
            .field("reserved_index", &self.reserved_index)
            .finish_non_exhaustive()
    }
}

impl SignClassifier {
    /// Assembles a classifier, checking that model and labels fit together.
    pub fn new(
        model: Arc<dyn ScoringModel>,
        labels: LabelTable,
        reserved_index: Option<usize>,
    ) -> SignResult<Self> {
        if model.input_len() != FEATURE_LEN {
            return Err(SignError::Incompatible {
                reason: format!(
                    "model takes {} inputs, expected {FEATURE_LEN}",
                    model.input_len()
                ),
            });
        }
        if model.output_len() < labels.len() {
            return Err(SignError::Incompatible {
                reason: format!(
                    "model produces {} scores for {} labels",
                    model.output_len(),
                    labels.len()
                ),
            });
        }

        Ok(Self {
            model,
            labels,
            reserved_index,
        })
    }

    /// Loads the bundled model and the label table named by `config`.
    pub fn load(config: &ModelConfig) -> SignResult<Self> {
        let model = MlpModel::load(&config.model_path)?;
        info!("Model layers (in, out): {:?}", model.layer_shapes());

        let labels = LabelTable::load(&config.label_path)?;
        Self::new(Arc::new(model), labels, config.reserved_index)
    }

    /// Returns the label table.
    #[must_use]
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Returns the reserved class index, if any.
    #[must_use]
    pub fn reserved_index(&self) -> Option<usize> {
        self.reserved_index
    }

    /// Normalizes a frame and classifies it.
    pub fn recognize(&self, frame: &LandmarkFrame) -> SignResult<Classification> {
        self.classify(&normalize(frame))
    }

    /// Scores a feature vector and applies the decision policy.
    pub fn classify(&self, vector: &FeatureVector) -> SignResult<Classification> {
        let scores = self.model.score(&vector.to_f32())?;
        Ok(self.decide(&scores))
    }

    /// Turns raw class scores into a classification.
    ///
    /// The top score wins, with the lowest index winning ties. No decision is
    /// made when the top score is at or below the threshold, when there are
    /// no scores, or when the winning index has no label or is the reserved
    /// index. Scores above 1.0 are reported as 1.0.
    #[must_use]
    pub fn decide(&self, scores: &[f32]) -> Classification {
        let Some((index, confidence)) = top_score(scores) else {
            return Classification::none();
        };

        debug!(index, confidence, "Top class score");

        if confidence <= CONFIDENCE_THRESHOLD || self.reserved_index == Some(index) {
            return Classification::none();
        }

        match self.labels.get(index) {
            Some(letter) => Classification {
                letter: letter.to_string(),
                confidence: round_confidence(confidence.min(1.0)),
            },
            None => Classification::none(),
        }
    }
}

/// First index holding the maximum score; NaN scores never win.
fn top_score(scores: &[f32]) -> Option<(usize, f64)> {
    scores
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.is_nan())
        .fold(None, |best: Option<(usize, f32)>, (index, &score)| match best {
            Some((_, top)) if score <= top => best,
            _ => Some((index, score)),
        })
        .map(|(index, score)| (index, f64::from(score)))
}

fn round_confidence(confidence: f64) -> f64 {
    let factor = 10f64.powi(CONFIDENCE_DECIMALS);
    (confidence * factor).round() / factor
}

/// Classifier availability as seen by request handlers.
#[derive(Debug, Clone)]
pub enum ClassifierState {
    /// Model and labels are loaded.
    Ready(Arc<SignClassifier>),
    /// Loading failed; every classification reports this reason.
    Unavailable {
        /// Load failure message.
        reason: String,
    },
}

impl ClassifierState {
    /// Loads the classifier, logging instead of failing on error.
    pub fn load(config: &ModelConfig) -> Self {
        info!("Loading model from {}", config.model_path.display());
        info!("Loading labels from {}", config.label_path.display());

        match SignClassifier::load(config) {
            Ok(classifier) => {
                info!("Loaded model and {} labels", classifier.labels().len());
                Self::Ready(Arc::new(classifier))
            }
            Err(e) => {
                error!("Model load failed: {e}");
                error!("Expected model at: {}", config.model_path.display());
                Self::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// True if classifications can be served.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Returns the classifier or a `ModelUnavailable` error.
    pub fn classifier(&self) -> SignResult<&SignClassifier> {
        match self {
            Self::Ready(classifier) => Ok(classifier),
            Self::Unavailable { reason } => Err(SignError::ModelUnavailable {
                reason: reason.clone(),
            }),
        }
    }

    /// Runs the full pipeline for one frame.
    pub fn recognize(&self, frame: &LandmarkFrame) -> SignResult<Classification> {
        self.classifier()?.recognize(frame)
    }
}

impl From<SignClassifier> for ClassifierState {
    fn from(classifier: SignClassifier) -> Self {
        Self::Ready(Arc::new(classifier))
    }
}
