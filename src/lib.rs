//! Sign Letter Recognition Library
//!
//! This library turns 21 hand landmarks, as produced by an external hand
//! tracker, into a sign language letter with a confidence score. It provides
//! landmark validation, wrist-relative normalization, the classifier with its
//! decision policy, and (with the `web` feature) the HTTP service around it.

// Module declarations
pub mod classifier;
pub mod config;
pub mod constants;
pub mod error;
pub mod landmarks;
pub mod normalizer;
#[cfg(feature = "web")]
pub mod web;

pub use classifier::{Classification, ClassifierState, SignClassifier};
pub use error::{SignError, SignResult};
pub use landmarks::{Landmark, LandmarkFrame};
pub use normalizer::{normalize, FeatureVector};
