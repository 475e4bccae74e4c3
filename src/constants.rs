//! Application-wide constants.
//!
//! This module defines the fixed parts of the classification contract
//! alongside naming used by the server binary.

/// Service name reported by the index endpoint.
pub const SERVICE_NAME: &str = "sign-api-asl";

/// Directory name used under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "SignApi";

/// Number of hand landmarks in one input frame.
pub const LANDMARK_COUNT: usize = 21;

/// Length of the normalized feature vector (x and y per landmark).
pub const FEATURE_LEN: usize = LANDMARK_COUNT * 2;

/// Scale values below this are treated as a degenerate (collapsed) hand.
pub const MIN_SCALE: f64 = 1e-9;

/// Top scores at or below this value produce no decision.
pub const CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Number of decimal digits kept in a reported confidence.
pub const CONFIDENCE_DECIMALS: i32 = 4;
