//! Reconciliation of raw detector output into a [`PredictionResult`].
//!
//! [`predict`] is a pure function of its inputs: it numbers candidates in
//! emission order, flags each against the threshold, lists the catalog
//! classes nobody detected, and decides whether a human has to review the
//! result before the kit can move on.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::types::BBox;

/// One unvalidated box as emitted by the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    #[serde(rename = "class")]
    pub class_name: String,
    pub confidence: f64,
    #[serde(rename = "box")]
    pub bbox: BBox,
}

impl RawCandidate {
    pub fn new(class_name: impl Into<String>, confidence: f64, bbox: BBox) -> Self {
        Self {
            class_name: class_name.into(),
            confidence,
            bbox,
        }
    }
}

/// A candidate after threshold gating, identified as `det-NNN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub detection_id: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub confidence: f64,
    /// Wire name keeps the historical spelling.
    #[serde(rename = "is_passed_conf_treshold")]
    pub passed_threshold: bool,
    #[serde(rename = "box")]
    pub bbox: BBox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub expected_total: usize,
    pub found_candidates: usize,
    pub passed_above_threshold: usize,
    /// `1` when a human must review the prediction, else `0`.
    pub requires_manual_count: usize,
    pub not_found_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub threshold: f64,
    pub classes_catalog: Vec<String>,
    pub detections: Vec<Detection>,
    pub not_found: Vec<String>,
    pub summary: PredictionSummary,
}

impl PredictionResult {
    pub fn requires_manual_review(&self) -> bool {
        self.summary.requires_manual_count > 0
    }
}

/// Format the local id of the `ordinal`-th (1-based) candidate.
fn detection_id(ordinal: usize) -> String {
    format!("det-{ordinal:03}")
}

/// Turn raw candidates into a [`PredictionResult`].
///
/// Multiplicity is not an error here: a class may show up zero, one or many
/// times. Only classes with zero candidates land in `not_found`, so
/// `found_candidates + not_found_count` is not expected to equal the catalog
/// size.
pub fn predict(candidates: &[RawCandidate], catalog: &Catalog, threshold: f64) -> PredictionResult {
    let detections: Vec<Detection> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| Detection {
            detection_id: detection_id(i + 1),
            class_name: c.class_name.clone(),
            confidence: c.confidence,
            passed_threshold: c.confidence >= threshold,
            bbox: c.bbox,
        })
        .collect();

    let found: HashSet<&str> = detections.iter().map(|d| d.class_name.as_str()).collect();
    let not_found: Vec<String> = catalog
        .iter()
        .filter(|class| !found.contains(class))
        .map(str::to_string)
        .collect();

    let passed_above_threshold = detections.iter().filter(|d| d.passed_threshold).count();
    let any_failed = detections.iter().any(|d| !d.passed_threshold);
    let requires_manual = !not_found.is_empty() || any_failed;

    let summary = PredictionSummary {
        expected_total: catalog.len(),
        found_candidates: detections.len(),
        passed_above_threshold,
        requires_manual_count: usize::from(requires_manual),
        not_found_count: not_found.len(),
    };

    PredictionResult {
        threshold,
        classes_catalog: catalog.classes().to_vec(),
        detections,
        not_found,
        summary,
    }
}
