//! Final annotations and the completeness check that gates every
//! handout/handover commit.
//!
//! [`validate_final_annotations`] runs every check in one pass and reports
//! each problem once, under a single code. A duplicated known class is a
//! duplicate (plus whatever class it displaced is missing); it is never also
//! reported as unknown.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::types::{is_normalized, BBox};

/// Where a final annotation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationSource {
    /// Accepted unchanged from a model detection.
    #[default]
    Model,
    /// Drawn by the operator.
    Manual,
    /// A model detection the operator moved or resized.
    Edited,
}

impl AnnotationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Manual => "manual",
            Self::Edited => "edited",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "class")]
    pub class_name: String,
    #[serde(rename = "box")]
    pub bbox: BBox,
    #[serde(default)]
    pub source: AnnotationSource,
}

impl Annotation {
    pub fn new(class_name: impl Into<String>, bbox: BBox, source: AnnotationSource) -> Self {
        Self {
            class_name: class_name.into(),
            bbox,
            source,
        }
    }
}

/// One problem found in a submitted annotation set.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    /// Catalog classes with no annotation, in catalog order.
    MissingClasses(Vec<String>),
    /// Submitted classes outside the catalog, in submission order.
    UnknownClasses(Vec<String>),
    /// Classes submitted more than once, in order of first repeat.
    DuplicateClasses(Vec<String>),
    /// A box with a component outside `[0, 1]`.
    BoxNotNormalized { index: usize, bbox: BBox },
}

impl ValidationIssue {
    /// Stable machine-readable code. Codes never overlap.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingClasses(_) => "missing_classes",
            Self::UnknownClasses(_) => "unknown_classes",
            Self::DuplicateClasses(_) => "duplicate_classes",
            Self::BoxNotNormalized { .. } => "bbox_not_normalized",
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingClasses(classes) => write!(f, "Missing classes: {classes:?}"),
            Self::UnknownClasses(classes) => write!(f, "Unknown classes: {classes:?}"),
            Self::DuplicateClasses(classes) => {
                write!(f, "Each class must appear exactly once; repeated: {classes:?}")
            }
            Self::BoxNotNormalized { index, bbox } => {
                write!(f, "Annotation[{index}] bbox must be normalized [0..1]: {bbox:?}")
            }
        }
    }
}

/// Outcome of [`validate_final_annotations`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    /// Human-readable issue strings, in the order the checks fired.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

/// Check that `annotations` account for every catalog class exactly once
/// with normalized boxes.
///
/// Cardinality is not checked on its own: a set of the wrong size can never
/// match the catalog, so the class checks below already catch it.
pub fn validate_final_annotations(annotations: &[Annotation], catalog: &Catalog) -> ValidationReport {
    let mut issues = Vec::new();

    let submitted: HashSet<&str> = annotations.iter().map(|a| a.class_name.as_str()).collect();

    let missing: Vec<String> = catalog
        .iter()
        .filter(|c| !submitted.contains(c))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        issues.push(ValidationIssue::MissingClasses(missing));
    }

    let mut unknown: Vec<String> = Vec::new();
    for a in annotations {
        if !catalog.contains(&a.class_name) && !unknown.contains(&a.class_name) {
            unknown.push(a.class_name.clone());
        }
    }
    if !unknown.is_empty() {
        issues.push(ValidationIssue::UnknownClasses(unknown));
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(annotations.len());
    let mut repeated: Vec<String> = Vec::new();
    for a in annotations {
        if !seen.insert(a.class_name.as_str()) && !repeated.contains(&a.class_name) {
            repeated.push(a.class_name.clone());
        }
    }
    if !repeated.is_empty() {
        issues.push(ValidationIssue::DuplicateClasses(repeated));
    }

    for (index, a) in annotations.iter().enumerate() {
        if !is_normalized(&a.bbox) {
            issues.push(ValidationIssue::BoxNotNormalized {
                index,
                bbox: a.bbox,
            });
        }
    }

    ValidationReport { issues }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const BOX: BBox = [0.5, 0.5, 0.2, 0.1];

    fn complete_set() -> Vec<Annotation> {
        Catalog::default()
            .iter()
            .map(|c| Annotation::new(c, BOX, AnnotationSource::Manual))
            .collect()
    }

    #[test]
    fn complete_set_is_accepted() {
        let annotations = complete_set();
        let report = validate_final_annotations(&annotations, &Catalog::default());
        assert!(report.is_ok());
        assert_eq!(annotations.len(), 11);
    }

    #[test]
    fn order_of_submission_does_not_matter() {
        let mut annotations = complete_set();
        annotations.reverse();
        assert!(validate_final_annotations(&annotations, &Catalog::default()).is_ok());
    }

    #[test]
    fn duplicate_reports_missing_and_duplicate_but_not_unknown() {
        let mut annotations = complete_set();
        annotations[1].class_name = annotations[0].class_name.clone();

        let report = validate_final_annotations(&annotations, &Catalog::default());
        assert!(!report.is_ok());

        let codes: Vec<_> = report.issues.iter().map(ValidationIssue::code).collect();
        assert_eq!(codes, vec!["missing_classes", "duplicate_classes"]);

        let messages = report.messages().join(" | ");
        assert!(messages.contains("Missing classes"));
        assert!(messages.contains("wrench_adjustable"));
        assert!(messages.contains("exactly once"));
    }

    #[test]
    fn single_unnormalized_box_gives_one_indexed_issue() {
        let mut annotations = complete_set();
        annotations[3].bbox = [1.5, 0.5, 0.2, 0.1];

        let report = validate_final_annotations(&annotations, &Catalog::default());
        assert_eq!(report.issues.len(), 1);
        assert_matches!(
            report.issues[0],
            ValidationIssue::BoxNotNormalized { index: 3, .. }
        );
        assert!(report.messages()[0].starts_with("Annotation[3] bbox must be normalized"));
    }

    #[test]
    fn unknown_class_reports_unknown_and_missing() {
        let mut annotations = complete_set();
        annotations[10].class_name = "hammer".into();

        let report = validate_final_annotations(&annotations, &Catalog::default());
        assert_eq!(
            report.issues,
            vec![
                ValidationIssue::MissingClasses(vec!["oil_can_opener".into()]),
                ValidationIssue::UnknownClasses(vec!["hammer".into()]),
            ]
        );
    }

    #[test]
    fn every_check_runs_in_one_pass() {
        let mut annotations = complete_set();
        annotations[0].class_name = "hammer".into();
        annotations[2].class_name = "pliers".into();
        annotations[5].bbox = [0.5, 0.5, -0.1, 0.1];
        annotations[6].bbox = [0.5, 2.0, 0.1, 0.1];

        let report = validate_final_annotations(&annotations, &Catalog::default());
        let codes: Vec<_> = report.issues.iter().map(ValidationIssue::code).collect();
        assert_eq!(
            codes,
            vec![
                "missing_classes",
                "unknown_classes",
                "duplicate_classes",
                "bbox_not_normalized",
                "bbox_not_normalized",
            ]
        );
    }

    #[test]
    fn wrong_cardinality_caught_by_class_checks() {
        let mut annotations = complete_set();
        annotations.pop();
        let report = validate_final_annotations(&annotations, &Catalog::default());
        assert_eq!(
            report.issues,
            vec![ValidationIssue::MissingClasses(vec!["oil_can_opener".into()])]
        );

        let mut annotations = complete_set();
        annotations.push(Annotation::new("pliers", BOX, AnnotationSource::Model));
        let report = validate_final_annotations(&annotations, &Catalog::default());
        assert_eq!(
            report.issues,
            vec![ValidationIssue::DuplicateClasses(vec!["pliers".into()])]
        );
    }

    #[test]
    fn validation_is_parametric_over_catalog_size() {
        let catalog = Catalog::new(["a", "b", "c"]).unwrap();
        let annotations = vec![
            Annotation::new("c", BOX, AnnotationSource::Model),
            Annotation::new("a", BOX, AnnotationSource::Edited),
            Annotation::new("b", BOX, AnnotationSource::Manual),
        ];
        assert!(validate_final_annotations(&annotations, &catalog).is_ok());
    }

    #[test]
    fn source_defaults_to_model_on_the_wire() {
        let a: Annotation =
            serde_json::from_str(r#"{"class": "brace", "box": [0.1, 0.2, 0.3, 0.4]}"#).unwrap();
        assert_eq!(a.source, AnnotationSource::Model);
        assert_eq!(a.class_name, "brace");
    }

    #[test]
    fn unknown_source_rejected_on_the_wire() {
        let parsed = serde_json::from_str::<Annotation>(
            r#"{"class": "brace", "box": [0.1, 0.2, 0.3, 0.4], "source": "guess"}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn box_must_have_four_components_on_the_wire() {
        let parsed =
            serde_json::from_str::<Annotation>(r#"{"class": "brace", "box": [0.1, 0.2, 0.3]}"#);
        assert!(parsed.is_err());
    }
}
