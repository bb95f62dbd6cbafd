//! HTTP inference backend for the detector adapter.
//!
//! Posts the image to an external model server and converts its pixel
//! `xyxy` boxes into normalized center boxes labelled with catalog names.

use std::time::Duration;

use async_trait::async_trait;
use kitcheck_core::catalog::Catalog;
use kitcheck_core::detection::RawCandidate;
use kitcheck_core::detector::{DecodedImage, Detector, DetectorError};
use kitcheck_core::types::BBox;
use serde::{Deserialize, Serialize};

/// Model label -> catalog class.
///
/// The model was trained with its own label set; this table is fixed by
/// the weights in production.
pub const MODEL_LABELS: [(&str, &str); 11] = [
    ("1_screw_driver_minus", "screwdriver_minus"),
    ("2_screw_driver_plus", "screwdriver_plus"),
    ("3_screw_driver_cross", "offset_cross"),
    ("4_brace", "brace"),
    ("5_contouring_pliers", "lock_pliers"),
    ("6_pliers", "shernitsa"),
    ("7_slip_joint_pilers", "wrench_adjustable"),
    ("8_wrench", "oil_can_opener"),
    ("9_can_opener", "pliers"),
    ("10_spanner", "ring_wrench_3_4"),
    ("11_side_cutters", "nippers"),
];

/// Resolve a model label: exact match first, then case-insensitive containment.
pub fn map_label(label: &str) -> Option<&'static str> {
    if let Some((_, class)) = MODEL_LABELS.iter().find(|(model, _)| *model == label) {
        return Some(*class);
    }
    let lowered = label.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return None;
    }
    MODEL_LABELS
        .iter()
        .find(|(model, _)| lowered.contains(model) || model.contains(lowered.as_str()))
        .map(|(_, class)| *class)
}

/// Convert a pixel `[x1, y1, x2, y2]` box to normalized `[xc, yc, w, h]`.
pub fn xyxy_to_center(xyxy: [f64; 4], width: u32, height: u32) -> BBox {
    let (w, h) = (f64::from(width), f64::from(height));
    let [x1, y1, x2, y2] = xyxy;
    let clamp = |v: f64| v.clamp(0.0, 1.0);
    [
        clamp((x1 + x2) / 2.0 / w),
        clamp((y1 + y2) / 2.0 / h),
        clamp((x2 - x1).abs() / w),
        clamp((y2 - y1).abs() / h),
    ]
}

#[derive(Debug, Serialize)]
struct InferRequest<'a> {
    image: &'a str,
    conf: f64,
}

#[derive(Debug, Deserialize)]
struct InferResponse {
    boxes: Vec<ModelBox>,
}

#[derive(Debug, Deserialize)]
struct ModelBox {
    label: String,
    confidence: f64,
    xyxy: [f64; 4],
}

pub struct HttpDetector {
    client: reqwest::Client,
    endpoint: String,
    catalog: Catalog,
}

impl HttpDetector {
    pub fn new(
        endpoint: impl Into<String>,
        catalog: Catalog,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            catalog,
        })
    }

    fn convert(&self, boxes: Vec<ModelBox>, image: &DecodedImage) -> Vec<RawCandidate> {
        boxes
            .into_iter()
            .filter_map(|b| {
                let class = map_label(&b.label).filter(|c| self.catalog.contains(c));
                match class {
                    Some(class) => Some(RawCandidate::new(
                        class,
                        b.confidence,
                        xyxy_to_center(b.xyxy, image.width, image.height),
                    )),
                    None => {
                        tracing::warn!(label = %b.label, "Skipping unknown model label");
                        None
                    }
                }
            })
            .collect()
    }
}

#[async_trait]
impl Detector for HttpDetector {
    fn name(&self) -> &str {
        "http"
    }

    async fn infer(
        &self,
        image: &DecodedImage,
        confidence: f64,
    ) -> Result<Vec<RawCandidate>, DetectorError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&InferRequest {
                image: &image.base64,
                conf: confidence,
            })
            .send()
            .await
            .map_err(|e| DetectorError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DetectorError::Unavailable(format!(
                "model server returned HTTP {}",
                response.status().as_u16()
            )));
        }

        let body: InferResponse = response
            .json()
            .await
            .map_err(|e| DetectorError::InvalidResponse(e.to_string()))?;

        Ok(self.convert(body.boxes, image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_labels_map() {
        assert_eq!(map_label("4_brace"), Some("brace"));
        assert_eq!(map_label("8_wrench"), Some("oil_can_opener"));
        assert_eq!(map_label("11_side_cutters"), Some("nippers"));
    }

    #[test]
    fn containment_is_case_insensitive() {
        assert_eq!(map_label("6_PLIERS"), Some("shernitsa"));
        assert_eq!(map_label("class_10_spanner_v2"), Some("ring_wrench_3_4"));
        assert_eq!(map_label("hammer"), None);
        assert_eq!(map_label(""), None);
    }

    #[test]
    fn every_mapped_class_is_in_the_default_catalog() {
        let catalog = Catalog::default();
        for (_, class) in MODEL_LABELS {
            assert!(catalog.contains(class), "{class} missing from catalog");
        }
    }

    #[test]
    fn xyxy_converts_to_normalized_center() {
        let b = xyxy_to_center([100.0, 50.0, 300.0, 150.0], 400, 200);
        assert_eq!(b, [0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn boxes_past_the_edge_are_clamped() {
        let b = xyxy_to_center([-10.0, 0.0, 500.0, 100.0], 400, 100);
        assert!(b.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(b[2], 1.0);
    }

    #[test]
    fn unknown_labels_are_dropped() {
        let detector =
            HttpDetector::new("http://localhost:0", Catalog::default(), Duration::from_secs(1))
                .unwrap();
        let image = DecodedImage {
            base64: String::new(),
            bytes: Vec::new(),
            width: 100,
            height: 100,
        };
        let boxes = vec![
            ModelBox {
                label: "2_screw_driver_plus".into(),
                confidence: 0.9,
                xyxy: [0.0, 0.0, 50.0, 50.0],
            },
            ModelBox {
                label: "hammer".into(),
                confidence: 0.99,
                xyxy: [0.0, 0.0, 10.0, 10.0],
            },
        ];
        let candidates = detector.convert(boxes, &image);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].class_name, "screwdriver_plus");
        assert_eq!(candidates[0].bbox, [0.25, 0.25, 0.5, 0.5]);
    }
}
