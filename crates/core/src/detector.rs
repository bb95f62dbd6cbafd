//! Detector seam and the adapter that never lets a detector failure escape.
//!
//! The adapter decodes the submitted image, calls the configured backend
//! under a timeout, and substitutes [`stub_candidates`] whenever anything in
//! that chain fails (no backend, undecodable image, backend error, timeout).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;

use crate::catalog::Catalog;
use crate::detection::RawCandidate;

pub const DEFAULT_BASE_CONFIDENCE: f64 = 0.25;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("Image decode failed: {0}")]
    Decode(String),

    #[error("Detector unavailable: {0}")]
    Unavailable(String),

    #[error("Detector returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("Detector timed out after {0:?}")]
    Timeout(Duration),
}

/// A submitted image after base64 decoding.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Base64 payload with any `data:...;base64,` prefix removed.
    pub base64: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode a base64 image (optionally a data URL) and read its dimensions.
pub fn decode_image(image: &str) -> Result<DecodedImage, DetectorError> {
    let payload = match image.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => image,
    }
    .trim();

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| DetectorError::Decode(format!("invalid base64: {e}")))?;
    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| DetectorError::Decode(e.to_string()))?;

    Ok(DecodedImage {
        base64: payload.to_string(),
        width: decoded.width(),
        height: decoded.height(),
        bytes,
    })
}

/// An object-detection backend.
///
/// Implementations return candidates in normalized center format with class
/// names already mapped onto the catalog.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Short backend name reported by the status endpoint.
    fn name(&self) -> &str;

    async fn infer(
        &self,
        image: &DecodedImage,
        confidence: f64,
    ) -> Result<Vec<RawCandidate>, DetectorError>;
}

/// Canned output used whenever the real detector cannot answer.
pub fn stub_candidates() -> Vec<RawCandidate> {
    vec![
        RawCandidate::new("screwdriver_plus", 0.992, [0.512, 0.431, 0.183, 0.072]),
        RawCandidate::new("wrench_adjustable", 0.74, [0.246, 0.611, 0.204, 0.090]),
        RawCandidate::new("screwdriver_plus", 0.981, [0.300, 0.400, 0.150, 0.080]),
    ]
}

pub struct DetectorAdapter {
    detector: Option<Arc<dyn Detector>>,
    catalog: Catalog,
    timeout: Duration,
    base_confidence: f64,
}

impl DetectorAdapter {
    pub fn new(
        detector: Option<Arc<dyn Detector>>,
        catalog: Catalog,
        timeout: Duration,
        base_confidence: f64,
    ) -> Self {
        Self {
            detector,
            catalog,
            timeout,
            base_confidence,
        }
    }

    /// Adapter with no backend: every call returns the stub.
    pub fn stub_only(catalog: Catalog) -> Self {
        Self::new(None, catalog, DEFAULT_TIMEOUT, DEFAULT_BASE_CONFIDENCE)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn has_backend(&self) -> bool {
        self.detector.is_some()
    }

    /// Backend name, or `"stub"` when none is configured.
    pub fn backend_name(&self) -> &str {
        self.detector.as_deref().map_or("stub", |d| d.name())
    }

    /// Confidence used when the caller has no threshold of its own.
    pub fn base_confidence(&self) -> f64 {
        self.base_confidence
    }

    /// Run inference on a base64 image, asking the model for boxes at or
    /// above `confidence`. Never fails.
    pub async fn infer(&self, image: &str, confidence: f64) -> (Catalog, Vec<RawCandidate>) {
        let candidates = match self.try_infer(image, confidence).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(
                    backend = self.backend_name(),
                    error = %e,
                    "Detector failed, falling back to stub output",
                );
                stub_candidates()
            }
        };
        (self.catalog.clone(), candidates)
    }

    async fn try_infer(
        &self,
        image: &str,
        confidence: f64,
    ) -> Result<Vec<RawCandidate>, DetectorError> {
        let detector = self
            .detector
            .as_ref()
            .ok_or_else(|| DetectorError::Unavailable("no detector configured".to_string()))?;

        let decoded = decode_image(image)?;
        let candidates = tokio::time::timeout(
            self.timeout,
            detector.infer(&decoded, confidence),
        )
        .await
        .map_err(|_| DetectorError::Timeout(self.timeout))??;

        tracing::debug!(
            backend = detector.name(),
            count = candidates.len(),
            confidence,
            width = decoded.width,
            height = decoded.height,
            "Detector returned candidates",
        );
        Ok(candidates)
    }
}
