//! Integrity digest sealed onto a returned session.
//!
//! The digest covers both committed finals as serialized JSON, with fields in
//! declaration order, so the same pair of finals always hashes the same.

use serde_json::json;
use sha2::{Digest, Sha256};

use crate::annotation::Annotation;

pub const DIGEST_PREFIX: &str = "sha256:";

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// `sha256:<hex>` over `{"handout_final": .., "handover_final": ..}`.
pub fn finals_digest(handout: Option<&[Annotation]>, handover: Option<&[Annotation]>) -> String {
    let canonical = json!({
        "handout_final": handout,
        "handover_final": handover,
    });
    format!("{DIGEST_PREFIX}{}", sha256_hex(canonical.to_string().as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationSource;

    fn kit(source: AnnotationSource) -> Vec<Annotation> {
        vec![
            Annotation::new("brace", [0.5, 0.5, 0.2, 0.1], source),
            Annotation::new("pliers", [0.3, 0.3, 0.1, 0.1], source),
        ]
    }

    #[test]
    fn empty_input_produces_known_hash() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn digest_is_prefixed_and_stable() {
        let out = kit(AnnotationSource::Manual);
        let back = kit(AnnotationSource::Manual);
        let first = finals_digest(Some(&out), Some(&back));
        assert!(first.starts_with(DIGEST_PREFIX));
        assert_eq!(first.len(), DIGEST_PREFIX.len() + 64);
        assert_eq!(first, finals_digest(Some(&out), Some(&back)));
    }

    #[test]
    fn digest_changes_with_either_final() {
        let out = kit(AnnotationSource::Manual);
        let sealed = finals_digest(Some(&out), Some(&out));

        let mut moved = out.clone();
        moved[1].bbox = [0.31, 0.3, 0.1, 0.1];
        assert_ne!(sealed, finals_digest(Some(&out), Some(&moved)));
        assert_ne!(sealed, finals_digest(Some(&moved), Some(&out)));
        assert_ne!(sealed, finals_digest(Some(&out), None));
    }
}
