//! Handout vs. handover comparison.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::annotation::{Annotation, AnnotationSource};
use crate::catalog::Catalog;
use crate::types::BBox;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    #[serde(rename = "box")]
    pub bbox: BBox,
    pub source: AnnotationSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Every catalog class mapped to `1`, in catalog order.
    pub expected: IndexMap<String, u8>,
    pub handout_final: IndexMap<String, DiffEntry>,
    pub handover_final: IndexMap<String, DiffEntry>,
    /// Issued but not returned.
    pub missing: Vec<String>,
    /// Returned classes outside the catalog.
    pub extra: Vec<String>,
}

impl DiffResult {
    /// True when everything handed out came back and nothing foreign did.
    pub fn is_balanced(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

fn by_class(annotations: &[Annotation]) -> IndexMap<String, DiffEntry> {
    let mut map = IndexMap::with_capacity(annotations.len());
    for a in annotations {
        // Last writer wins on a repeated class.
        map.insert(
            a.class_name.clone(),
            DiffEntry {
                bbox: a.bbox,
                source: a.source,
            },
        );
    }
    map
}

/// Compare two finalized annotation sets class by class.
pub fn diff(handout: &[Annotation], handover: &[Annotation], catalog: &Catalog) -> DiffResult {
    let handout_final = by_class(handout);
    let handover_final = by_class(handover);

    let missing = handout_final
        .keys()
        .filter(|class| !handover_final.contains_key(*class))
        .cloned()
        .collect();

    let extra = handover_final
        .keys()
        .filter(|class| !catalog.contains(class))
        .cloned()
        .collect();

    DiffResult {
        expected: catalog.iter().map(|c| (c.to_string(), 1)).collect(),
        handout_final,
        handover_final,
        missing,
        extra,
    }
}
