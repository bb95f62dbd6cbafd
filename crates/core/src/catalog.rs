//! The tool catalog: the fixed set of classes every kit must account for.
//!
//! The deployed catalog holds exactly 11 classes, but nothing downstream
//! hardcodes that number; validation and diffing are parametric over
//! [`Catalog::len`].

use std::collections::HashSet;

use crate::error::CoreError;

/// Classes in the deployed kit, in display order.
pub const DEFAULT_CLASSES: [&str; 11] = [
    "screwdriver_plus",
    "wrench_adjustable",
    "offset_cross",
    "ring_wrench_3_4",
    "nippers",
    "brace",
    "lock_pliers",
    "pliers",
    "shernitsa",
    "screwdriver_minus",
    "oil_can_opener",
];

/// Ordered, duplicate-free list of tool class names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    classes: Vec<String>,
}

impl Catalog {
    /// Build a catalog, rejecting empty lists, blank names and duplicates.
    pub fn new<I, S>(classes: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        if classes.is_empty() {
            return Err(CoreError::Validation("catalog must not be empty".into()));
        }

        let mut seen = HashSet::with_capacity(classes.len());
        for class in &classes {
            if class.trim().is_empty() {
                return Err(CoreError::Validation(
                    "catalog class names must not be blank".into(),
                ));
            }
            if !seen.insert(class.as_str()) {
                return Err(CoreError::Validation(format!(
                    "catalog lists '{class}' more than once"
                )));
            }
        }

        Ok(Self { classes })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.classes.iter().any(|c| c == class_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            classes: DEFAULT_CLASSES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_eleven_classes() {
        let catalog = Catalog::default();
        assert_eq!(catalog.len(), 11);
        assert_eq!(catalog.classes()[0], "screwdriver_plus");
        assert!(catalog.contains("shernitsa"));
        assert!(!catalog.contains("hammer"));
    }

    #[test]
    fn custom_catalog_keeps_order() {
        let catalog = Catalog::new(["b", "a", "c"]).unwrap();
        assert_eq!(catalog.iter().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn empty_catalog_rejected() {
        assert!(Catalog::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn duplicate_entry_rejected() {
        let err = Catalog::new(["pliers", "pliers"]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn blank_entry_rejected() {
        assert!(Catalog::new(["pliers", "  "]).is_err());
    }
}
