//! Catalog integrity checks applied at the load boundary.
//!
//! The upstream payload is not guaranteed to be referentially sound:
//! ids may collide and a place may point at a category that does not
//! exist. [`validate`] collects every such issue into an
//! [`IntegrityReport`]; the [`IntegrityMode`] decides whether the report
//! rejects the catalog or is only logged.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ContentError;
use crate::models::Catalog;

/// How strictly a freshly fetched catalog is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityMode {
    /// Any issue rejects the whole catalog.
    #[default]
    Strict,
    /// Issues are logged; the catalog is accepted as-is.
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    DuplicateCategory(String),
    DuplicatePlace(String),
    DanglingCategory { place_id: String, category_id: String },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::DuplicateCategory(id) => write!(f, "duplicate category id '{}'", id),
            IntegrityIssue::DuplicatePlace(id) => write!(f, "duplicate place id '{}'", id),
            IntegrityIssue::DanglingCategory {
                place_id,
                category_id,
            } => write!(
                f,
                "place '{}' references unknown category '{}'",
                place_id, category_id
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for IntegrityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.issues.iter().map(|i| i.to_string()).collect();
        write!(f, "{} issue(s): {}", self.issues.len(), parts.join("; "))
    }
}

/// Collect every integrity issue in `catalog`, in catalog order.
pub fn check(catalog: &Catalog) -> IntegrityReport {
    let mut issues = Vec::new();

    let mut category_ids = HashSet::new();
    for category in &catalog.categories {
        if !category_ids.insert(category.id.as_str()) {
            issues.push(IntegrityIssue::DuplicateCategory(category.id.clone()));
        }
    }

    let mut place_ids = HashSet::new();
    for place in &catalog.places {
        if !place_ids.insert(place.place_id.as_str()) {
            issues.push(IntegrityIssue::DuplicatePlace(place.place_id.clone()));
        }
        if !category_ids.contains(place.category_id.as_str()) {
            issues.push(IntegrityIssue::DanglingCategory {
                place_id: place.place_id.clone(),
                category_id: place.category_id.clone(),
            });
        }
    }

    IntegrityReport { issues }
}

/// Check `catalog` and apply `mode`.
///
/// In lenient mode the issues are emitted as warnings and `Ok` is returned.
pub fn validate(catalog: &Catalog, mode: IntegrityMode) -> Result<(), ContentError> {
    let report = check(catalog);
    if report.is_clean() {
        return Ok(());
    }

    match mode {
        IntegrityMode::Strict => Err(ContentError::Integrity(report)),
        IntegrityMode::Lenient => {
            for issue in &report.issues {
                tracing::warn!(%issue, "catalog integrity issue accepted in lenient mode");
            }
            Ok(())
        }
    }
}
