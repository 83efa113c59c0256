//! Metadata import adapter.
//!
//! Maps tag names found in an external metadata feed to date fields. The
//! feed carries many unrelated tags, so an unmapped tag is not an error.

use crate::model::submission_dates::DateField;
use crate::repo::submission_dates_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Feed tag names recognized by the importer.
pub const IMPORT_TAG_FIELDS: &[(&str, DateField)] = &[
    ("accepted_date", DateField::Accepted),
    ("revised_date", DateField::Revised),
];

/// Returns the date field fed by `tag_name`, if any. Matching is exact.
pub fn field_for_tag(tag_name: &str) -> Option<DateField> {
    IMPORT_TAG_FIELDS
        .iter()
        .find(|(name, _)| *name == tag_name)
        .map(|(_, field)| *field)
}

/// A recognized tag that could not be applied.
#[derive(Debug)]
pub struct ImportError {
    pub tag_name: String,
    pub resource_id: String,
    pub source: RepoError,
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "import of tag `{}` for resource `{}` failed: {}",
            self.tag_name, self.resource_id, self.source
        )
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Outcome of importing every tag of one resource.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Fields written, in tag order.
    pub applied: Vec<DateField>,
    /// Tags with no date mapping.
    pub ignored: usize,
    /// Recognized tags skipped because their value was rejected.
    pub rejected: Vec<ImportError>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}
