//! Edit-form adapter.
//!
//! # Responsibility
//! - Declare the date inputs the host adds to its publication metadata form.
//! - Translate a submitted parameter map into field changes.
//!
//! # Invariants
//! - Only keys with the `submission_dates__` prefix are considered; every
//!   other key belongs to the host form.
//! - Absent key leaves a field unchanged; `None` or blank text clears it.
//! - A submission is validated as a whole before anything is written.

use crate::model::submission_dates::{
    field_for_property_key, format_submission_date, parse_submission_date, DateAttributes,
    DateField, DateValidationError, FieldChange, PROPERTY_KEY_PREFIX,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Host form id that receives the date inputs.
pub const METADATA_FORM_ID: &str = "metadata";

/// Host UI component used for each date input.
pub const DATE_INPUT_COMPONENT: &str = "field-date";

/// Submitted form values keyed by host property name.
pub type SubmissionParams = BTreeMap<String, Option<String>>;

/// One date input declaration for a host form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub name: &'static str,
    pub label_key: &'static str,
    pub component: &'static str,
    /// Current stored value as `YYYY-MM-DD`.
    pub value: Option<String>,
}

/// Builds the date inputs for `form_id`, prefilled from `attrs`.
///
/// Forms other than the metadata form get no inputs.
pub fn build_form_fields(form_id: &str, attrs: &DateAttributes) -> Vec<FormField> {
    if form_id != METADATA_FORM_ID {
        return Vec::new();
    }

    DateField::ALL
        .into_iter()
        .map(|field| FormField {
            name: field.property_key(),
            label_key: field.label_key(),
            component: DATE_INPUT_COMPONENT,
            value: attrs.get(field).map(format_submission_date),
        })
        .collect()
}

/// Converts submitted params into changes for the date fields.
///
/// # Errors
/// - `UnknownField` for a prefixed key that is not exactly one of the three
///   date property names.
/// - `InvalidDate` for a non-blank value that is not `YYYY-MM-DD`.
pub fn parse_submission(
    params: &SubmissionParams,
) -> Result<Vec<FieldChange>, DateValidationError> {
    let mut changes = Vec::new();
    for (key, value) in params {
        if !key.starts_with(PROPERTY_KEY_PREFIX) {
            continue;
        }
        let field = field_for_property_key(key)
            .ok_or_else(|| DateValidationError::UnknownField(key.clone()))?;

        let change = match value.as_deref().map(str::trim) {
            None | Some("") => FieldChange::clear(field),
            Some(raw) => FieldChange::set(field, parse_submission_date(field, raw)?),
        };
        changes.push(change);
    }
    Ok(changes)
}
