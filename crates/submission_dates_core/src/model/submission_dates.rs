//! Submission milestone dates for one resource.
//!
//! # Responsibility
//! - Define the three recognized date fields and their external names.
//! - Parse raw caller input into calendar dates.
//! - Check the optional milestone ordering rule.
//!
//! # Invariants
//! - Each field is independently optional; `None` means "not yet recorded".
//! - Accepted input is exactly `YYYY-MM-DD` after trimming whitespace.
//! - Ordering is unchecked unless `DateOrderPolicy::Chronological` is chosen.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid iso date regex"));

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Prefix shared by every host-facing property name.
pub const PROPERTY_KEY_PREFIX: &str = "submission_dates__";

/// One of the three recognized submission milestones.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    /// Manuscript received by the publisher.
    Received,
    /// Revised manuscript received.
    Revised,
    /// Manuscript accepted for publication.
    Accepted,
}

impl DateField {
    /// All fields in milestone order.
    pub const ALL: [DateField; 3] = [Self::Received, Self::Revised, Self::Accepted];

    /// Stable lowercase field name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Revised => "revised",
            Self::Accepted => "accepted",
        }
    }

    /// Property name used in host forms and API schemas.
    pub fn property_key(self) -> &'static str {
        match self {
            Self::Received => "submission_dates__received",
            Self::Revised => "submission_dates__revised",
            Self::Accepted => "submission_dates__accepted",
        }
    }

    /// Translation key for the field label.
    pub fn label_key(self) -> &'static str {
        match self {
            Self::Received => "plugins.submissionDates.received.displayName",
            Self::Revised => "plugins.submissionDates.revised.displayName",
            Self::Accepted => "plugins.submissionDates.accepted.displayName",
        }
    }
}

impl Display for DateField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses one field name from caller input. Matching is exact.
pub fn parse_date_field(name: &str) -> Result<DateField, DateValidationError> {
    DateField::ALL
        .into_iter()
        .find(|field| field.as_str() == name)
        .ok_or_else(|| DateValidationError::UnknownField(name.to_string()))
}

/// Resolves a host property name such as `submission_dates__accepted`.
pub fn field_for_property_key(key: &str) -> Option<DateField> {
    DateField::ALL
        .into_iter()
        .find(|field| field.property_key() == key)
}

/// Parses a raw date value for `field`.
///
/// Surrounding whitespace is ignored. The rest must be a zero-padded
/// `YYYY-MM-DD` calendar date.
pub fn parse_submission_date(
    field: DateField,
    raw: &str,
) -> Result<NaiveDate, DateValidationError> {
    let trimmed = raw.trim();
    let invalid = || DateValidationError::InvalidDate {
        field,
        value: trimmed.to_string(),
    };

    if !ISO_DATE_RE.is_match(trimmed) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT).map_err(|_| invalid())
}

/// Formats a stored date back to its canonical text form.
pub fn format_submission_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Opaque identifier of the resource that owns a date record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Creates an identifier from caller input, kept exactly as given.
    ///
    /// Blank input is rejected.
    pub fn new(value: impl AsRef<str>) -> Result<Self, DateValidationError> {
        let value = value.as_ref();
        if value.trim().is_empty() {
            return Err(DateValidationError::EmptyResourceId);
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordering rule applied to milestone dates on write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrderPolicy {
    /// Dates are stored as given; no relation between fields is checked.
    #[default]
    Unchecked,
    /// Recorded dates must satisfy `received <= revised <= accepted`.
    Chronological,
}

/// One pending write to a single field. `None` clears the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldChange {
    pub field: DateField,
    pub value: Option<NaiveDate>,
}

impl FieldChange {
    pub fn set(field: DateField, value: NaiveDate) -> Self {
        Self {
            field,
            value: Some(value),
        }
    }

    pub fn clear(field: DateField) -> Self {
        Self { field, value: None }
    }
}

/// Date record owned by one resource.
///
/// Absent dates serialize as `null` so readers can tell "never set" apart
/// from a missing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateAttributes {
    pub resource_id: ResourceId,
    pub received: Option<NaiveDate>,
    pub revised: Option<NaiveDate>,
    pub accepted: Option<NaiveDate>,
}

impl DateAttributes {
    /// Record with no dates recorded yet.
    pub fn empty(resource_id: ResourceId) -> Self {
        Self {
            resource_id,
            received: None,
            revised: None,
            accepted: None,
        }
    }

    pub fn get(&self, field: DateField) -> Option<NaiveDate> {
        match field {
            DateField::Received => self.received,
            DateField::Revised => self.revised,
            DateField::Accepted => self.accepted,
        }
    }

    pub fn set(&mut self, field: DateField, value: Option<NaiveDate>) {
        match field {
            DateField::Received => self.received = value,
            DateField::Revised => self.revised = value,
            DateField::Accepted => self.accepted = value,
        }
    }

    /// Applies changes in order; a later change to the same field wins.
    pub fn apply(&mut self, changes: &[FieldChange]) {
        for change in changes {
            self.set(change.field, change.value);
        }
    }

    /// Returns whether no field is recorded.
    pub fn is_empty(&self) -> bool {
        DateField::ALL.iter().all(|field| self.get(*field).is_none())
    }

    /// Checks the record against `policy`.
    ///
    /// Only recorded fields are compared, so a missing `revised` date still
    /// leaves `received <= accepted` in force.
    pub fn check_order(&self, policy: DateOrderPolicy) -> Result<(), DateValidationError> {
        if policy == DateOrderPolicy::Unchecked {
            return Ok(());
        }

        for (index, earlier) in DateField::ALL.iter().enumerate() {
            let Some(earlier_date) = self.get(*earlier) else {
                continue;
            };
            for later in &DateField::ALL[index + 1..] {
                if let Some(later_date) = self.get(*later) {
                    if later_date < earlier_date {
                        return Err(DateValidationError::OutOfOrder {
                            earlier: *earlier,
                            later: *later,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Validation errors for date attribute input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateValidationError {
    /// Field name outside `received|revised|accepted`.
    UnknownField(String),
    /// Value is not a `YYYY-MM-DD` calendar date.
    InvalidDate { field: DateField, value: String },
    EmptyResourceId,
    /// `later` would be recorded before `earlier` under the chronological policy.
    OutOfOrder { earlier: DateField, later: DateField },
}

impl Display for DateValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownField(name) => write!(
                f,
                "unknown date field `{name}`; expected received|revised|accepted"
            ),
            Self::InvalidDate { field, value } => write!(
                f,
                "invalid date `{value}` for field `{field}`; expected YYYY-MM-DD"
            ),
            Self::EmptyResourceId => write!(f, "resource id must not be empty"),
            Self::OutOfOrder { earlier, later } => {
                write!(f, "date `{later}` must not be earlier than `{earlier}`")
            }
        }
    }
}

impl Error for DateValidationError {}

#[cfg(test)]
mod tests {
    use super::{
        field_for_property_key, parse_date_field, parse_submission_date, DateAttributes,
        DateField, DateOrderPolicy, DateValidationError, FieldChange, ResourceId,
    };
    use chrono::NaiveDate;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    fn record() -> DateAttributes {
        DateAttributes::empty(ResourceId::new("pub-1").unwrap())
    }

    #[test]
    fn parses_known_field_names_only() {
        assert_eq!(parse_date_field("received").unwrap(), DateField::Received);
        assert_eq!(parse_date_field("accepted").unwrap(), DateField::Accepted);
        assert_eq!(
            parse_date_field(" accepted ").unwrap_err(),
            DateValidationError::UnknownField(" accepted ".to_string())
        );
        assert_eq!(
            parse_date_field("Revised").unwrap_err(),
            DateValidationError::UnknownField("Revised".to_string())
        );
        assert!(matches!(
            parse_date_field("bogus_field"),
            Err(DateValidationError::UnknownField(_))
        ));
    }

    #[test]
    fn accepts_zero_padded_calendar_dates() {
        assert_eq!(
            parse_submission_date(DateField::Received, "2024-01-05").unwrap(),
            date("2024-01-05")
        );
        assert_eq!(
            parse_submission_date(DateField::Accepted, "\n  2024-02-29 \n").unwrap(),
            date("2024-02-29")
        );
    }

    #[test]
    fn rejects_free_form_and_impossible_dates() {
        for raw in [
            "not-a-date",
            "",
            "2024-1-5",
            "2023-02-29",
            "2024-13-01",
            "2024-01-01T00:00:00",
            "01/02/2024",
        ] {
            let err = parse_submission_date(DateField::Revised, raw).unwrap_err();
            assert!(
                matches!(err, DateValidationError::InvalidDate { field: DateField::Revised, .. }),
                "`{raw}` should be rejected"
            );
        }
    }

    #[test]
    fn resource_id_rejects_blank_input() {
        assert_eq!(
            ResourceId::new("   ").unwrap_err(),
            DateValidationError::EmptyResourceId
        );
        assert_eq!(ResourceId::new(" 42 ").unwrap().as_str(), " 42 ");
        assert_ne!(ResourceId::new("a ").unwrap(), ResourceId::new("a").unwrap());
    }

    #[test]
    fn property_keys_resolve_exactly() {
        assert_eq!(
            field_for_property_key("submission_dates__revised"),
            Some(DateField::Revised)
        );
        assert_eq!(field_for_property_key("submission_dates__ revised "), None);
        assert_eq!(field_for_property_key("submission_dates__Revised"), None);
    }

    #[test]
    fn property_and_label_keys_follow_field_names() {
        for field in DateField::ALL {
            assert_eq!(
                field.property_key(),
                format!("submission_dates__{}", field.as_str())
            );
            assert!(field.label_key().contains(field.as_str()));
        }
    }

    #[test]
    fn unchecked_policy_allows_any_order() {
        let mut attrs = record();
        attrs.apply(&[
            FieldChange::set(DateField::Received, date("2024-05-01")),
            FieldChange::set(DateField::Accepted, date("2024-01-01")),
        ]);
        assert!(attrs.check_order(DateOrderPolicy::Unchecked).is_ok());
    }

    #[test]
    fn chronological_policy_compares_recorded_fields_only() {
        let mut attrs = record();
        attrs.apply(&[
            FieldChange::set(DateField::Received, date("2024-05-01")),
            FieldChange::set(DateField::Accepted, date("2024-01-01")),
        ]);
        assert_eq!(
            attrs.check_order(DateOrderPolicy::Chronological).unwrap_err(),
            DateValidationError::OutOfOrder {
                earlier: DateField::Received,
                later: DateField::Accepted,
            }
        );

        attrs.apply(&[FieldChange::set(DateField::Accepted, date("2024-06-01"))]);
        assert!(attrs.check_order(DateOrderPolicy::Chronological).is_ok());

        attrs.apply(&[FieldChange::set(DateField::Revised, date("2024-07-01"))]);
        assert!(matches!(
            attrs.check_order(DateOrderPolicy::Chronological),
            Err(DateValidationError::OutOfOrder {
                earlier: DateField::Revised,
                later: DateField::Accepted,
            })
        ));
    }

    #[test]
    fn later_change_to_same_field_wins() {
        let mut attrs = record();
        attrs.apply(&[
            FieldChange::set(DateField::Revised, date("2024-05-01")),
            FieldChange::clear(DateField::Revised),
        ]);
        assert!(attrs.is_empty());
    }
}
