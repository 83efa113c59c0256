//! Date attribute domain model.
//!
//! # Responsibility
//! - Define the value object attached to one owning resource.
//! - Own field-name and date-format validation shared by every entry point.
//!
//! # Invariants
//! - Every record is keyed by exactly one non-empty `ResourceId`.
//! - Stored dates are always real calendar dates, never free-form text.

pub mod submission_dates;
