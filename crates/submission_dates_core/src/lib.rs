//! Core of the submission dates store.
//!
//! Validates, persists and exposes three optional milestone dates
//! (`received`, `revised`, `accepted`) per resource, and adapts host form,
//! schema and metadata-import calls onto them.

pub mod config;
pub mod db;
pub mod host;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, StoreConfig};
pub use host::form::{FormField, SubmissionParams, METADATA_FORM_ID};
pub use host::import::{field_for_tag, ImportError, ImportReport};
pub use host::schema::{describe_schema, merge_into_schema, FieldDescriptor};
pub use host::{EXTENSION_DESCRIPTION, EXTENSION_DISPLAY_NAME};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::submission_dates::{
    field_for_property_key, parse_date_field, parse_submission_date, DateAttributes, DateField,
    DateOrderPolicy, DateValidationError, FieldChange, ResourceId,
};
pub use repo::submission_dates_repo::{
    RepoError, RepoResult, SqliteSubmissionDatesRepository, SubmissionDatesRepository,
};
pub use service::submission_dates_service::SubmissionDatesService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
