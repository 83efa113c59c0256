//! Host-facing adapters.
//!
//! The host application drives the store through explicit calls instead of
//! event hooks: schema publishing, edit-form assembly and submission, and
//! metadata import. Each adapter only translates host names and shapes into
//! `model` types; persistence stays in `service`.

pub mod form;
pub mod import;
pub mod schema;

/// Name shown for this extension in host plugin listings.
pub const EXTENSION_DISPLAY_NAME: &str = "Submission Dates";

/// Description shown for this extension in host plugin listings.
pub const EXTENSION_DESCRIPTION: &str = "Provides received, revised and accepted dates to display \
on an article page, showing when the journal processed each submission.";
