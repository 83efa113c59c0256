//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the persistence contract for date attribute records.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Writes validate the merged record before SQL mutations.
//! - Repository APIs return semantic errors in addition to DB transport errors.

pub mod submission_dates_repo;
