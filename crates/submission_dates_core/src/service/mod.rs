//! Store use-case services.
//!
//! # Responsibility
//! - Orchestrate validation and repository calls into host-facing operations.
//! - Keep host adapters decoupled from storage details.

pub mod submission_dates_service;
