//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate parsing and repository calls into import/report use-cases.
//! - Keep CLI and other callers decoupled from storage details.

pub mod import_service;
pub mod report_service;
