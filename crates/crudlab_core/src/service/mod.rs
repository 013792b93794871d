//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate multi-table writes that a single repository cannot own.
//! - Keep CLI and envelope layers decoupled from storage details.

pub mod library_service;
