//! Shared data models for the Arthur AI generation backend.
//!
//! This crate provides Serde-serializable types for:
//! - Generation jobs and their lifecycle states
//! - Kind-specific generation inputs with validation
//! - Job results (artifact URLs)

pub mod input;
pub mod job;

// Re-export common types
pub use input::{GenerationInput, ValidationError};
pub use job::{Job, JobId, JobKind, JobResult, JobState, UNKNOWN_FAILURE_REASON};
