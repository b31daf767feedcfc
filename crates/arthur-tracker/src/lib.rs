//! Async job tracking for the Arthur AI generation backend.
//!
//! Wraps "start a long-running remote generation task and learn when it
//! finishes" into one contract regardless of which provider does the
//! work: submit, poll (or receive a webhook), and optionally block until
//! the job reaches a terminal state.

pub mod error;
pub mod metrics;
pub mod policy;
pub mod reconciler;
pub mod tracker;

pub use error::{TrackerError, TrackerResult};
pub use policy::PollPolicy;
pub use reconciler::Reconciler;
pub use tracker::AsyncJobTracker;
