//! Job lifecycle metrics.

use metrics::counter;

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_SUBMITTED_TOTAL: &str = "arthur_jobs_submitted_total";
    pub const JOBS_COMPLETED_TOTAL: &str = "arthur_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "arthur_jobs_failed_total";
    pub const POLL_ATTEMPTS_TOTAL: &str = "arthur_poll_attempts_total";
    pub const POLL_TRANSIENT_ERRORS_TOTAL: &str = "arthur_poll_transient_errors_total";
}

/// Record a job submitted to a provider.
pub fn record_job_submitted(kind: &str, provider: &str) {
    let labels = [("kind", kind.to_string()), ("provider", provider.to_string())];
    counter!(names::JOBS_SUBMITTED_TOTAL, &labels).increment(1);
}

/// Record a job reaching the completed state.
pub fn record_job_completed(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::JOBS_COMPLETED_TOTAL, &labels).increment(1);
}

/// Record a job reaching the failed state.
pub fn record_job_failed(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::JOBS_FAILED_TOTAL, &labels).increment(1);
}

/// Record a status query against a provider.
pub fn record_poll_attempt(provider: &str) {
    let labels = [("provider", provider.to_string())];
    counter!(names::POLL_ATTEMPTS_TOTAL, &labels).increment(1);
}

/// Record a transient status-query failure that will be retried.
pub fn record_poll_transient_error(provider: &str) {
    let labels = [("provider", provider.to_string())];
    counter!(names::POLL_TRANSIENT_ERRORS_TOTAL, &labels).increment(1);
}
