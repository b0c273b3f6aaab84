//! Structured observability hooks for the uworker task lifecycle.
//!
//! Events are emitted at `info!` level unless noted (filter with `RUST_LOG`).
//! For JSON output set `UWORKER_LOG_FORMAT=json`.

use tracing::{debug, info, warn};

use crate::domain::{EntityKey, ErrorType};

/// RAII guard that enters a task-scoped tracing span.
///
/// # Example
///
/// ```ignore
/// let _span = TaskSpan::enter("analyze", "libfuzzer_asan");
/// // every event below is tagged with task and job_type
/// ```
pub struct TaskSpan {
    _span: tracing::span::EnteredSpan,
}

impl TaskSpan {
    pub fn enter(task: &str, job_type: &str) -> Self {
        Self {
            _span: task_span(task, job_type).entered(),
        }
    }
}

/// The task-scoped span itself, for instrumenting futures that cross
/// `.await` points (an entered guard is not `Send`).
pub fn task_span(task: &str, job_type: &str) -> tracing::Span {
    tracing::info_span!("uworker.task", task = %task, job_type = %job_type)
}

/// Emit event: envelope encoded and stored at `path`.
pub fn emit_envelope_uploaded(kind: &str, path: &str, size: usize, digest: &str) {
    info!(
        event = "envelope.uploaded",
        kind = %kind,
        path = %path,
        size = size,
        digest = %digest,
    );
}

/// Emit event: envelope fetched and decoded.
pub fn emit_envelope_downloaded(kind: &str, path: &str, size: usize) {
    info!(event = "envelope.downloaded", kind = %kind, path = %path, size = size);
}

/// Emit event: envelope bytes could not be decoded (warning level).
pub fn emit_decode_failed(kind: &str, error: &dyn std::fmt::Display) {
    warn!(event = "envelope.decode_failed", kind = %kind, error = %error);
}

pub fn emit_patch_generated(key: &EntityKey, changed_fields: usize) {
    debug!(event = "patch.generated", entity = %key, changed_fields = changed_fields);
}

pub fn emit_removed_properties_ignored(key: &EntityKey, count: usize) {
    warn!(event = "patch.removed_properties_ignored", entity = %key, count = count);
}

pub fn emit_patch_applied(key: &EntityKey, changed_fields: usize) {
    info!(event = "patch.applied", entity = %key, changed_fields = changed_fields);
}

/// Emit event: patched fields were modified since the worker's snapshot.
pub fn emit_stale_fields(key: &EntityKey, count: usize) {
    warn!(event = "patch.stale_fields", entity = %key, count = count);
}

pub fn emit_validation_failed(error: &dyn std::fmt::Display) {
    warn!(event = "output.validation_failed", error = %error);
}

/// Emit event: worker main failed and was reported as `Unhandled`.
pub fn emit_worker_failure(task: &str, error: &dyn std::fmt::Display) {
    warn!(event = "task.worker_failed", task = %task, error = %error);
}

pub fn emit_preprocess_skipped(task: &str) {
    info!(event = "task.preprocess_skipped", task = %task);
}

pub fn emit_task_finished(task: &str, error: ErrorType) {
    info!(
        event = "task.finished",
        task = %task,
        error = %error,
        success = !error.is_error(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_span_create() {
        let _span = TaskSpan::enter("analyze", "libfuzzer_asan");
    }
}
