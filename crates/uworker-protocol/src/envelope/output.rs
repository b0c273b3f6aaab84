use serde::{Deserialize, Serialize};

use super::input::UworkerInput;
use crate::domain::{EntityChange, ErrorType};

/// The worker's report for one task.
///
/// When `error` is not [`ErrorType::NoError`] the change wrappers are
/// partial or absent; consumers must not assume full entity state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UworkerOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testcase: Option<EntityChange>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testcase_upload_metadata: Option<EntityChange>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<EntityChange>,

    #[serde(default)]
    pub error: ErrorType,

    /// Owned copy of the originating input, for callers outside the
    /// normal dispatch path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uworker_input: Option<Box<UworkerInput>>,

    /// Test execution timeout used, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_timeout: Option<f64>,

    /// Observed crash time, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crash_time: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crash_stacktrace_output: Option<String>,
}

impl UworkerOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// An output reporting a known failure mode and nothing else.
    pub fn failed(error: ErrorType) -> Self {
        Self {
            error,
            ..Self::default()
        }
    }

    pub fn with_testcase(mut self, change: EntityChange) -> Self {
        self.testcase = Some(change);
        self
    }

    pub fn with_testcase_upload_metadata(mut self, change: EntityChange) -> Self {
        self.testcase_upload_metadata = Some(change);
        self
    }

    pub fn with_variant(mut self, change: EntityChange) -> Self {
        self.variant = Some(change);
        self
    }

    pub fn with_error(mut self, error: ErrorType) -> Self {
        self.error = error;
        self
    }

    pub fn with_uworker_input(mut self, input: UworkerInput) -> Self {
        self.uworker_input = Some(Box::new(input));
        self
    }

    pub fn with_test_timeout(mut self, seconds: f64) -> Self {
        self.test_timeout = Some(seconds);
        self
    }

    pub fn with_crash_time(mut self, seconds: f64) -> Self {
        self.crash_time = Some(seconds);
        self
    }

    pub fn with_crash_stacktrace(mut self, stacktrace: impl Into<String>) -> Self {
        self.crash_stacktrace_output = Some(stacktrace.into());
        self
    }

    /// Did the worker finish without a recorded failure?
    pub fn succeeded(&self) -> bool {
        !self.error.is_error()
    }

    /// Change wrappers that are present, labelled by field name.
    pub fn changes(&self) -> impl Iterator<Item = (&'static str, &EntityChange)> {
        [
            ("testcase", self.testcase.as_ref()),
            ("testcase_upload_metadata", self.testcase_upload_metadata.as_ref()),
            ("variant", self.variant.as_ref()),
        ]
        .into_iter()
        .filter_map(|(name, change)| change.map(|c| (name, c)))
    }

    /// False if a timing, a change or the back-reference holds a NaN or
    /// infinite float.
    pub fn is_finite(&self) -> bool {
        [self.test_timeout, self.crash_time]
            .into_iter()
            .flatten()
            .all(f64::is_finite)
            && self.changes().all(|(_, change)| change.is_finite())
            && self.uworker_input.as_deref().map_or(true, UworkerInput::is_finite)
    }
}
