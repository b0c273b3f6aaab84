//! Output envelope validation against the error taxonomy.
//!
//! A failed task may still report partial results, but an output must not
//! contradict the failure it declares:
//! 1. `AnalyzeNoCrash` carries no crash stacktrace.
//! 2. A failed output never carries the complete change-wrapper set
//!    (testcase, upload metadata and variant all present).

use crate::domain::ErrorType;
use crate::envelope::UworkerOutput;

/// Errors produced by output validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{error} output must not carry a crash stacktrace")]
    UnexpectedStacktrace { error: ErrorType },

    #[error("{error} output carries a complete result set")]
    CompleteResultOnError { error: ErrorType },
}

/// Validate an output envelope.
///
/// # Errors
///
/// - `ValidationError::UnexpectedStacktrace`: `AnalyzeNoCrash` with a
///   non-empty `crash_stacktrace_output`.
/// - `ValidationError::CompleteResultOnError`: any failure whose output
///   has every change wrapper populated.
pub fn validate_output(output: &UworkerOutput) -> Result<(), ValidationError> {
    let error = output.error;
    match error {
        ErrorType::NoError => return Ok(()),
        ErrorType::AnalyzeNoCrash => {
            let has_stacktrace = output
                .crash_stacktrace_output
                .as_deref()
                .is_some_and(|s| !s.is_empty());
            if has_stacktrace {
                return Err(ValidationError::UnexpectedStacktrace { error });
            }
        }
        ErrorType::AnalyzeBuildSetup
        | ErrorType::TestcaseSetup
        | ErrorType::Unhandled
        | ErrorType::VariantBuildSetup => {}
    }

    if output.changes().count() == 3 {
        return Err(ValidationError::CompleteResultOnError { error });
    }

    Ok(())
}

impl UworkerOutput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_output(self)
    }
}
