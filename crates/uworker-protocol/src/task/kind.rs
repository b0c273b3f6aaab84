//! Command → execution mode table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a command is split across trusted and untrusted machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Runs entirely on one trusted machine.
    Trusted,
    /// Preprocess here; main and postprocess run elsewhere.
    UTask,
    /// Preprocess and main here; postprocess runs elsewhere.
    UTaskLocalPreprocessAndMain,
    /// All three phases here, in memory.
    UTaskLocalExecutor,
    /// The postprocess phase of some utask.
    Postprocess,
    /// The main phase of some utask, for platforms without batch dispatch.
    UworkerMain,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionMode::Trusted => "trusted",
            ExecutionMode::UTask => "utask",
            ExecutionMode::UTaskLocalPreprocessAndMain => "utask_local_preprocess_and_main",
            ExecutionMode::UTaskLocalExecutor => "utask_local_executor",
            ExecutionMode::Postprocess => "postprocess",
            ExecutionMode::UworkerMain => "uworker_main",
        };
        f.write_str(s)
    }
}

pub const COMMAND_MODES: &[(&str, ExecutionMode)] = &[
    ("analyze", ExecutionMode::UTaskLocalExecutor),
    ("blame", ExecutionMode::Trusted),
    ("corpus_pruning", ExecutionMode::UTaskLocalExecutor),
    ("fuzz", ExecutionMode::UTaskLocalExecutor),
    ("impact", ExecutionMode::Trusted),
    ("minimize", ExecutionMode::UTaskLocalExecutor),
    ("progression", ExecutionMode::UTaskLocalExecutor),
    ("regression", ExecutionMode::UTaskLocalExecutor),
    ("symbolize", ExecutionMode::Trusted),
    ("unpack", ExecutionMode::Trusted),
    ("uworker_postprocess", ExecutionMode::Postprocess),
    ("upload_reports", ExecutionMode::Trusted),
    ("uworker_main", ExecutionMode::UworkerMain),
    ("variant", ExecutionMode::UTaskLocalExecutor),
];

pub fn execution_mode(command: &str) -> Option<ExecutionMode> {
    COMMAND_MODES
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, mode)| *mode)
}

/// Mode for a utask given the global in-memory setting.
pub fn utask_mode(in_memory: bool) -> ExecutionMode {
    if in_memory {
        ExecutionMode::UTaskLocalExecutor
    } else {
        ExecutionMode::UTask
    }
}

/// Whether `command` names a phase that runs on a trusted worker.
///
/// Preprocess and postprocess run trusted; `uworker_main` does not.
pub fn is_trusted_portion_of_utask(command: &str) -> bool {
    matches!(
        execution_mode(command),
        Some(ExecutionMode::UTask | ExecutionMode::Postprocess)
    )
}

pub fn utask_trusted_portions() -> Vec<&'static str> {
    COMMAND_MODES
        .iter()
        .filter(|(name, _)| is_trusted_portion_of_utask(name))
        .map(|(name, _)| *name)
        .collect()
}
