//! Task dispatch plumbing around the envelopes.
//!
//! - `kind`: which commands run trusted and which split into utask phases
//! - `io`: storing and fetching envelopes through an `IoStore`
//! - `utask`: the `UTask` trait and its in-memory and stored executors

pub mod io;
pub mod kind;
pub mod utask;

pub use io::{
    download_and_deserialize_input, download_and_deserialize_output, generate_io_file_name,
    new_io_path, serialize_and_upload_input, serialize_and_upload_output, upload_input,
};
pub use kind::{
    execution_mode, is_trusted_portion_of_utask, utask_mode, utask_trusted_portions,
    ExecutionMode, COMMAND_MODES,
};
pub use utask::{LocalExecutor, PreprocessResult, StoredExecutor, UTask};
