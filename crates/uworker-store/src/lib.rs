//! uworker-store: blob storage seam for uworker I/O
//!
//! Envelopes travel between the orchestrator and workers as blobs addressed
//! by a storage path of the form `/<bucket>/<name>`. The actual transport
//! (object storage, signed URLs, queues) lives outside this workspace and
//! plugs in through the [`IoStore`] trait.
//!
//! ## Key Components
//!
//! - `IoStore`: async put/get/exists by storage path
//! - `MemoryIoStore`: in-memory fake for tests and in-process execution
//! - `FsIoStore`: filesystem-backed store with atomic writes

mod error;
pub mod fakes;
pub mod fs;
pub mod storage_traits;

pub use error::StoreError;
pub use fakes::MemoryIoStore;
pub use fs::FsIoStore;
pub use storage_traits::{IoStore, StoreResult};
