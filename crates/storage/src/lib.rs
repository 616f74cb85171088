#![forbid(unsafe_code)]

//! Best-effort persistence for the trainer engine: a whole-snapshot
//! key/value contract with file-backed and in-memory implementations.

pub mod json_file;
pub mod repository;

pub use json_file::JsonFileStore;
pub use repository::{
    InMemoryStore, ProgressRecord, SessionRecord, Snapshot, SnapshotDecodeError, SnapshotStore,
    StorageError,
};
