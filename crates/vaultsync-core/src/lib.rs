//! vaultsync-core - Core library for vaultsync
//!
//! Provides record decoding, period bucketing, note rendering and the
//! idempotent exporter that mirrors task-manager data into a Markdown vault.

pub mod cleanup;
pub mod config;
pub mod error;
pub mod export;
pub mod hierarchy;
pub mod models;
pub mod parsers;
pub mod period;
pub mod render;
pub mod rewrite;
pub mod source;
pub mod sync;
pub mod time;

pub use cleanup::remove_conflict_files;
pub use config::{OutputLayout, SyncConfig};
pub use error::{CoreError, LoadReport, SyncReport};
pub use export::{run_sync, Exporter, Snapshot};
pub use source::{open_snapshot, RecordSource, SnapshotSource};
pub use sync::{sync_document, SyncOutcome, WritePolicy};
pub use time::TimeNormalizer;
