//! Mirror core: pure batching state machine and path derivation helpers.
mod batch;
mod path;
mod report;

pub use batch::{Batch, BatchCoordinator};
pub use path::{ExtensionFilter, MappedPath, PathMapper};
pub use report::{BatchRecord, DownloadOutcome, RunReport, SkipReason, SyncOutcome};
