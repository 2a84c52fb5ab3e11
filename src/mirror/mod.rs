// src/mirror/mod.rs
// =============================================================================
// This module mirrors a listing tree to disk.
//
// Submodules:
// - walker: Recursive directory walk, the scheduler of the crawl
// - file: Streams one file to disk, turning failures into records
// - pool: The worker budget shared by all tasks
// - sink: Failure records and the append-only failure log
// - task: Download tasks, their outcomes and the summary report
// - shutdown: Cooperative Ctrl+C handling
// =============================================================================

mod file;
mod pool;
mod shutdown;
mod sink;
mod task;
mod walker;

pub use shutdown::Shutdown;
pub use sink::{FailureLog, FailureRecord, FailureSink};
pub use task::MirrorReport;
pub use walker::Mirror;
