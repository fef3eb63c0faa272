//! Domain-facing services over the synchronous engines.
//!
//! Each request runs its engine call on a blocking worker, so the async
//! runtime is never stalled by filesystem I/O. Dropping a service future does
//! not interrupt a call that is already running.

mod directory;
mod drive;
mod file;

pub use directory::{DirectoryService, LocalDirectoryService};
pub use drive::{DriveService, LocalDriveService};
pub use file::{FileService, LocalFileService};

use shelf_core::{Error, Result};
use tokio::task;

/// Run `work` on the blocking pool.
///
/// # Errors
///
/// Whatever `work` returns, or [`Error::TaskFailed`] if the worker panicked or
/// was cancelled.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|error| Error::TaskFailed(error.to_string()))?
}
