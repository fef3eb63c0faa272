//! Shelf Library - async file management services for the media library.
//!
//! [`FileManager`] is built once from the configured settings. It picks the
//! path strategy and permission gate for the host and exposes three services:
//!
//! - [`DirectoryService`]: list, create, copy, move, rename, delete, navigate
//! - [`FileService`]: the file-level equivalents plus reading contents
//! - [`DriveService`]: navigable roots
//!
//! # Example
//!
//! ```no_run
//! use shelf_config::ConfigManager;
//! use shelf_library::{init_tracing, FileManager};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigManager::load_or_init().await?;
//! init_tracing(&config.config().settings.log_filter);
//!
//! let manager = FileManager::new(&config.config().settings)?;
//! for drive in manager.drives().list_drives().await? {
//!     println!("{}", drive.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod manager;
pub mod service;
pub mod telemetry;

pub use manager::FileManager;
pub use service::{
    DirectoryService, DriveService, FileService, LocalDirectoryService, LocalDriveService,
    LocalFileService,
};
pub use telemetry::init_tracing;
