//! Shelf Core - path identities, entities and errors for file management.
//!
//! This crate holds the leaf types every other Shelf crate passes around:
//!
//! - [`PathIdentity`]: a validated, normalized absolute path
//! - [`PathSegment`]: one decomposed element of a path
//! - [`AccessMode`]: the operation a permission check is made for
//! - [`Directory`], [`File`], [`Drive`]: entities handed to callers, each with an [`ItemStatus`]
//! - [`Error`]: the typed error taxonomy shared by all engines
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  shelf-library  │  (async services, composition root)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    shelf-fs     │  (path strategies, permission gates, engines)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   shelf-core    │  (This crate - shared types)
//! └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use shelf_core::{PathIdentity, Platform};
//!
//! let path = PathIdentity::directory("/media//books/./", Platform::Unix)?;
//! assert_eq!(path.as_str(), "/media/books/");
//! # Ok::<(), shelf_core::Error>(())
//! ```

pub mod error;
pub mod path;
pub mod platform;
pub mod types;

// Re-export core types for convenience
pub use error::{Error, Result};
pub use path::{PathIdentity, PathSegment};
pub use platform::Platform;
pub use types::{AccessMode, Directory, Drive, File, ItemStatus, ListedEntry};
