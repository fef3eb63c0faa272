//! Platform-aware filesystem engines for Shelf.
//!
//! This crate provides the synchronous layer under the Shelf services:
//!
//! - [`PathStrategy`]: parse, validate and combine paths by platform rules
//!   ([`UnixPathStrategy`], [`WindowsPathStrategy`])
//! - [`PermissionGate`]: pre-flight access checks ([`UnixPermissionGate`] on
//!   mode-bit hosts, [`WindowsPermissionGate`] over ACLs)
//! - [`DirectoryEngine`] and [`FileEngine`]: enumerate, create, copy, move,
//!   rename and delete
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(unix)]
//! # fn main() -> shelf_core::Result<()> {
//! use shelf_fs::{DirectoryEngine, PathStrategy, UnixPathStrategy, UnixPermissionGate};
//! use std::sync::Arc;
//!
//! let engine = DirectoryEngine::new(Arc::new(UnixPathStrategy), Arc::new(UnixPermissionGate));
//! let media = engine.strategy().directory("/media")?;
//! for entry in engine.enumerate(&media, false)? {
//!     println!("{}", entry.name);
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(unix))]
//! # fn main() {}
//! ```

pub mod directory;
pub mod file;
pub mod permission;
mod primitives;
pub mod strategy;

pub use directory::{CopyOptions, DirectoryEngine, MoveReport};
pub use file::FileEngine;
pub use permission::{
    require, AccessRule, AclSource, PermissionGate, Principal, RuleKind, WindowsPermissionGate,
};
pub use strategy::{for_platform, PathStrategy, UnixPathStrategy, WindowsPathStrategy};

#[cfg(unix)]
pub use permission::UnixPermissionGate;

#[cfg(windows)]
pub use permission::NativeAclSource;
