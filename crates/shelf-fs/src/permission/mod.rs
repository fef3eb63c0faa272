//! Pre-flight permission checks.
//!
//! Engines consult a [`PermissionGate`] before every mutation; a denial means
//! the mutation primitive is never called.

#[cfg(unix)]
mod unix;
mod windows;

#[cfg(windows)]
mod native_acl;

#[cfg(unix)]
pub use unix::{required_check, Capability, Check, UnixPermissionGate};
pub use windows::{
    evaluate_rules, rights, AccessRule, AclSource, Principal, RuleKind, WindowsPermissionGate,
};

#[cfg(windows)]
pub use native_acl::NativeAclSource;

use shelf_core::{AccessMode, Error, PathIdentity, Result};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Answers "may the current principal perform `mode` on `path`".
///
/// # Errors
///
/// Denial is `Ok(false)`, never an error. `Err` is reserved for a platform the
/// gate cannot interrogate at all (e.g. the current principal is unknown).
pub trait PermissionGate: Send + Sync + fmt::Debug {
    /// Check `mode` on `path`; `is_file` selects file or directory semantics.
    fn can_access_path(&self, path: &Path, mode: AccessMode, is_file: bool) -> Result<bool>;
}

/// Fail with [`Error::UnauthorizedAccess`] unless `gate` allows `mode` on `path`.
pub fn require(
    gate: &dyn PermissionGate,
    path: &PathIdentity,
    mode: AccessMode,
) -> Result<()> {
    let is_file = !path.is_directory();
    if gate.can_access_path(path.as_path(), mode, is_file)? {
        Ok(())
    } else {
        debug!(path = %path, %mode, "permission denied");
        Err(Error::UnauthorizedAccess {
            path: path.as_path().to_path_buf(),
            mode,
        })
    }
}
