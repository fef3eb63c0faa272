//! Mode-bit permission checks.

use super::PermissionGate;
use nix::unistd::{access, AccessFlags};
use shelf_core::{AccessMode, Result};
use std::path::{Path, PathBuf};
use tracing::trace;

/// What `access(2)` is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The path exists.
    Exists,
    /// `R_OK`
    Read,
    /// `W_OK`
    Write,
    /// `X_OK`
    Execute,
    /// `W_OK | X_OK`
    WriteExecute,
}

impl Capability {
    fn flags(self) -> AccessFlags {
        match self {
            Capability::Exists => AccessFlags::F_OK,
            Capability::Read => AccessFlags::R_OK,
            Capability::Write => AccessFlags::W_OK,
            Capability::Execute => AccessFlags::X_OK,
            Capability::WriteExecute => AccessFlags::W_OK | AccessFlags::X_OK,
        }
    }
}

/// The single `access(2)` call an access mode reduces to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    /// Path the call is made on.
    pub target: PathBuf,
    /// Capability asked for.
    pub capability: Capability,
}

/// Map an access mode onto mode-bit checks.
///
/// Deleting a file is a write to its parent directory; deleting a directory
/// needs write and search on the directory itself.
pub fn required_check(path: &Path, mode: AccessMode, is_file: bool) -> Check {
    let on_path = |capability| Check {
        target: path.to_path_buf(),
        capability,
    };

    match mode {
        // Stat-ing entries inside a directory needs search permission on it.
        AccessMode::ReadProperties if is_file => on_path(Capability::Exists),
        AccessMode::ReadProperties => on_path(Capability::Execute),
        AccessMode::ReadContents => on_path(Capability::Read),
        AccessMode::Write => on_path(Capability::Write),
        AccessMode::Execute => on_path(Capability::Execute),
        AccessMode::ListDirectory => on_path(Capability::Exists),
        AccessMode::Delete if is_file => Check {
            target: path
                .parent()
                .map_or_else(|| path.to_path_buf(), Path::to_path_buf),
            capability: Capability::Write,
        },
        AccessMode::Delete => on_path(Capability::WriteExecute),
    }
}

/// Permission gate backed by the kernel's own uid/gid/mode evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixPermissionGate;

impl UnixPermissionGate {
    /// Create a new gate.
    pub fn new() -> Self {
        Self
    }
}

impl PermissionGate for UnixPermissionGate {
    fn can_access_path(&self, path: &Path, mode: AccessMode, is_file: bool) -> Result<bool> {
        let check = required_check(path, mode, is_file);
        let granted = access(check.target.as_path(), check.capability.flags()).is_ok();
        trace!(
            path = %path.display(),
            %mode,
            target = %check.target.display(),
            granted,
            "mode-bit check"
        );
        Ok(granted)
    }
}
