use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Security-related errors
#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("Path does not exist: {0}")]
    PathDoesNotExist(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Path is not readable: {0}")]
    NotReadable(PathBuf),

    #[error("Invalid log filter {0:?}: must be non-empty and free of control characters")]
    InvalidLogFilter(String),
}

/// Validate and canonicalize a library root
///
/// The root must exist, be a directory, and be listable. Symlinks are
/// resolved so the stored path is the real location.
pub fn validate_library_root(path: &Path) -> Result<PathBuf, SecurityError> {
    let canonical = path
        .canonicalize()
        .map_err(|_| SecurityError::PathDoesNotExist(path.to_path_buf()))?;

    if !canonical.is_dir() {
        return Err(SecurityError::NotADirectory(canonical));
    }

    if fs::read_dir(&canonical).is_err() {
        return Err(SecurityError::NotReadable(canonical));
    }

    Ok(canonical)
}

/// Validate a tracing filter directive string
pub fn validate_log_filter(filter: &str) -> Result<(), SecurityError> {
    if filter.trim().is_empty() || filter.chars().any(|c| c.is_control()) {
        return Err(SecurityError::InvalidLogFilter(filter.to_string()));
    }
    Ok(())
}

/// Set restrictive permissions on config file (Unix only)
#[cfg(unix)]
pub fn set_config_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600); // rw------- (user read/write only)
    fs::set_permissions(path, perms)?;
    Ok(())
}

/// Set config permissions (no-op off Unix; the profile directory's ACL applies)
#[cfg(not(unix))]
pub fn set_config_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
