//! Single-root path rules.

use super::PathStrategy;
use shelf_core::{PathIdentity, Platform};
use std::fs;
use std::path::Path;

/// Paths under a single `/` root; dot-prefixed names are hidden.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixPathStrategy;

impl PathStrategy for UnixPathStrategy {
    fn platform(&self) -> Platform {
        Platform::Unix
    }

    fn is_hidden(&self, path: &Path, _metadata: Option<&fs::Metadata>) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with('.'))
    }

    fn drive_roots(&self) -> Vec<PathIdentity> {
        PathIdentity::directory("/", Platform::Unix)
            .into_iter()
            .collect()
    }
}
