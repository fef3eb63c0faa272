//! Shared helpers for engine tests.
//!
//! Permission outcomes come from stub gates so denial tests behave the same
//! when the suite runs as root.

#![allow(dead_code)]

use shelf_core::{AccessMode, PathIdentity, Platform, Result};
use shelf_fs::{for_platform, DirectoryEngine, FileEngine, PermissionGate};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Grants everything.
#[derive(Debug, Default)]
pub struct AllowAll;

impl PermissionGate for AllowAll {
    fn can_access_path(&self, _path: &Path, _mode: AccessMode, _is_file: bool) -> Result<bool> {
        Ok(true)
    }
}

/// Refuses everything.
#[derive(Debug, Default)]
pub struct DenyAll;

impl PermissionGate for DenyAll {
    fn can_access_path(&self, _path: &Path, _mode: AccessMode, _is_file: bool) -> Result<bool> {
        Ok(false)
    }
}

/// Refuses one mode, on one path or everywhere.
#[derive(Debug)]
pub struct DenyMode {
    pub mode: AccessMode,
    pub on: Option<PathBuf>,
}

impl DenyMode {
    pub fn everywhere(mode: AccessMode) -> Self {
        Self { mode, on: None }
    }

    pub fn on(mode: AccessMode, path: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            on: Some(path.into()),
        }
    }
}

impl PermissionGate for DenyMode {
    fn can_access_path(&self, path: &Path, mode: AccessMode, _is_file: bool) -> Result<bool> {
        let path_matches = self.on.as_deref().map_or(true, |on| on == path);
        Ok(!(mode == self.mode && path_matches))
    }
}

/// Grants everything and remembers what was asked.
#[derive(Debug, Default)]
pub struct RecordingGate {
    calls: Mutex<Vec<(PathBuf, AccessMode)>>,
}

impl RecordingGate {
    pub fn calls(&self) -> Vec<(PathBuf, AccessMode)> {
        self.calls.lock().unwrap().clone()
    }
}

impl PermissionGate for RecordingGate {
    fn can_access_path(&self, path: &Path, mode: AccessMode, _is_file: bool) -> Result<bool> {
        self.calls.lock().unwrap().push((path.to_path_buf(), mode));
        Ok(true)
    }
}

pub fn dir(path: &Path) -> PathIdentity {
    PathIdentity::directory(path.to_str().unwrap(), Platform::current()).unwrap()
}

pub fn file(path: &Path) -> PathIdentity {
    PathIdentity::file(path.to_str().unwrap(), Platform::current()).unwrap()
}

pub fn directory_engine(gate: Arc<dyn PermissionGate>) -> DirectoryEngine {
    DirectoryEngine::new(for_platform(Platform::current()), gate)
}

pub fn file_engine(gate: Arc<dyn PermissionGate>) -> FileEngine {
    FileEngine::new(for_platform(Platform::current()), gate)
}

/// Every path under `root` with file contents, relative and sorted.
pub fn snapshot(root: &Path) -> Vec<(PathBuf, Option<Vec<u8>>)> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<(PathBuf, Option<Vec<u8>>)>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            let relative = path.strip_prefix(root).unwrap().to_path_buf();
            if path.is_dir() {
                out.push((relative, None));
                walk(root, &path, out);
            } else {
                out.push((relative, Some(fs::read(&path).unwrap())));
            }
        }
    }

    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}
