//! File listing and mutation.

use crate::directory::CopyOptions;
use crate::permission::{require, PermissionGate};
use crate::primitives::{
    copy_file, display_name, ensure_directory, expect_directory, is_present, list_children,
    read_entry, relocate_file, EntryKind,
};
use crate::strategy::PathStrategy;
use shelf_core::{AccessMode, Error, ListedEntry, PathIdentity, Platform, Result};
use std::fs;
use std::sync::Arc;
use tracing::{debug, info};

/// Synchronous file operations.
///
/// File name collisions are never resolved automatically: without
/// `override_existing` they fail with [`Error::FileAlreadyExists`].
#[derive(Debug, Clone)]
pub struct FileEngine {
    strategy: Arc<dyn PathStrategy>,
    gate: Arc<dyn PermissionGate>,
    options: CopyOptions,
}

impl FileEngine {
    /// Create an engine with default copy options.
    pub fn new(strategy: Arc<dyn PathStrategy>, gate: Arc<dyn PermissionGate>) -> Self {
        Self {
            strategy,
            gate,
            options: CopyOptions::default(),
        }
    }

    /// Replace the copy options.
    pub fn with_options(mut self, options: CopyOptions) -> Self {
        self.options = options;
        self
    }

    /// The strategy paths are resolved with.
    pub fn strategy(&self) -> &Arc<dyn PathStrategy> {
        &self.strategy
    }

    /// Regular files directly inside `dir`, sorted by name.
    pub fn list(&self, dir: &PathIdentity, include_hidden: bool) -> Result<Vec<ListedEntry>> {
        expect_directory(dir)?;
        ensure_directory(dir)?;
        require(self.gate.as_ref(), dir, AccessMode::ListDirectory)?;

        list_children(self.strategy.as_ref(), dir, EntryKind::File, include_hidden)
    }

    /// Copy `file` into `destination_dir`, keeping its name.
    pub fn copy(
        &self,
        file: &PathIdentity,
        destination_dir: &PathIdentity,
        override_existing: bool,
    ) -> Result<PathIdentity> {
        let target = self.resolve_transfer(file, destination_dir)?;
        if target == *file {
            return Err(Error::FileAlreadyExists {
                path: target.as_path().to_path_buf(),
            });
        }

        require(self.gate.as_ref(), file, AccessMode::ReadContents)?;
        require(self.gate.as_ref(), destination_dir, AccessMode::Write)?;
        check_collision(&target, override_existing)?;

        debug!(source = %file, destination = %target, "copying file");
        copy_file(
            file.as_path(),
            target.as_path(),
            self.options.preserve_timestamps,
        )?;
        info!(source = %file, destination = %target, "file copied");
        Ok(target)
    }

    /// Move `file` into `destination_dir`, keeping its name.
    pub fn move_to(
        &self,
        file: &PathIdentity,
        destination_dir: &PathIdentity,
        override_existing: bool,
    ) -> Result<PathIdentity> {
        let target = self.resolve_transfer(file, destination_dir)?;
        if target == *file {
            return Ok(target);
        }

        require(self.gate.as_ref(), file, AccessMode::Delete)?;
        require(self.gate.as_ref(), destination_dir, AccessMode::Write)?;
        check_collision(&target, override_existing)?;

        debug!(source = %file, destination = %target, "moving file");
        relocate_file(
            file.as_path(),
            target.as_path(),
            self.options.preserve_timestamps,
        )?;
        info!(source = %file, destination = %target, "file moved");
        Ok(target)
    }

    /// Rename `file` within its directory.
    pub fn rename(&self, file: &PathIdentity, new_name: &str) -> Result<PathIdentity> {
        ensure_file(file)?;
        let parent = self.strategy.parent(file)?;
        let target = self.strategy.combine_path(&parent, new_name, false)?;
        if target == *file {
            return Ok(target);
        }

        require(self.gate.as_ref(), &parent, AccessMode::Write)?;

        let case_only = file.platform() == Platform::Windows
            && target.as_str().eq_ignore_ascii_case(file.as_str());
        if !case_only && is_present(target.as_path()) {
            return Err(Error::FileAlreadyExists {
                path: target.as_path().to_path_buf(),
            });
        }

        debug!(from = %file, to = %target, "renaming file");
        fs::rename(file.as_path(), target.as_path())?;
        Ok(target)
    }

    /// Delete `file`.
    pub fn delete(&self, file: &PathIdentity) -> Result<()> {
        ensure_file(file)?;
        require(self.gate.as_ref(), file, AccessMode::Delete)?;

        debug!(path = %file, "deleting file");
        fs::remove_file(file.as_path())?;
        Ok(())
    }

    /// The full contents of `file`.
    pub fn read(&self, file: &PathIdentity) -> Result<Vec<u8>> {
        ensure_file(file)?;
        require(self.gate.as_ref(), file, AccessMode::ReadContents)?;

        Ok(fs::read(file.as_path())?)
    }

    /// Attributes of a single file, read best-effort.
    pub fn entry(&self, file: &PathIdentity) -> ListedEntry {
        read_entry(file.clone(), display_name(file))
    }

    fn resolve_transfer(
        &self,
        file: &PathIdentity,
        destination_dir: &PathIdentity,
    ) -> Result<PathIdentity> {
        ensure_file(file)?;
        expect_directory(destination_dir)?;
        ensure_directory(destination_dir)?;

        let name = display_name(file);
        self.strategy.combine_path(destination_dir, &name, false)
    }
}

fn ensure_file(file: &PathIdentity) -> Result<()> {
    if file.is_directory() {
        return Err(Error::invalid_path(file.as_path(), "expected a file path"));
    }
    if file.as_path().is_file() {
        Ok(())
    } else {
        Err(Error::FileNotFound {
            path: file.as_path().to_path_buf(),
        })
    }
}

fn check_collision(target: &PathIdentity, override_existing: bool) -> Result<()> {
    if !is_present(target.as_path()) {
        return Ok(());
    }
    // A directory in the way is never overwritten.
    if !override_existing || target.as_path().is_dir() {
        return Err(Error::FileAlreadyExists {
            path: target.as_path().to_path_buf(),
        });
    }
    Ok(())
}
