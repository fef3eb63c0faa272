//! Directory enumeration and mutation.

use crate::permission::{require, PermissionGate};
use crate::primitives::{
    copy_tree, display_name, ensure_directory, expect_directory, is_present, list_children,
    read_entry, relocate_file, relocate_tree, remove_if_empty, EntryKind,
};
use crate::strategy::PathStrategy;
use shelf_core::{AccessMode, Error, ListedEntry, PathIdentity, Platform, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Options applied to copies and cross-device moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOptions {
    /// Carry access and modified times over to copied files and directories.
    pub preserve_timestamps: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            preserve_timestamps: true,
        }
    }
}

/// Outcome of a directory move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    /// Where the directory now lives.
    pub destination: PathIdentity,
    /// Source items left in place because the destination already held them.
    pub skipped: Vec<PathBuf>,
    /// Whether the source directory itself is gone.
    pub source_removed: bool,
}

/// Synchronous directory operations.
///
/// Every mutation is preceded by a permission check; a denial returns
/// [`Error::UnauthorizedAccess`] before the filesystem is touched.
#[derive(Debug, Clone)]
pub struct DirectoryEngine {
    strategy: Arc<dyn PathStrategy>,
    gate: Arc<dyn PermissionGate>,
    options: CopyOptions,
}

impl DirectoryEngine {
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

    /// Child directories of `path`, sorted by name.
    ///
    /// # Errors
    ///
    /// [`Error::DirectoryNotFound`] if `path` is missing and
    /// [`Error::UnauthorizedAccess`] if listing is denied. Children whose
    /// attributes cannot be read are returned with `metadata_read = false`.
    pub fn enumerate(&self, path: &PathIdentity, include_hidden: bool) -> Result<Vec<ListedEntry>> {
        expect_directory(path)?;
        ensure_directory(path)?;
        require(self.gate.as_ref(), path, AccessMode::ListDirectory)?;

        list_children(
            self.strategy.as_ref(),
            path,
            EntryKind::Directory,
            include_hidden,
        )
    }

    /// Create `name` under `parent`.
    pub fn create(&self, parent: &PathIdentity, name: &str) -> Result<PathIdentity> {
        expect_directory(parent)?;
        let target = self.strategy.combine_path(parent, name, true)?;
        ensure_directory(parent)?;
        require(self.gate.as_ref(), parent, AccessMode::Write)?;

        if is_present(target.as_path()) {
            return Err(Error::DirectoryAlreadyExists {
                path: target.as_path().to_path_buf(),
            });
        }

        debug!(path = %target, "creating directory");
        fs::create_dir(target.as_path())?;
        Ok(target)
    }

    /// Recursively copy `source` to `destination`.
    ///
    /// When `destination` is taken and `override_existing` is false, the copy
    /// lands at the first free name of `"<dest> - Copy"`, `"<dest> - Copy (2)"`,
    /// and so on. With `override_existing` the copy is written into the
    /// existing directory, overwriting same-named files; that needs `Write` on
    /// the existing directory and on each existing subdirectory written into.
    ///
    /// Returns the directory actually written.
    pub fn copy(
        &self,
        source: &PathIdentity,
        destination: &PathIdentity,
        override_existing: bool,
    ) -> Result<PathIdentity> {
        expect_directory(source)?;
        expect_directory(destination)?;
        ensure_directory(source)?;
        reject_into_itself(source, destination, "copy")?;
        let destination_parent = self.parent_of(destination, "copy")?;

        require(self.gate.as_ref(), source, AccessMode::ReadContents)?;
        require(self.gate.as_ref(), &destination_parent, AccessMode::Write)?;

        // Copying a directory over itself always goes to a fresh name.
        let overwrite = override_existing && source != destination;
        let target = if !is_present(destination.as_path()) || overwrite {
            destination.clone()
        } else {
            self.free_copy_name(&destination_parent, destination)?
        };
        if overwrite && is_present(target.as_path()) {
            self.require_write_into(source, &target)?;
        }

        debug!(source = %source, destination = %target, override_existing, "copying directory");
        copy_tree(
            source.as_path(),
            target.as_path(),
            self.options.preserve_timestamps,
        )
        .map_err(|error| Error::DirectoryCopyError {
            source_path: source.as_path().to_path_buf(),
            destination: target.as_path().to_path_buf(),
            source: error,
        })?;

        info!(source = %source, destination = %target, "directory copied");
        Ok(target)
    }

    /// Move `source` to `destination`, merging into it if it exists.
    ///
    /// See [`DirectoryEngine::move_to_with_report`] for what was left behind.
    pub fn move_to(
        &self,
        source: &PathIdentity,
        destination: &PathIdentity,
        override_existing: bool,
    ) -> Result<PathIdentity> {
        self.move_to_with_report(source, destination, override_existing)
            .map(|report| report.destination)
    }

    /// Move `source` to `destination` and report what was skipped.
    ///
    /// An absent destination is a single rename. An existing one is merged:
    /// items with no counterpart are relocated, matching subdirectories are
    /// merged recursively, and matching files are replaced only with
    /// `override_existing`. Items that could not be placed stay in the source,
    /// and each source directory is removed only once it is empty. A merge
    /// needs `Write` on every existing destination directory it touches.
    pub fn move_to_with_report(
        &self,
        source: &PathIdentity,
        destination: &PathIdentity,
        override_existing: bool,
    ) -> Result<MoveReport> {
        expect_directory(source)?;
        expect_directory(destination)?;
        ensure_directory(source)?;

        if source == destination {
            return Ok(MoveReport {
                destination: destination.clone(),
                skipped: Vec::new(),
                source_removed: false,
            });
        }
        if source.is_root() {
            return Err(Error::invalid_path(source.as_path(), "cannot move a root"));
        }
        reject_into_itself(source, destination, "move")?;
        let destination_parent = self.parent_of(destination, "move")?;

        require(self.gate.as_ref(), source, AccessMode::Delete)?;
        require(self.gate.as_ref(), &destination_parent, AccessMode::Write)?;

        let move_error = |error: io::Error| Error::DirectoryMoveError {
            source_path: source.as_path().to_path_buf(),
            destination: destination.as_path().to_path_buf(),
            source: error,
        };

        if !is_present(destination.as_path()) {
            debug!(source = %source, destination = %destination, "moving directory");
            relocate_tree(
                source.as_path(),
                destination.as_path(),
                self.options.preserve_timestamps,
            )
            .map_err(move_error)?;

            info!(source = %source, destination = %destination, "directory moved");
            return Ok(MoveReport {
                destination: destination.clone(),
                skipped: Vec::new(),
                source_removed: true,
            });
        }

        if !destination.as_path().is_dir() {
            return Err(Error::invalid_path(
                destination.as_path(),
                "destination exists and is not a directory",
            ));
        }

        self.require_write_into(source, destination)?;

        debug!(source = %source, destination = %destination, override_existing, "merging directory");
        let mut skipped = Vec::new();
        let source_removed = self
            .merge(
                source.as_path(),
                destination.as_path(),
                override_existing,
                &mut skipped,
            )
            .map_err(move_error)?;

        if skipped.is_empty() {
            info!(source = %source, destination = %destination, "directory merged");
        } else {
            warn!(
                source = %source,
                destination = %destination,
                skipped = skipped.len(),
                "directory merged, some items left in source"
            );
        }

        Ok(MoveReport {
            destination: destination.clone(),
            skipped,
            source_removed,
        })
    }

    /// Require `Write` on `destination` and on every existing subdirectory a
    /// copy or merge of `source` would write into.
    fn require_write_into(&self, source: &PathIdentity, destination: &PathIdentity) -> Result<()> {
        require(self.gate.as_ref(), destination, AccessMode::Write)?;

        for child in fs::read_dir(source.as_path())? {
            let child = child?;
            // Links are recreated or relocated as links, never written through.
            if !child.file_type()?.is_dir() {
                continue;
            }
            let Ok(name) = child.file_name().into_string() else {
                continue;
            };
            let nested_target = self.strategy.combine_path(destination, &name, true)?;
            if nested_target.as_path().is_dir() {
                let nested_source = self.strategy.combine_path(source, &name, true)?;
                self.require_write_into(&nested_source, &nested_target)?;
            }
        }
        Ok(())
    }

    fn merge(
        &self,
        from: &Path,
        to: &Path,
        override_existing: bool,
        skipped: &mut Vec<PathBuf>,
    ) -> io::Result<bool> {
        // Snapshot first; the loop moves entries out of `from`.
        let children = fs::read_dir(from)?
            .map(|entry| {
                let entry = entry?;
                Ok((entry.path(), entry.file_type()?.is_dir(), entry.file_name()))
            })
            .collect::<io::Result<Vec<_>>>()?;

        for (child, is_dir, name) in children {
            let target = to.join(&name);

            if !is_present(&target) {
                if is_dir {
                    relocate_tree(&child, &target, self.options.preserve_timestamps)?;
                } else {
                    relocate_file(&child, &target, self.options.preserve_timestamps)?;
                }
                continue;
            }

            if is_dir != target.is_dir() {
                warn!(
                    source = %child.display(),
                    destination = %target.display(),
                    "kind mismatch, skipping"
                );
                skipped.push(child);
            } else if is_dir {
                self.merge(&child, &target, override_existing, skipped)?;
            } else if override_existing {
                debug!(source = %child.display(), destination = %target.display(), "replacing file");
                relocate_file(&child, &target, self.options.preserve_timestamps)?;
            } else {
                debug!(source = %child.display(), destination = %target.display(), "file exists, skipping");
                skipped.push(child);
            }
        }

        remove_if_empty(from)
    }

    /// Rename `path` within its parent.
    pub fn rename(&self, path: &PathIdentity, new_name: &str) -> Result<PathIdentity> {
        expect_directory(path)?;
        if path.is_root() {
            return Err(Error::invalid_path(path.as_path(), "cannot rename a root"));
        }
        ensure_directory(path)?;

        let parent = self.strategy.parent(path)?;
        let target = self.strategy.combine_path(&parent, new_name, true)?;
        if &target == path {
            return Ok(target);
        }

        require(self.gate.as_ref(), &parent, AccessMode::Write)?;
        require(self.gate.as_ref(), path, AccessMode::Execute)?;

        // A case-only rename on Windows sees the source itself as the target.
        let case_only = path.platform() == Platform::Windows
            && target.as_str().eq_ignore_ascii_case(path.as_str());
        if !case_only && is_present(target.as_path()) {
            return Err(Error::DirectoryAlreadyExists {
                path: target.as_path().to_path_buf(),
            });
        }

        debug!(from = %path, to = %target, "renaming directory");
        fs::rename(path.as_path(), target.as_path())?;
        Ok(target)
    }

    /// Delete `path` and everything under it.
    pub fn delete(&self, path: &PathIdentity) -> Result<()> {
        expect_directory(path)?;
        if path.is_root() {
            return Err(Error::invalid_path(path.as_path(), "cannot delete a root"));
        }
        ensure_directory(path)?;
        require(self.gate.as_ref(), path, AccessMode::Delete)?;

        debug!(path = %path, "deleting directory");
        fs::remove_dir_all(path.as_path())?;
        info!(path = %path, "directory deleted");
        Ok(())
    }

    /// Attributes of a single directory, read best-effort.
    pub fn entry(&self, path: &PathIdentity) -> ListedEntry {
        read_entry(path.clone(), display_name(path))
    }

    fn parent_of(&self, destination: &PathIdentity, operation: &str) -> Result<PathIdentity> {
        if destination.is_root() {
            return Err(Error::invalid_path(
                destination.as_path(),
                format!("cannot {operation} onto a root"),
            ));
        }
        let parent = self.strategy.parent(destination)?;
        ensure_directory(&parent)?;
        Ok(parent)
    }

    fn free_copy_name(
        &self,
        parent: &PathIdentity,
        destination: &PathIdentity,
    ) -> Result<PathIdentity> {
        let base = display_name(destination);

        let mut attempt = 1u32;
        loop {
            let name = match attempt {
                1 => format!("{base} - Copy"),
                n => format!("{base} - Copy ({n})"),
            };
            let candidate = self.strategy.combine_path(parent, &name, true)?;
            if !is_present(candidate.as_path()) {
                return Ok(candidate);
            }
            attempt += 1;
        }
    }
}

fn reject_into_itself(
    source: &PathIdentity,
    destination: &PathIdentity,
    operation: &str,
) -> Result<()> {
    // Directory identities end in a separator, so a prefix match is a subtree match.
    let inside = match source.platform() {
        Platform::Windows => destination
            .as_str()
            .to_lowercase()
            .starts_with(&source.as_str().to_lowercase()),
        Platform::Unix => destination.as_str().starts_with(source.as_str()),
    };
    if destination != source && inside {
        return Err(Error::invalid_path(
            destination.as_path(),
            format!("cannot {operation} a directory into itself"),
        ));
    }
    Ok(())
}
