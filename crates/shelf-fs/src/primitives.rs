//! Low-level filesystem primitives shared by the engines.

use crate::strategy::PathStrategy;
use chrono::{DateTime, Utc};
use filetime::FileTime;
use shelf_core::{Error, ListedEntry, PathIdentity, Result};
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

/// Fail with [`Error::InvalidPath`] unless `path` is a directory identity.
pub(crate) fn expect_directory(path: &PathIdentity) -> Result<()> {
    if path.is_directory() {
        Ok(())
    } else {
        Err(Error::invalid_path(path.as_path(), "expected a directory path"))
    }
}

/// Fail with [`Error::DirectoryNotFound`] unless a directory exists at `path`.
pub(crate) fn ensure_directory(path: &PathIdentity) -> Result<()> {
    if path.as_path().is_dir() {
        Ok(())
    } else {
        Err(Error::DirectoryNotFound {
            path: path.as_path().to_path_buf(),
        })
    }
}

/// Which children a listing keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
    Directory,
    File,
}

/// Read `path`'s attributes; a failed read still yields an entry.
pub(crate) fn read_entry(path: PathIdentity, name: impl Into<String>) -> ListedEntry {
    let name = name.into();
    match fs::metadata(path.as_path()) {
        Ok(metadata) => entry_from_metadata(path, name, &metadata),
        Err(error) => {
            warn!(path = %path, %error, "attributes unreadable, marking inaccessible");
            ListedEntry::unreadable(path, name)
        }
    }
}

fn entry_from_metadata(path: PathIdentity, name: String, metadata: &fs::Metadata) -> ListedEntry {
    ListedEntry {
        path,
        name,
        // Not every filesystem records a birth time.
        created: metadata.created().ok().map(DateTime::<Utc>::from),
        modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        size: metadata.is_file().then(|| metadata.len()),
        metadata_read: true,
    }
}

/// Display name for an identity; roots are named by their root string.
pub(crate) fn display_name(path: &PathIdentity) -> String {
    path.file_name().unwrap_or_else(|| path.root()).to_string()
}

/// List children of `dir` of one kind, sorted by name.
///
/// Children whose attributes cannot be read are kept with `metadata_read =
/// false`. Names that cannot form a valid identity are skipped with a warning.
pub(crate) fn list_children(
    strategy: &dyn PathStrategy,
    dir: &PathIdentity,
    kind: EntryKind,
    include_hidden: bool,
) -> Result<Vec<ListedEntry>> {
    let mut entries = Vec::new();

    for child in fs::read_dir(dir.as_path())? {
        let child = match child {
            Ok(child) => child,
            Err(error) => {
                warn!(dir = %dir, %error, "skipping unreadable directory entry");
                continue;
            }
        };

        let child_path = child.path();
        let is_dir = match child.file_type() {
            Ok(file_type) if file_type.is_symlink() => child_path.is_dir(),
            Ok(file_type) => file_type.is_dir(),
            Err(_) => child_path.is_dir(),
        };
        if is_dir != (kind == EntryKind::Directory) {
            continue;
        }

        let Ok(name) = child.file_name().into_string() else {
            warn!(path = %child_path.display(), "skipping entry with a non UTF-8 name");
            continue;
        };
        let identity = match strategy.combine_path(dir, &name, is_dir) {
            Ok(identity) => identity,
            Err(error) => {
                warn!(path = %child_path.display(), %error, "skipping entry with an invalid name");
                continue;
            }
        };

        let metadata = fs::metadata(&child_path);
        if !include_hidden && strategy.is_hidden(&child_path, metadata.as_ref().ok()) {
            continue;
        }

        let entry = match metadata {
            Ok(metadata) => entry_from_metadata(identity, name, &metadata),
            Err(error) => {
                warn!(path = %identity, %error, "attributes unreadable, marking inaccessible");
                ListedEntry::unreadable(identity, name)
            }
        };
        entries.push(entry);
    }

    entries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(entries)
}

/// Whether anything (file, directory or dangling link) occupies `path`.
pub(crate) fn is_present(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Copy access and modified times from `from` onto `to`.
pub(crate) fn copy_timestamps(from: &Path, to: &Path) -> io::Result<()> {
    let metadata = fs::metadata(from)?;
    filetime::set_file_times(
        to,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )
}

/// Copy a single file, optionally carrying its timestamps across.
///
/// `fs::copy` already carries permission bits.
pub(crate) fn copy_file(from: &Path, to: &Path, preserve_timestamps: bool) -> io::Result<()> {
    fs::copy(from, to)?;
    if preserve_timestamps {
        copy_timestamps(from, to)?;
    }
    Ok(())
}

/// Recursively copy `from` into `to`, creating `to` if needed.
///
/// Existing files under `to` are overwritten. Symbolic links are copied as
/// links, dangling ones included.
pub(crate) fn copy_tree(from: &Path, to: &Path, preserve_timestamps: bool) -> io::Result<()> {
    fs::create_dir_all(to)?;

    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let source = entry.path();
        let target = to.join(entry.file_name());
        let file_type = entry.file_type()?;

        if file_type.is_symlink() {
            copy_link(&source, &target)?;
        } else if file_type.is_dir() {
            copy_tree(&source, &target, preserve_timestamps)?;
        } else {
            copy_file(&source, &target, preserve_timestamps)?;
        }
    }

    // Last, since filling the directory bumps its modified time.
    if preserve_timestamps {
        copy_timestamps(from, to)?;
    }
    Ok(())
}

/// Recreate the link at `from` as `to`, pointing at the same target.
///
/// An existing non-directory at `to` is replaced. An existing directory is
/// left alone.
pub(crate) fn copy_link(from: &Path, to: &Path) -> io::Result<()> {
    let link_target = fs::read_link(from)?;

    match fs::symlink_metadata(to) {
        Ok(existing) if existing.is_dir() => {
            warn!(
                source = %from.display(),
                destination = %to.display(),
                "directory occupies link name, skipping"
            );
            return Ok(());
        }
        Ok(_) => fs::remove_file(to)?,
        Err(_) => {}
    }

    make_link(from, &link_target, to)
}

#[cfg(unix)]
fn make_link(_from: &Path, link_target: &Path, to: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(link_target, to)
}

#[cfg(windows)]
fn make_link(from: &Path, link_target: &Path, to: &Path) -> io::Result<()> {
    // Windows links are typed; a dangling one is recreated as a file link.
    if from.is_dir() {
        std::os::windows::fs::symlink_dir(link_target, to)
    } else {
        std::os::windows::fs::symlink_file(link_target, to)
    }
}

#[cfg(not(any(unix, windows)))]
fn make_link(_from: &Path, _link_target: &Path, _to: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this target",
    ))
}

/// Whether `error` is the OS refusing a rename across filesystems.
pub(crate) fn crosses_devices(error: &io::Error) -> bool {
    #[cfg(unix)]
    const CROSS_DEVICE: i32 = nix::libc::EXDEV;
    // ERROR_NOT_SAME_DEVICE
    #[cfg(windows)]
    const CROSS_DEVICE: i32 = 17;
    #[cfg(not(any(unix, windows)))]
    const CROSS_DEVICE: i32 = -1;

    error.raw_os_error() == Some(CROSS_DEVICE)
}

/// Rename a directory, falling back to copy-then-remove across devices.
pub(crate) fn relocate_tree(from: &Path, to: &Path, preserve_timestamps: bool) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(error) if crosses_devices(&error) => {
            copy_tree(from, to, preserve_timestamps)?;
            fs::remove_dir_all(from)
        }
        result => result,
    }
}

/// Rename a file, falling back to copy-then-remove across devices.
pub(crate) fn relocate_file(from: &Path, to: &Path, preserve_timestamps: bool) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(error) if crosses_devices(&error) => {
            copy_file(from, to, preserve_timestamps)?;
            fs::remove_file(from)
        }
        result => result,
    }
}

/// Remove `dir` if it has no children; returns whether it was removed.
pub(crate) fn remove_if_empty(dir: &Path) -> io::Result<bool> {
    if fs::read_dir(dir)?.next().is_none() {
        fs::remove_dir(dir)?;
        Ok(true)
    } else {
        Ok(false)
    }
}
