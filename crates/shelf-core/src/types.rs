//! Entities returned to callers and the access modes they are checked against.

use crate::path::PathIdentity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The operation a permission check is made for.
///
/// Each platform gate maps these onto its own primitives (mode bits or ACL rights).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessMode {
    /// Read attributes such as timestamps and size.
    ReadProperties,
    /// Read file bytes or directory entries.
    ReadContents,
    /// Create or modify.
    Write,
    /// Execute a file or traverse a directory.
    Execute,
    /// List a directory's children.
    ListDirectory,
    /// Remove the item.
    Delete,
}

impl AccessMode {
    /// Returns all modes in a consistent order
    pub fn all() -> &'static [AccessMode] {
        &[
            AccessMode::ReadProperties,
            AccessMode::ReadContents,
            AccessMode::Write,
            AccessMode::Execute,
            AccessMode::ListDirectory,
            AccessMode::Delete,
        ]
    }

    /// Kebab-case name used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::ReadProperties => "read-properties",
            AccessMode::ReadContents => "read-contents",
            AccessMode::Write => "write",
            AccessMode::Execute => "execute",
            AccessMode::ListDirectory => "list-directory",
            AccessMode::Delete => "delete",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an entity's metadata could be fully read.
///
/// Once an item is marked inaccessible it stays that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// All requested metadata was retrieved.
    #[default]
    Accessible,
    /// Listed, but some metadata could not be retrieved.
    Inaccessible,
}

impl ItemStatus {
    /// Downgrade to [`ItemStatus::Inaccessible`]. There is no way back.
    pub fn mark_inaccessible(&mut self) {
        *self = ItemStatus::Inaccessible;
    }

    /// Whether the item is accessible.
    pub fn is_accessible(&self) -> bool {
        matches!(self, ItemStatus::Accessible)
    }
}

/// One raw listing result produced by the engines.
///
/// `metadata_read` records whether the attribute read succeeded; a failed read
/// never removes the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    /// Identity of the child.
    pub path: PathIdentity,
    /// Display name (last path segment).
    pub name: String,
    /// Creation time, when the platform reports it.
    pub created: Option<DateTime<Utc>>,
    /// Last modification time.
    pub modified: Option<DateTime<Utc>>,
    /// Size in bytes (files only).
    pub size: Option<u64>,
    /// Whether the attribute read succeeded.
    pub metadata_read: bool,
}

impl ListedEntry {
    /// An entry whose attributes could not be read.
    pub fn unreadable(path: PathIdentity, name: impl Into<String>) -> Self {
        Self {
            path,
            name: name.into(),
            created: None,
            modified: None,
            size: None,
            metadata_read: false,
        }
    }

    /// Status derived from the attribute read.
    ///
    /// Every entity built from a listing goes through here.
    pub fn status(&self) -> ItemStatus {
        let mut status = ItemStatus::Accessible;
        if !self.metadata_read {
            status.mark_inaccessible();
        }
        status
    }
}

/// A directory as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directory {
    /// Identity, with trailing separator.
    pub path: PathIdentity,
    /// Directory name.
    pub name: String,
    /// Creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Last modification time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    /// Accessibility of its metadata.
    pub status: ItemStatus,
}

impl From<ListedEntry> for Directory {
    fn from(entry: ListedEntry) -> Self {
        let status = entry.status();
        Self {
            path: entry.path,
            name: entry.name,
            created: entry.created,
            modified: entry.modified,
            status,
        }
    }
}

/// A file as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct File {
    /// Identity.
    pub path: PathIdentity,
    /// File name including extension.
    pub name: String,
    /// Creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Last modification time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    /// Size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Accessibility of its metadata.
    pub status: ItemStatus,
}

impl From<ListedEntry> for File {
    fn from(entry: ListedEntry) -> Self {
        let status = entry.status();
        Self {
            path: entry.path,
            name: entry.name,
            created: entry.created,
            modified: entry.modified,
            size: entry.size,
            status,
        }
    }
}

/// A navigable root: the single `/` on Unix, or one lettered drive on Windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Drive {
    /// Display name (`/`, `C:`).
    pub name: String,
    /// Root identity.
    pub root: PathIdentity,
    /// Whether the root's metadata was readable.
    pub status: ItemStatus,
}

impl Drive {
    /// Build a drive entity from its root.
    pub fn new(root: PathIdentity, metadata_read: bool) -> Self {
        let name = match root.root().trim_end_matches(['\\', '/']) {
            "" => root.root().to_string(),
            letter => letter.to_string(),
        };
        let mut status = ItemStatus::Accessible;
        if !metadata_read {
            status.mark_inaccessible();
        }
        Self { name, root, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Platform;

    fn entry(metadata_read: bool) -> ListedEntry {
        let path = PathIdentity::directory("/media/books", Platform::Unix).unwrap();
        ListedEntry {
            path,
            name: "books".to_string(),
            created: None,
            modified: Some(Utc::now()),
            size: None,
            metadata_read,
        }
    }

    #[test]
    fn test_status_is_sticky() {
        let mut status = ItemStatus::default();
        assert!(status.is_accessible());
        status.mark_inaccessible();
        status.mark_inaccessible();
        assert_eq!(status, ItemStatus::Inaccessible);
    }

    #[test]
    fn test_failed_metadata_read_keeps_entry() {
        let directory = Directory::from(entry(false));
        assert_eq!(directory.name, "books");
        assert_eq!(directory.status, ItemStatus::Inaccessible);
        // Whatever was retrieved is kept.
        assert!(directory.modified.is_some());
    }

    #[test]
    fn test_file_from_entry() {
        let path = PathIdentity::file("/media/books/dune.epub", Platform::Unix).unwrap();
        let mut listed = ListedEntry::unreadable(path, "dune.epub");
        listed.size = Some(42);
        listed.metadata_read = true;

        let file = File::from(listed);
        assert_eq!(file.size, Some(42));
        assert!(file.status.is_accessible());
    }

    #[test]
    fn test_drive_names() {
        let unix = Drive::new(PathIdentity::directory("/", Platform::Unix).unwrap(), true);
        assert_eq!(unix.name, "/");

        let windows = Drive::new(
            PathIdentity::directory("C:\\", Platform::Windows).unwrap(),
            false,
        );
        assert_eq!(windows.name, "C:");
        assert_eq!(windows.status, ItemStatus::Inaccessible);
    }

    #[test]
    fn test_access_mode_display() {
        assert_eq!(AccessMode::ListDirectory.to_string(), "list-directory");
        assert_eq!(AccessMode::all().len(), 6);
    }
}
