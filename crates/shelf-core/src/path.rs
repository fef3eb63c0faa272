//! Validated, normalized absolute paths.
//!
//! A [`PathIdentity`] is the only path value passed between layers. It can
//! only be built through [`PathIdentity::directory`] or [`PathIdentity::file`],
//! both of which normalize and reject invalid input with
//! [`Error::InvalidPath`](crate::Error::InvalidPath).

use crate::error::{Error, Result};
use crate::platform::Platform;
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// A normalized absolute path.
///
/// Directory identities always end with the platform separator; file
/// identities never do. Equality, ordering and hashing use the normalized
/// string only.
#[derive(Clone)]
pub struct PathIdentity {
    normalized: String,
    root_len: usize,
    platform: Platform,
}

impl PathIdentity {
    /// Build a directory identity.
    ///
    /// A trailing separator is appended if missing.
    pub fn directory(raw: &str, platform: Platform) -> Result<Self> {
        Self::build(raw, platform, true)
    }

    /// Build a file identity.
    ///
    /// Fails for roots and for input ending in a separator.
    pub fn file(raw: &str, platform: Platform) -> Result<Self> {
        if raw.chars().last().is_some_and(|c| platform.is_separator(c)) {
            return Err(Error::invalid_path(raw, "file path ends with a separator"));
        }
        Self::build(raw, platform, false)
    }

    fn build(raw: &str, platform: Platform, is_directory: bool) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(Error::invalid_path(raw, "path is empty"));
        }

        let (mut normalized, rest) = split_root(raw, platform)
            .ok_or_else(|| Error::invalid_path(raw, "path is not absolute"))?;
        let root_len = normalized.len();

        let mut segments: Vec<&str> = Vec::new();
        for part in rest.split(|c| platform.is_separator(c)) {
            match part {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                name => {
                    if let Some(bad) = name.chars().find(|c| platform.is_invalid_char(*c)) {
                        return Err(Error::invalid_path(
                            raw,
                            format!("invalid character {bad:?}"),
                        ));
                    }
                    segments.push(name);
                }
            }
        }

        if !is_directory && segments.is_empty() {
            return Err(Error::invalid_path(raw, "a root cannot name a file"));
        }

        let separator = platform.separator();
        for (index, segment) in segments.iter().enumerate() {
            if index > 0 {
                normalized.push(separator);
            }
            normalized.push_str(segment);
        }
        if is_directory && !segments.is_empty() {
            normalized.push(separator);
        }

        Ok(Self {
            normalized,
            root_len,
            platform,
        })
    }

    /// The normalized string.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// The normalized string as a [`Path`].
    pub fn as_path(&self) -> &Path {
        Path::new(&self.normalized)
    }

    /// Platform whose rules built this identity.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Whether this identity names a directory.
    pub fn is_directory(&self) -> bool {
        self.normalized.ends_with(self.platform.separator())
    }

    /// Whether this identity is a filesystem root (`/`, `C:\`).
    pub fn is_root(&self) -> bool {
        self.normalized.len() == self.root_len
    }

    /// The root prefix, separator included.
    pub fn root(&self) -> &str {
        &self.normalized[..self.root_len]
    }

    /// Path segments below the root, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.normalized[self.root_len..]
            .split(self.platform.separator())
            .filter(|segment| !segment.is_empty())
    }

    /// Last segment, or `None` for a root.
    pub fn file_name(&self) -> Option<&str> {
        self.segments().last()
    }
}

/// Split `raw` into its normalized root and the remainder.
fn split_root(raw: &str, platform: Platform) -> Option<(String, &str)> {
    match platform {
        Platform::Unix => raw.strip_prefix('/').map(|rest| ("/".to_string(), rest)),
        Platform::Windows => {
            let mut chars = raw.chars();
            let letter = chars.next().filter(char::is_ascii_alphabetic)?;
            if chars.next() != Some(':') {
                return None;
            }
            let rest = &raw[2..];
            let rest = match rest.chars().next() {
                None => rest,
                Some(c) if platform.is_separator(c) => &rest[1..],
                // `C:foo` is drive-relative, not absolute.
                Some(_) => return None,
            };
            Some((format!("{}:\\", letter.to_ascii_uppercase()), rest))
        }
    }
}

impl PartialEq for PathIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for PathIdentity {}

impl Hash for PathIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl PartialOrd for PathIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PathIdentity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized.cmp(&other.normalized)
    }
}

impl fmt::Debug for PathIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathIdentity({:?})", self.normalized)
    }
}

impl fmt::Display for PathIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

impl AsRef<Path> for PathIdentity {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

impl Serialize for PathIdentity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.normalized)
    }
}

/// One decomposed path element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSegment {
    /// Segment name; for a root this is the root string including its separator.
    pub name: String,
    /// Whether the segment names a directory.
    pub is_directory: bool,
    /// Whether the segment is the filesystem or drive root.
    pub is_drive_root: bool,
}

impl PathSegment {
    /// A root segment (`/`, `C:\`).
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: true,
            is_drive_root: true,
        }
    }

    /// A non-root segment.
    pub fn named(name: impl Into<String>, is_directory: bool) -> Self {
        Self {
            name: name.into(),
            is_directory,
            is_drive_root: false,
        }
    }
}
