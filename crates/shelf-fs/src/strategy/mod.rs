//! Platform path rules.
//!
//! A [`PathStrategy`] parses, validates, combines and decomposes
//! [`PathIdentity`] values. Everything except [`PathStrategy::exists`],
//! [`PathStrategy::is_hidden`] and [`PathStrategy::drive_roots`] is pure string
//! logic, so both implementations work on any host.

mod unix;
mod windows;

pub use unix::UnixPathStrategy;
pub use windows::WindowsPathStrategy;

use shelf_core::{Error, PathIdentity, PathSegment, Platform, Result};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Path semantics for one platform family.
///
/// Selected once at composition time; see [`for_platform`].
pub trait PathStrategy: Send + Sync + fmt::Debug {
    /// The platform whose rules this strategy applies.
    fn platform(&self) -> Platform;

    /// Whether the item at `path` is hidden.
    ///
    /// `metadata` is `None` when the attribute read failed; strategies that
    /// need attributes then treat the item as visible.
    fn is_hidden(&self, path: &Path, metadata: Option<&fs::Metadata>) -> bool;

    /// Navigable roots, ordered alphabetically.
    fn drive_roots(&self) -> Vec<PathIdentity>;

    /// Parse `raw` as a directory identity.
    fn directory(&self, raw: &str) -> Result<PathIdentity> {
        PathIdentity::directory(raw, self.platform())
    }

    /// Parse `raw` as a file identity.
    fn file(&self, raw: &str) -> Result<PathIdentity> {
        PathIdentity::file(raw, self.platform())
    }

    /// Whether `raw` is an acceptable absolute path.
    fn is_valid_path(&self, raw: &str) -> bool {
        PathIdentity::directory(raw, self.platform()).is_ok()
    }

    /// Characters rejected inside a path segment.
    fn invalid_path_chars(&self) -> Vec<char> {
        self.platform().invalid_path_chars()
    }

    /// Whether `path` exists, ignoring hidden items unless `include_hidden`.
    fn exists(&self, path: &PathIdentity, include_hidden: bool) -> bool {
        match fs::metadata(path.as_path()) {
            Ok(metadata) => include_hidden || !self.is_hidden(path.as_path(), Some(&metadata)),
            Err(_) => false,
        }
    }

    /// Append a single segment to a directory identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if `base` is not a directory identity or
    /// `name` is not exactly one valid segment.
    fn combine_path(
        &self,
        base: &PathIdentity,
        name: &str,
        is_directory: bool,
    ) -> Result<PathIdentity> {
        if !base.is_directory() {
            return Err(Error::invalid_path(
                base.as_path(),
                "cannot combine onto a file path",
            ));
        }
        validate_segment_name(name, self.platform())?;

        let raw = format!("{}{}", base.as_str(), name);
        if is_directory {
            self.directory(&raw)
        } else {
            self.file(&raw)
        }
    }

    /// Decompose `path` into segments, root first.
    fn parse_path(&self, path: &PathIdentity) -> Vec<PathSegment> {
        let names: Vec<&str> = path.segments().collect();
        let last = names.len().saturating_sub(1);

        let mut segments = Vec::with_capacity(names.len() + 1);
        segments.push(PathSegment::root(path.root()));
        for (index, name) in names.into_iter().enumerate() {
            let is_directory = index < last || path.is_directory();
            segments.push(PathSegment::named(name, is_directory));
        }
        segments
    }

    /// Rebuild an identity from segments produced by [`PathStrategy::parse_path`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if the first segment is not a root or any
    /// later segment is not a single valid name.
    fn combine_segments(&self, segments: &[PathSegment]) -> Result<PathIdentity> {
        let (root, rest) = segments
            .split_first()
            .ok_or_else(|| Error::invalid_path("", "no segments to combine"))?;
        if !root.is_drive_root {
            return Err(Error::invalid_path(&root.name, "first segment is not a root"));
        }

        let separator = self.platform().separator();
        let mut raw = root.name.clone();
        for (index, segment) in rest.iter().enumerate() {
            validate_segment_name(&segment.name, self.platform())?;
            if index > 0 {
                raw.push(separator);
            }
            raw.push_str(&segment.name);
        }

        match rest.last() {
            Some(last) if !last.is_directory => self.file(&raw),
            _ => self.directory(&raw),
        }
    }

    /// Segments of the parent directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CannotNavigateUp`] when `path` is a root.
    fn go_up_one_level(&self, path: &PathIdentity) -> Result<Vec<PathSegment>> {
        if path.is_root() {
            return Err(Error::CannotNavigateUp {
                path: path.as_path().to_path_buf(),
            });
        }
        let mut segments = self.parse_path(path);
        segments.pop();
        Ok(segments)
    }

    /// The parent directory identity.
    fn parent(&self, path: &PathIdentity) -> Result<PathIdentity> {
        let segments = self.go_up_one_level(path)?;
        self.combine_segments(&segments)
    }

    /// The root segment of `path`.
    fn get_path_root(&self, path: &PathIdentity) -> PathSegment {
        PathSegment::root(path.root())
    }
}

/// Check that `name` is exactly one segment valid on `platform`.
pub fn validate_segment_name(name: &str, platform: Platform) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(Error::invalid_path(name, "not a usable name"));
    }
    if name.chars().any(|c| platform.is_separator(c)) {
        return Err(Error::invalid_path(name, "name contains a path separator"));
    }
    if let Some(bad) = name.chars().find(|c| platform.is_invalid_char(*c)) {
        return Err(Error::invalid_path(
            name,
            format!("invalid character {bad:?}"),
        ));
    }
    Ok(())
}

/// The strategy for `platform`.
pub fn for_platform(platform: Platform) -> Arc<dyn PathStrategy> {
    match platform {
        Platform::Unix => Arc::new(UnixPathStrategy),
        Platform::Windows => Arc::new(WindowsPathStrategy),
    }
}
