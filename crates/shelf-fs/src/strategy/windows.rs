//! Drive-letter path rules.

use super::PathStrategy;
use shelf_core::{PathIdentity, Platform};
use std::fs;
use std::path::Path;

#[cfg(windows)]
const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

/// Paths under lettered drive roots (`C:\`); hidden is a file attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsPathStrategy;

impl PathStrategy for WindowsPathStrategy {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    #[cfg(windows)]
    fn is_hidden(&self, _path: &Path, metadata: Option<&fs::Metadata>) -> bool {
        use std::os::windows::fs::MetadataExt;
        metadata.is_some_and(|meta| meta.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
    }

    #[cfg(not(windows))]
    fn is_hidden(&self, _path: &Path, _metadata: Option<&fs::Metadata>) -> bool {
        false
    }

    fn drive_roots(&self) -> Vec<PathIdentity> {
        ('A'..='Z')
            .map(|letter| format!("{letter}:\\"))
            .filter(|root| Path::new(root).is_dir())
            .filter_map(|root| PathIdentity::directory(&root, Platform::Windows).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_roots_are_sorted_roots() {
        let roots = WindowsPathStrategy.drive_roots();
        assert!(roots.iter().all(PathIdentity::is_root));
        assert!(roots.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_no_attributes_means_visible() {
        assert!(!WindowsPathStrategy.is_hidden(Path::new("C:\\.cache"), None));
    }
}
