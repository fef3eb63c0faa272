//! Host platform families.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two filesystem models Shelf knows how to drive.
///
/// `Unix` is a single root with mode bits; `Windows` is lettered drives with ACLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Single-root, mode-bit permissions.
    Unix,
    /// Drive letters, ACL permissions.
    Windows,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub const fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// The canonical separator written into normalized paths.
    pub const fn separator(self) -> char {
        match self {
            Platform::Unix => '/',
            Platform::Windows => '\\',
        }
    }

    /// Whether `c` separates path segments on input.
    ///
    /// Windows accepts both slashes and rewrites `/` to `\`.
    pub fn is_separator(self, c: char) -> bool {
        match self {
            Platform::Unix => c == '/',
            Platform::Windows => c == '\\' || c == '/',
        }
    }

    /// Whether `c` may not appear inside a path segment.
    pub fn is_invalid_char(self, c: char) -> bool {
        match self {
            Platform::Unix => c == '\0',
            Platform::Windows => {
                (c as u32) < 0x20 || matches!(c, '<' | '>' | '"' | '|' | '?' | '*' | ':')
            }
        }
    }

    /// Every character rejected inside a path segment.
    pub fn invalid_path_chars(self) -> Vec<char> {
        match self {
            Platform::Unix => vec!['\0'],
            Platform::Windows => (0u8..0x20)
                .map(char::from)
                .chain(['<', '>', '"', '|', '?', '*', ':'])
                .collect(),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Unix => write!(f, "unix"),
            Platform::Windows => write!(f, "windows"),
        }
    }
}
