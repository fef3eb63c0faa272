//! Property tests for path decomposition.

use proptest::prelude::*;
use shelf_core::Error;
use shelf_fs::{PathStrategy, UnixPathStrategy, WindowsPathStrategy};

fn segment() -> impl Strategy<Value = String> {
    r"[A-Za-z0-9_][A-Za-z0-9_ .-]{0,10}[A-Za-z0-9_]"
}

proptest! {
    #[test]
    fn unix_parse_then_combine_round_trips(
        parts in prop::collection::vec(segment(), 0..6),
        is_directory in any::<bool>(),
    ) {
        let strategy = UnixPathStrategy;
        let raw = format!("/{}", parts.join("/"));
        let path = if is_directory || parts.is_empty() {
            strategy.directory(&raw).unwrap()
        } else {
            strategy.file(&raw).unwrap()
        };

        let segments = strategy.parse_path(&path);
        prop_assert_eq!(strategy.combine_segments(&segments).unwrap(), path);
    }

    #[test]
    fn windows_parse_then_combine_round_trips(
        drive in "[a-zA-Z]",
        parts in prop::collection::vec(segment(), 0..6),
        is_directory in any::<bool>(),
    ) {
        let strategy = WindowsPathStrategy;
        // Mixed separators normalize to backslashes.
        let raw = format!("{drive}:/{}", parts.join("\\"));
        let path = if is_directory || parts.is_empty() {
            strategy.directory(&raw).unwrap()
        } else {
            strategy.file(&raw).unwrap()
        };

        let segments = strategy.parse_path(&path);
        prop_assert!(segments[0].is_drive_root);
        prop_assert_eq!(strategy.combine_segments(&segments).unwrap(), path);
    }

    #[test]
    fn go_up_drops_exactly_one_segment(parts in prop::collection::vec(segment(), 0..6)) {
        let strategy = UnixPathStrategy;
        let path = strategy.directory(&format!("/{}", parts.join("/"))).unwrap();

        match strategy.go_up_one_level(&path) {
            Ok(parent) => {
                prop_assert!(!path.is_root());
                prop_assert_eq!(parent.len(), strategy.parse_path(&path).len() - 1);
            }
            Err(Error::CannotNavigateUp { .. }) => prop_assert!(path.is_root()),
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }

    #[test]
    fn combine_path_appends_one_segment(name in segment()) {
        let strategy = WindowsPathStrategy;
        let base = strategy.directory("C:\\Library").unwrap();
        let child = strategy.combine_path(&base, &name, false).unwrap();

        prop_assert_eq!(child.file_name(), Some(name.as_str()));
        prop_assert_eq!(strategy.parent(&child).unwrap(), base);
    }
}
