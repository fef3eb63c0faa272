//! ACL permission checks for drive-letter platforms.
//!
//! The evaluation itself is plain data processing over [`AccessRule`]s; where
//! the rules come from is abstracted by [`AclSource`]. On Windows hosts that is
//! [`NativeAclSource`](super::NativeAclSource), which reads the DACL and the
//! process token.

use super::PermissionGate;
use shelf_core::{AccessMode, Error, Result};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

/// File system rights masks, as stored in access control entries.
pub mod rights {
    /// Read file data.
    pub const READ_DATA: u32 = 0x0001;
    /// List a directory (same bit as `READ_DATA`).
    pub const LIST_DIRECTORY: u32 = 0x0001;
    /// Write file data / create files in a directory.
    pub const WRITE_DATA: u32 = 0x0002;
    /// Append data / create subdirectories.
    pub const APPEND_DATA: u32 = 0x0004;
    /// Read extended attributes.
    pub const READ_EXTENDED_ATTRIBUTES: u32 = 0x0008;
    /// Write extended attributes.
    pub const WRITE_EXTENDED_ATTRIBUTES: u32 = 0x0010;
    /// Execute a file / traverse a directory.
    pub const EXECUTE: u32 = 0x0020;
    /// Delete children of a directory.
    pub const DELETE_SUBDIRECTORIES_AND_FILES: u32 = 0x0040;
    /// Read basic attributes.
    pub const READ_ATTRIBUTES: u32 = 0x0080;
    /// Write basic attributes.
    pub const WRITE_ATTRIBUTES: u32 = 0x0100;
    /// Delete the object.
    pub const DELETE: u32 = 0x0001_0000;
    /// Read the security descriptor.
    pub const READ_PERMISSIONS: u32 = 0x0002_0000;
    /// Synchronize.
    pub const SYNCHRONIZE: u32 = 0x0010_0000;

    /// Read, write, execute and delete (`0x301BF`).
    pub const MODIFY: u32 = READ_DATA
        | WRITE_DATA
        | APPEND_DATA
        | READ_EXTENDED_ATTRIBUTES
        | WRITE_EXTENDED_ATTRIBUTES
        | EXECUTE
        | READ_ATTRIBUTES
        | WRITE_ATTRIBUTES
        | DELETE
        | READ_PERMISSIONS;
}

/// Whether an access rule grants or refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Grants the rights in the mask.
    Allow,
    /// Refuses the rights in the mask.
    Deny,
}

/// One access control entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    /// Security identifier the rule applies to (e.g. `S-1-5-32-545`).
    pub identity: String,
    /// Allow or deny.
    pub kind: RuleKind,
    /// Rights mask.
    pub rights: u32,
}

impl AccessRule {
    /// An allow rule.
    pub fn allow(identity: impl Into<String>, rights: u32) -> Self {
        Self {
            identity: identity.into(),
            kind: RuleKind::Allow,
            rights,
        }
    }

    /// A deny rule.
    pub fn deny(identity: impl Into<String>, rights: u32) -> Self {
        Self {
            identity: identity.into(),
            kind: RuleKind::Deny,
            rights,
        }
    }
}

/// The account asking, with every group it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// The account's own identifier.
    pub identity: String,
    /// Identifiers of the groups the account is a member of.
    pub groups: Vec<String>,
}

impl Principal {
    /// Whether a rule for `identity` applies to this principal.
    pub fn matches(&self, identity: &str) -> bool {
        self.identity == identity || self.groups.iter().any(|group| group == identity)
    }
}

/// Where access rules and the current principal come from.
pub trait AclSource: Send + Sync + fmt::Debug {
    /// The principal the process runs as.
    fn current_principal(&self) -> io::Result<Principal>;

    /// Access rules attached to `path`, in evaluation order.
    fn rules_for(&self, path: &Path) -> io::Result<Vec<AccessRule>>;
}

/// Evaluate `rules` for `principal` asking for `right`.
///
/// A matching deny rule that touches any bit of `right` refuses immediately.
/// Matching allow rules that cover all of `right` grant, unless a deny fires.
pub fn evaluate_rules(rules: &[AccessRule], principal: &Principal, right: u32) -> bool {
    let mut granted = false;

    for rule in rules.iter().filter(|rule| principal.matches(&rule.identity)) {
        match rule.kind {
            RuleKind::Deny if rule.rights & right != 0 => return false,
            RuleKind::Allow if rule.rights & right == right => granted = true,
            _ => {}
        }
    }

    granted
}

/// Permission gate that evaluates ACLs, then confirms reads with a live probe.
#[derive(Debug, Clone)]
pub struct WindowsPermissionGate {
    source: Arc<dyn AclSource>,
    live_probe: bool,
}

impl WindowsPermissionGate {
    /// Create a gate over `source` with live probing enabled.
    pub fn new(source: Arc<dyn AclSource>) -> Self {
        Self {
            source,
            live_probe: true,
        }
    }

    /// Enable or disable the live probe that follows a positive read check.
    pub fn with_live_probe(mut self, live_probe: bool) -> Self {
        self.live_probe = live_probe;
        self
    }

    fn rules_allow(&self, target: &Path, principal: &Principal, right: u32) -> bool {
        // Some protected paths refuse even reading their ACL.
        match self.source.rules_for(target) {
            Ok(rules) => evaluate_rules(&rules, principal, right),
            Err(error) => {
                debug!(path = %target.display(), %error, "ACL unreadable, treating as no access");
                false
            }
        }
    }
}

impl PermissionGate for WindowsPermissionGate {
    fn can_access_path(&self, path: &Path, mode: AccessMode, is_file: bool) -> Result<bool> {
        let principal =
            self.source
                .current_principal()
                .map_err(|error| Error::PlatformMisconfigured {
                    reason: format!("cannot resolve current principal: {error}"),
                })?;

        let (target, right) = match mode {
            AccessMode::ReadProperties => (path, rights::READ_ATTRIBUTES),
            AccessMode::ReadContents => (path, rights::READ_DATA),
            AccessMode::Write => (path, rights::WRITE_DATA),
            AccessMode::Execute => (path, rights::EXECUTE),
            AccessMode::ListDirectory => (path, rights::LIST_DIRECTORY),
            // Deletion is decided by the parent directory.
            AccessMode::Delete => match parent_of(path) {
                Some(parent) => (parent, rights::MODIFY),
                None => return Ok(false),
            },
        };

        if !self.rules_allow(target, &principal, right) {
            trace!(path = %path.display(), %mode, "ACL check refused");
            return Ok(false);
        }

        if self.live_probe {
            match mode {
                AccessMode::ReadProperties => return Ok(probe_properties(path)),
                AccessMode::ReadContents => return Ok(probe_contents(path, is_file)),
                _ => {}
            }
        }

        Ok(true)
    }
}

fn parent_of(path: &Path) -> Option<&Path> {
    path.parent().filter(|parent| !parent.as_os_str().is_empty())
}

/// Catch accounts the ACL admits but the OS still refuses.
fn probe_properties(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}

/// Open and immediately close the target; the handle never outlives the call.
fn probe_contents(path: &Path, is_file: bool) -> bool {
    if is_file {
        fs::File::open(path).is_ok()
    } else {
        fs::read_dir(path).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const USER: &str = "S-1-5-21-1000";
    const USERS_GROUP: &str = "S-1-5-32-545";
    const OTHER: &str = "S-1-5-21-2000";

    #[derive(Debug, Default)]
    struct TableAclSource {
        principal: Option<Principal>,
        rules: HashMap<PathBuf, Vec<AccessRule>>,
    }

    impl TableAclSource {
        fn for_user() -> Self {
            Self {
                principal: Some(Principal {
                    identity: USER.to_string(),
                    groups: vec![USERS_GROUP.to_string()],
                }),
                rules: HashMap::new(),
            }
        }

        fn with_rules(mut self, path: &Path, rules: Vec<AccessRule>) -> Self {
            self.rules.insert(path.to_path_buf(), rules);
            self
        }
    }

    impl AclSource for TableAclSource {
        fn current_principal(&self) -> io::Result<Principal> {
            self.principal
                .clone()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no token"))
        }

        fn rules_for(&self, path: &Path) -> io::Result<Vec<AccessRule>> {
            self.rules
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::PermissionDenied, "ACL denied"))
        }
    }

    fn principal() -> Principal {
        Principal {
            identity: USER.to_string(),
            groups: vec![USERS_GROUP.to_string()],
        }
    }

    #[test]
    fn test_deny_overrides_allow() {
        let rules = vec![
            AccessRule::allow(USER, rights::MODIFY),
            AccessRule::deny(USERS_GROUP, rights::WRITE_DATA),
        ];
        assert!(!evaluate_rules(&rules, &principal(), rights::WRITE_DATA));
        assert!(evaluate_rules(&rules, &principal(), rights::READ_DATA));
    }

    #[test]
    fn test_deny_overlapping_part_of_right_refuses() {
        let rules = vec![
            AccessRule::allow(USER, rights::MODIFY),
            AccessRule::deny(USER, rights::DELETE),
        ];
        assert!(!evaluate_rules(&rules, &principal(), rights::MODIFY));
    }

    #[test]
    fn test_allow_must_cover_whole_right() {
        let rules = vec![AccessRule::allow(USER, rights::READ_DATA | rights::WRITE_DATA)];
        assert!(!evaluate_rules(&rules, &principal(), rights::MODIFY));
        assert!(evaluate_rules(&rules, &principal(), rights::WRITE_DATA));
    }

    #[test]
    fn test_rules_for_other_identities_ignored() {
        let rules = vec![
            AccessRule::deny(OTHER, rights::READ_DATA),
            AccessRule::allow(USERS_GROUP, rights::READ_DATA),
        ];
        assert!(evaluate_rules(&rules, &principal(), rights::READ_DATA));
    }

    #[test]
    fn test_no_matching_rule_means_no_access() {
        let rules = vec![AccessRule::allow(OTHER, rights::MODIFY)];
        assert!(!evaluate_rules(&rules, &principal(), rights::READ_DATA));
        assert!(!evaluate_rules(&[], &principal(), rights::READ_DATA));
    }

    #[test]
    fn test_delete_checks_modify_on_parent() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("dune.epub");

        // Full rights on the file itself, but only read on the parent.
        let source = TableAclSource::for_user()
            .with_rules(&file, vec![AccessRule::allow(USER, rights::MODIFY)])
            .with_rules(
                temp_dir.path(),
                vec![AccessRule::allow(USER, rights::READ_DATA)],
            );
        let gate = WindowsPermissionGate::new(Arc::new(source));

        assert!(!gate.can_access_path(&file, AccessMode::Delete, true).unwrap());
        assert!(gate.can_access_path(&file, AccessMode::Write, true).unwrap());
    }

    #[test]
    fn test_unreadable_acl_is_no_access() {
        let temp_dir = TempDir::new().unwrap();
        let gate = WindowsPermissionGate::new(Arc::new(TableAclSource::for_user()));

        assert!(!gate
            .can_access_path(temp_dir.path(), AccessMode::ListDirectory, false)
            .unwrap());
    }

    #[test]
    fn test_unknown_principal_is_misconfiguration() {
        let gate = WindowsPermissionGate::new(Arc::new(TableAclSource::default()));
        let result = gate.can_access_path(Path::new("C:\\"), AccessMode::Write, false);
        assert!(matches!(result, Err(Error::PlatformMisconfigured { .. })));
    }

    #[test]
    fn test_live_probe_catches_missing_target() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("gone.epub");
        let source = TableAclSource::for_user()
            .with_rules(&missing, vec![AccessRule::allow(USER, rights::MODIFY)]);
        let source = Arc::new(source);

        let probing = WindowsPermissionGate::new(source.clone());
        assert!(!probing
            .can_access_path(&missing, AccessMode::ReadContents, true)
            .unwrap());
        assert!(!probing
            .can_access_path(&missing, AccessMode::ReadProperties, true)
            .unwrap());

        let declarative = WindowsPermissionGate::new(source).with_live_probe(false);
        assert!(declarative
            .can_access_path(&missing, AccessMode::ReadContents, true)
            .unwrap());
    }

    #[test]
    fn test_live_probe_passes_for_readable_directory() {
        let temp_dir = TempDir::new().unwrap();
        let source = TableAclSource::for_user().with_rules(
            temp_dir.path(),
            vec![AccessRule::allow(USERS_GROUP, rights::MODIFY)],
        );
        let gate = WindowsPermissionGate::new(Arc::new(source));

        assert!(gate
            .can_access_path(temp_dir.path(), AccessMode::ReadContents, false)
            .unwrap());
        assert!(gate
            .can_access_path(temp_dir.path(), AccessMode::ReadProperties, false)
            .unwrap());
    }
}
