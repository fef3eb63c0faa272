use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for Shelf
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShelfConfig {
    /// Schema version for migrations
    pub version: String,

    /// File manager settings
    #[serde(default)]
    pub settings: FileManagerSettings,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            settings: FileManagerSettings::default(),
        }
    }
}

/// Settings applied by the file manager
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileManagerSettings {
    /// List hidden directories and files by default
    #[serde(default)]
    pub include_hidden: bool,

    /// Carry access/modified times over on copy
    #[serde(default = "default_true")]
    pub preserve_timestamps: bool,

    /// Confirm positive ACL answers by touching the item (drive-letter platforms)
    #[serde(default = "default_true")]
    pub acl_live_probe: bool,

    /// Tracing filter used when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Canonical directories the media library is browsed from
    #[serde(default)]
    pub library_roots: Vec<PathBuf>,
}

impl Default for FileManagerSettings {
    fn default() -> Self {
        Self {
            include_hidden: false,
            preserve_timestamps: default_true(),
            acl_live_probe: default_true(),
            log_filter: default_log_filter(),
            library_roots: Vec::new(),
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_log_filter() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let mut config = ShelfConfig::default();
        config.settings.include_hidden = true;
        config.settings.library_roots = vec![PathBuf::from("/srv/media")];

        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: ShelfConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_default_config() {
        let config = ShelfConfig::default();
        assert_eq!(config.version, "1.0");
        assert!(!config.settings.include_hidden);
        assert!(config.settings.preserve_timestamps);
        assert!(config.settings.acl_live_probe);
        assert_eq!(config.settings.log_filter, "info");
        assert!(config.settings.library_roots.is_empty());
    }

    #[test]
    fn test_missing_settings_use_defaults() {
        let config: ShelfConfig = toml::from_str(
            r#"
            version = "1.0"

            [settings]
            preserve_timestamps = false
            "#,
        )
        .unwrap();

        assert!(!config.settings.preserve_timestamps);
        assert!(config.settings.acl_live_probe);
        assert_eq!(config.settings.log_filter, "info");

        let bare: ShelfConfig = toml::from_str(r#"version = "1.0""#).unwrap();
        assert_eq!(bare.settings, FileManagerSettings::default());
    }
}
