use crate::security::{
    set_config_permissions, validate_library_root, validate_log_filter, SecurityError,
};
use crate::types::ShelfConfig;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors that can occur during config management
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Security error: {0}")]
    Security(#[from] SecurityError),

    #[error("Config file not found at {0}")]
    ConfigNotFound(PathBuf),

    #[error("Library root not configured: {0}")]
    RootNotFound(PathBuf),

    #[error("Library root already configured: {0}")]
    RootExists(PathBuf),

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Manager for Shelf configuration
///
/// Manages the file manager configuration stored in ~/.shelf/config.toml.
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
    config: ShelfConfig,
}

impl ConfigManager {
    /// Get the default config path (~/.shelf/config.toml)
    #[cfg(feature = "native-fs")]
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".shelf").join("config.toml"))
    }

    /// Load config from default location
    #[cfg(feature = "native-fs")]
    pub async fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path).await
    }

    /// Load config from default location, creating it on first run
    #[cfg(feature = "native-fs")]
    pub async fn load_or_init() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        match Self::load_from(&config_path).await {
            Err(ConfigError::ConfigNotFound(_)) => Self::init_at(&config_path).await,
            result => result,
        }
    }

    /// Load config from specific path (useful for testing)
    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !fs::try_exists(path).await? {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).await?;
        let config: ShelfConfig = toml::from_str(&contents)?;
        validate_log_filter(&config.settings.log_filter)?;

        Ok(Self {
            config_path: path.to_path_buf(),
            config,
        })
    }

    /// Initialize a new config file
    #[cfg(feature = "native-fs")]
    pub async fn init() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::init_at(&config_path).await
    }

    /// Initialize config at specific path
    pub async fn init_at(path: &Path) -> Result<Self, ConfigError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let manager = Self {
            config_path: path.to_path_buf(),
            config: ShelfConfig::default(),
        };
        manager.save().await?;

        Ok(manager)
    }

    /// Save config to disk atomically
    ///
    /// Uses a temporary file and atomic rename to prevent corruption
    pub async fn save(&self) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(&self.config)?;

        // Write to temporary file first
        let temp_path = self.config_path.with_extension("toml.tmp");
        fs::write(&temp_path, &toml_str).await?;

        // Set permissions on temp file (sync operation, uses std::fs)
        set_config_permissions(&temp_path)?;

        // Atomic rename
        fs::rename(&temp_path, &self.config_path).await?;

        Ok(())
    }

    /// Path this manager reads and writes
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get reference to config
    pub fn config(&self) -> &ShelfConfig {
        &self.config
    }

    /// Get mutable reference to config (caller must call save())
    pub fn config_mut(&mut self) -> &mut ShelfConfig {
        &mut self.config
    }

    /// Add a library root, stored canonicalized
    pub async fn add_library_root(&mut self, path: &Path) -> Result<PathBuf, ConfigError> {
        let canonical = validate_library_root(path)?;

        if self.config.settings.library_roots.contains(&canonical) {
            return Err(ConfigError::RootExists(canonical));
        }

        self.config.settings.library_roots.push(canonical.clone());
        self.save().await?;

        Ok(canonical)
    }

    /// Remove a library root
    pub async fn remove_library_root(&mut self, path: &Path) -> Result<(), ConfigError> {
        let roots = &mut self.config.settings.library_roots;
        let index = roots
            .iter()
            .position(|root| root == path)
            .ok_or_else(|| ConfigError::RootNotFound(path.to_path_buf()))?;

        roots.remove(index);
        self.save().await?;

        Ok(())
    }

    /// Change the fallback tracing filter
    pub async fn set_log_filter(&mut self, filter: &str) -> Result<(), ConfigError> {
        validate_log_filter(filter)?;

        self.config.settings.log_filter = filter.to_string();
        self.save().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let manager = ConfigManager::init_at(&config_path).await.unwrap();
        (manager, temp_dir)
    }

    #[tokio::test]
    async fn test_init_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        // Init
        let manager = ConfigManager::init_at(&config_path).await.unwrap();
        assert_eq!(manager.config.version, "1.0");
        assert!(config_path.exists());
        assert!(!config_path.with_extension("toml.tmp").exists());

        // Load
        let loaded = ConfigManager::load_from(&config_path).await.unwrap();
        assert_eq!(loaded.config, ShelfConfig::default());
    }

    #[tokio::test]
    async fn test_load_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConfigManager::load_from(&temp_dir.path().join("config.toml")).await;
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "version = ").unwrap();

        let result = ConfigManager::load_from(&config_path).await;
        assert!(matches!(result, Err(ConfigError::TomlDe(_))));
    }

    #[tokio::test]
    async fn test_add_and_remove_library_root() {
        let (mut manager, temp_dir) = create_test_manager().await;
        let media = temp_dir.path().join("media");
        std::fs::create_dir(&media).unwrap();

        let canonical = manager.add_library_root(&media).await.unwrap();
        assert_eq!(manager.config.settings.library_roots, vec![canonical.clone()]);

        // Should persist
        let loaded = ConfigManager::load_from(manager.path()).await.unwrap();
        assert_eq!(loaded.config.settings.library_roots.len(), 1);

        let duplicate = manager.add_library_root(&media).await;
        assert!(matches!(duplicate, Err(ConfigError::RootExists(_))));

        manager.remove_library_root(&canonical).await.unwrap();
        assert!(manager.config.settings.library_roots.is_empty());

        let missing = manager.remove_library_root(&canonical).await;
        assert!(matches!(missing, Err(ConfigError::RootNotFound(_))));
    }

    #[tokio::test]
    async fn test_add_missing_library_root() {
        let (mut manager, temp_dir) = create_test_manager().await;
        let result = manager
            .add_library_root(&temp_dir.path().join("missing"))
            .await;
        assert!(matches!(
            result,
            Err(ConfigError::Security(SecurityError::PathDoesNotExist(_)))
        ));
    }

    #[tokio::test]
    async fn test_set_log_filter() {
        let (mut manager, _temp_dir) = create_test_manager().await;

        manager.set_log_filter("shelf_fs=debug").await.unwrap();
        let loaded = ConfigManager::load_from(manager.path()).await.unwrap();
        assert_eq!(loaded.config.settings.log_filter, "shelf_fs=debug");

        assert!(manager.set_log_filter("").await.is_err());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_saved_config_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let (manager, _temp_dir) = create_test_manager().await;
        let mode = std::fs::metadata(manager.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
