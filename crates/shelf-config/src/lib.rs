pub mod manager;
pub mod security;
pub mod types;

pub use manager::{ConfigError, ConfigManager};
pub use security::{validate_library_root, validate_log_filter, SecurityError};
pub use types::{FileManagerSettings, ShelfConfig};
