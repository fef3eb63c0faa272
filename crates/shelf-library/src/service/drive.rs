use super::run_blocking;
use async_trait::async_trait;
use shelf_core::{Drive, Result};
use shelf_fs::PathStrategy;
use std::fs;
use std::sync::Arc;
use tracing::warn;

/// Navigable roots of the host.
#[async_trait]
pub trait DriveService: Send + Sync {
    /// Every root, alphabetically. Roots whose metadata is unreadable are
    /// returned Inaccessible rather than dropped.
    async fn list_drives(&self) -> Result<Vec<Drive>>;
}

/// [`DriveService`] over the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalDriveService {
    strategy: Arc<dyn PathStrategy>,
}

impl LocalDriveService {
    /// Service reporting the roots `strategy` knows about.
    pub fn new(strategy: Arc<dyn PathStrategy>) -> Self {
        Self { strategy }
    }
}

#[async_trait]
impl DriveService for LocalDriveService {
    async fn list_drives(&self) -> Result<Vec<Drive>> {
        let strategy = Arc::clone(&self.strategy);

        run_blocking(move || {
            let drives = strategy
                .drive_roots()
                .into_iter()
                .map(|root| {
                    let readable = match fs::metadata(root.as_path()) {
                        Ok(_) => true,
                        Err(error) => {
                            warn!(root = %root, %error, "drive metadata unreadable");
                            false
                        }
                    };
                    Drive::new(root, readable)
                })
                .collect();
            Ok(drives)
        })
        .await
    }
}
