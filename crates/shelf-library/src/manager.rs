//! Composition root.

use crate::service::{
    DirectoryService, DriveService, FileService, LocalDirectoryService, LocalDriveService,
    LocalFileService,
};
use shelf_config::FileManagerSettings;
use shelf_core::{Platform, Result};
use shelf_fs::{for_platform, CopyOptions, DirectoryEngine, FileEngine, PathStrategy, PermissionGate};
use std::sync::Arc;
use tracing::info;

/// Owns the platform strategy and gate and hands out the services.
///
/// Built once at startup; nothing in it changes afterwards.
#[derive(Debug, Clone)]
pub struct FileManager {
    strategy: Arc<dyn PathStrategy>,
    gate: Arc<dyn PermissionGate>,
    directories: LocalDirectoryService,
    files: LocalFileService,
    drives: LocalDriveService,
}

impl FileManager {
    /// Build for the host platform.
    ///
    /// # Errors
    ///
    /// [`shelf_core::Error::PlatformMisconfigured`] on a host with no permission gate.
    pub fn new(settings: &FileManagerSettings) -> Result<Self> {
        let platform = Platform::current();
        let gate = host_gate(settings)?;
        info!(%platform, "file manager ready");
        Ok(Self::from_parts(for_platform(platform), gate, settings))
    }

    /// Build from explicit parts.
    ///
    /// The strategy and gate are shared by every service; `settings` supplies
    /// the listing default, copy options and library roots.
    pub fn from_parts(
        strategy: Arc<dyn PathStrategy>,
        gate: Arc<dyn PermissionGate>,
        settings: &FileManagerSettings,
    ) -> Self {
        let options = CopyOptions {
            preserve_timestamps: settings.preserve_timestamps,
        };
        let directory_engine =
            DirectoryEngine::new(Arc::clone(&strategy), Arc::clone(&gate)).with_options(options);
        let file_engine =
            FileEngine::new(Arc::clone(&strategy), Arc::clone(&gate)).with_options(options);

        Self {
            directories: LocalDirectoryService::new(directory_engine, settings.include_hidden)
                .with_library_roots(settings.library_roots.clone()),
            files: LocalFileService::new(file_engine, settings.include_hidden),
            drives: LocalDriveService::new(Arc::clone(&strategy)),
            strategy,
            gate,
        }
    }

    /// Platform the strategy models.
    pub fn platform(&self) -> Platform {
        self.strategy.platform()
    }

    /// The shared path strategy.
    pub fn strategy(&self) -> &Arc<dyn PathStrategy> {
        &self.strategy
    }

    /// The shared permission gate.
    pub fn gate(&self) -> &Arc<dyn PermissionGate> {
        &self.gate
    }

    /// Directory operations.
    pub fn directories(&self) -> &dyn DirectoryService {
        &self.directories
    }

    /// File operations.
    pub fn files(&self) -> &dyn FileService {
        &self.files
    }

    /// Drive listing.
    pub fn drives(&self) -> &dyn DriveService {
        &self.drives
    }
}

#[cfg(unix)]
fn host_gate(_settings: &FileManagerSettings) -> Result<Arc<dyn PermissionGate>> {
    Ok(Arc::new(shelf_fs::UnixPermissionGate::new()))
}

#[cfg(windows)]
fn host_gate(settings: &FileManagerSettings) -> Result<Arc<dyn PermissionGate>> {
    let gate = shelf_fs::WindowsPermissionGate::new(Arc::new(shelf_fs::NativeAclSource::new()))
        .with_live_probe(settings.acl_live_probe);
    Ok(Arc::new(gate))
}

#[cfg(not(any(unix, windows)))]
fn host_gate(_settings: &FileManagerSettings) -> Result<Arc<dyn PermissionGate>> {
    Err(shelf_core::Error::PlatformMisconfigured {
        reason: "no permission gate for this target".to_string(),
    })
}
