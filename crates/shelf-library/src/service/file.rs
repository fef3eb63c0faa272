use super::run_blocking;
use async_trait::async_trait;
use shelf_core::{File, Result};
use shelf_fs::FileEngine;

/// File operations addressed by raw path strings.
#[async_trait]
pub trait FileService: Send + Sync {
    /// Files directly inside `dir`. `None` uses the configured hidden-item default.
    async fn list_files(&self, dir: &str, include_hidden: Option<bool>) -> Result<Vec<File>>;

    /// Copy `file` into `destination_dir`.
    async fn copy_file(
        &self,
        file: &str,
        destination_dir: &str,
        override_existing: bool,
    ) -> Result<File>;

    /// Move `file` into `destination_dir`.
    async fn move_file(
        &self,
        file: &str,
        destination_dir: &str,
        override_existing: bool,
    ) -> Result<File>;

    /// Rename `file` within its directory.
    async fn rename_file(&self, file: &str, new_name: &str) -> Result<File>;

    /// Delete `file`.
    async fn delete_file(&self, file: &str) -> Result<()>;

    /// Read the whole of `file`, e.g. for thumbnailing.
    async fn read_file(&self, file: &str) -> Result<Vec<u8>>;
}

/// [`FileService`] over the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileService {
    engine: FileEngine,
    include_hidden: bool,
}

impl LocalFileService {
    /// Service over `engine`; `include_hidden` is the default for listings.
    pub fn new(engine: FileEngine, include_hidden: bool) -> Self {
        Self {
            engine,
            include_hidden,
        }
    }

    async fn with_engine<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&FileEngine) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let engine = self.engine.clone();
        run_blocking(move || work(&engine)).await
    }
}

#[async_trait]
impl FileService for LocalFileService {
    async fn list_files(&self, dir: &str, include_hidden: Option<bool>) -> Result<Vec<File>> {
        let dir = dir.to_string();
        let include_hidden = include_hidden.unwrap_or(self.include_hidden);

        self.with_engine(move |engine| {
            let dir = engine.strategy().directory(&dir)?;
            let entries = engine.list(&dir, include_hidden)?;
            Ok(entries.into_iter().map(File::from).collect())
        })
        .await
    }

    async fn copy_file(
        &self,
        file: &str,
        destination_dir: &str,
        override_existing: bool,
    ) -> Result<File> {
        let (file, destination_dir) = (file.to_string(), destination_dir.to_string());

        self.with_engine(move |engine| {
            let file = engine.strategy().file(&file)?;
            let destination_dir = engine.strategy().directory(&destination_dir)?;
            let copied = engine.copy(&file, &destination_dir, override_existing)?;
            Ok(File::from(engine.entry(&copied)))
        })
        .await
    }

    async fn move_file(
        &self,
        file: &str,
        destination_dir: &str,
        override_existing: bool,
    ) -> Result<File> {
        let (file, destination_dir) = (file.to_string(), destination_dir.to_string());

        self.with_engine(move |engine| {
            let file = engine.strategy().file(&file)?;
            let destination_dir = engine.strategy().directory(&destination_dir)?;
            let moved = engine.move_to(&file, &destination_dir, override_existing)?;
            Ok(File::from(engine.entry(&moved)))
        })
        .await
    }

    async fn rename_file(&self, file: &str, new_name: &str) -> Result<File> {
        let (file, new_name) = (file.to_string(), new_name.to_string());

        self.with_engine(move |engine| {
            let file = engine.strategy().file(&file)?;
            let renamed = engine.rename(&file, &new_name)?;
            Ok(File::from(engine.entry(&renamed)))
        })
        .await
    }

    async fn delete_file(&self, file: &str) -> Result<()> {
        let file = file.to_string();

        self.with_engine(move |engine| {
            let file = engine.strategy().file(&file)?;
            engine.delete(&file)
        })
        .await
    }

    async fn read_file(&self, file: &str) -> Result<Vec<u8>> {
        let file = file.to_string();

        self.with_engine(move |engine| {
            let file = engine.strategy().file(&file)?;
            engine.read(&file)
        })
        .await
    }
}
