use super::run_blocking;
use async_trait::async_trait;
use shelf_core::{Directory, PathSegment, Result};
use shelf_fs::DirectoryEngine;
use std::path::PathBuf;
use tracing::warn;

/// Directory operations addressed by raw path strings.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Child directories of `path`. `None` uses the configured hidden-item default.
    async fn list_directories(
        &self,
        path: &str,
        include_hidden: Option<bool>,
    ) -> Result<Vec<Directory>>;

    /// Create `name` under `parent`.
    async fn create_directory(&self, parent: &str, name: &str) -> Result<Directory>;

    /// Copy `source` to `destination`; the result may live under a `- Copy` name.
    async fn copy_directory(
        &self,
        source: &str,
        destination: &str,
        override_existing: bool,
    ) -> Result<Directory>;

    /// Move `source` to `destination`, merging when it exists.
    async fn move_directory(
        &self,
        source: &str,
        destination: &str,
        override_existing: bool,
    ) -> Result<Directory>;

    /// Rename `path` within its parent.
    async fn rename_directory(&self, path: &str, new_name: &str) -> Result<Directory>;

    /// Delete `path` recursively.
    async fn delete_directory(&self, path: &str) -> Result<()>;

    /// Segments of the parent of `path`.
    async fn go_up(&self, path: &str) -> Result<Vec<PathSegment>>;

    /// Segments of `path`, root first.
    async fn parse(&self, path: &str) -> Result<Vec<PathSegment>>;

    /// The configured library roots, in configured order. A root that has
    /// gone missing is returned Inaccessible.
    async fn list_library_roots(&self) -> Result<Vec<Directory>>;
}

/// [`DirectoryService`] over the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalDirectoryService {
    engine: DirectoryEngine,
    include_hidden: bool,
    library_roots: Vec<PathBuf>,
}

impl LocalDirectoryService {
    /// Service over `engine`; `include_hidden` is the default for listings.
    pub fn new(engine: DirectoryEngine, include_hidden: bool) -> Self {
        Self {
            engine,
            include_hidden,
            library_roots: Vec::new(),
        }
    }

    /// Roots reported by [`DirectoryService::list_library_roots`].
    pub fn with_library_roots(mut self, library_roots: Vec<PathBuf>) -> Self {
        self.library_roots = library_roots;
        self
    }

    async fn with_engine<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&DirectoryEngine) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let engine = self.engine.clone();
        run_blocking(move || work(&engine)).await
    }
}

#[async_trait]
impl DirectoryService for LocalDirectoryService {
    async fn list_directories(
        &self,
        path: &str,
        include_hidden: Option<bool>,
    ) -> Result<Vec<Directory>> {
        let path = path.to_string();
        let include_hidden = include_hidden.unwrap_or(self.include_hidden);

        self.with_engine(move |engine| {
            let path = engine.strategy().directory(&path)?;
            let entries = engine.enumerate(&path, include_hidden)?;
            Ok(entries.into_iter().map(Directory::from).collect())
        })
        .await
    }

    async fn create_directory(&self, parent: &str, name: &str) -> Result<Directory> {
        let (parent, name) = (parent.to_string(), name.to_string());

        self.with_engine(move |engine| {
            let parent = engine.strategy().directory(&parent)?;
            let created = engine.create(&parent, &name)?;
            Ok(Directory::from(engine.entry(&created)))
        })
        .await
    }

    async fn copy_directory(
        &self,
        source: &str,
        destination: &str,
        override_existing: bool,
    ) -> Result<Directory> {
        let (source, destination) = (source.to_string(), destination.to_string());

        self.with_engine(move |engine| {
            let source = engine.strategy().directory(&source)?;
            let destination = engine.strategy().directory(&destination)?;
            let written = engine.copy(&source, &destination, override_existing)?;
            Ok(Directory::from(engine.entry(&written)))
        })
        .await
    }

    async fn move_directory(
        &self,
        source: &str,
        destination: &str,
        override_existing: bool,
    ) -> Result<Directory> {
        let (source, destination) = (source.to_string(), destination.to_string());

        self.with_engine(move |engine| {
            let source = engine.strategy().directory(&source)?;
            let destination = engine.strategy().directory(&destination)?;
            let moved = engine.move_to(&source, &destination, override_existing)?;
            Ok(Directory::from(engine.entry(&moved)))
        })
        .await
    }

    async fn rename_directory(&self, path: &str, new_name: &str) -> Result<Directory> {
        let (path, new_name) = (path.to_string(), new_name.to_string());

        self.with_engine(move |engine| {
            let path = engine.strategy().directory(&path)?;
            let renamed = engine.rename(&path, &new_name)?;
            Ok(Directory::from(engine.entry(&renamed)))
        })
        .await
    }

    async fn delete_directory(&self, path: &str) -> Result<()> {
        let path = path.to_string();

        self.with_engine(move |engine| {
            let path = engine.strategy().directory(&path)?;
            engine.delete(&path)
        })
        .await
    }

    async fn go_up(&self, path: &str) -> Result<Vec<PathSegment>> {
        // Pure string work; no blocking worker needed.
        let strategy = self.engine.strategy();
        let path = strategy.directory(path)?;
        strategy.go_up_one_level(&path)
    }

    async fn parse(&self, path: &str) -> Result<Vec<PathSegment>> {
        let strategy = self.engine.strategy();
        let path = strategy.directory(path)?;
        Ok(strategy.parse_path(&path))
    }

    async fn list_library_roots(&self) -> Result<Vec<Directory>> {
        let roots = self.library_roots.clone();

        self.with_engine(move |engine| {
            let mut directories = Vec::with_capacity(roots.len());
            for root in roots {
                let identity = match root.to_str().map(|raw| engine.strategy().directory(raw)) {
                    Some(Ok(identity)) => identity,
                    Some(Err(error)) => {
                        warn!(root = %root.display(), %error, "skipping invalid library root");
                        continue;
                    }
                    None => {
                        warn!(root = %root.display(), "skipping library root with a non UTF-8 path");
                        continue;
                    }
                };
                directories.push(Directory::from(engine.entry(&identity)));
            }
            Ok(directories)
        })
        .await
    }
}
