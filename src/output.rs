//! Output sinks for rendered pages.
//!
//! The page writer hands every finished page to an [`OutputWriter`]. Paths
//! are relative to the writer's root and use `/` as separator.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Destination for rendered text and copied resources.
pub trait OutputWriter: Send + Sync {
    /// Write `text` to `path` followed by `extension` (which may be empty).
    fn write(&self, path: &str, text: &str, extension: &str) -> Result<()>;

    /// Copy the resource at `from` to `to`.
    fn write_resources(&self, from: &str, to: &str) -> Result<()>;
}

/// Writes pages below a directory on disk.
#[derive(Debug, Clone)]
pub struct FileSystemWriter {
    root: PathBuf,
}

impl FileSystemWriter {
    /// Create a writer rooted at `root`. The directory is created on demand.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Output root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn target(&self, path: &str, extension: &str) -> PathBuf {
        self.root.join(format!("{}{}", path, extension))
    }
}

impl OutputWriter for FileSystemWriter {
    fn write(&self, path: &str, text: &str, extension: &str) -> Result<()> {
        let target = self.target(path, extension);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, text)?;
        log::debug!("wrote {}", target.display());
        Ok(())
    }

    fn write_resources(&self, from: &str, to: &str) -> Result<()> {
        copy_recursively(Path::new(from), &self.target(to, ""))
    }
}

/// Copy a file, or a directory with everything below it.
pub fn copy_recursively(from: &Path, to: &Path) -> Result<()> {
    if from.is_dir() {
        fs::create_dir_all(to)?;
        for entry in fs::read_dir(from)? {
            let entry = entry?;
            copy_recursively(&entry.path(), &to.join(entry.file_name()))?;
        }
        return Ok(());
    }
    if !from.exists() {
        return Err(Error::Other(format!(
            "Resource not found: {}",
            from.display()
        )));
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)?;
    Ok(())
}

/// Collects output in memory. Useful for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    files: Mutex<BTreeMap<String, String>>,
    resources: Mutex<BTreeMap<String, String>>,
}

impl MemoryWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Written files keyed by path with extension.
    pub fn files(&self) -> BTreeMap<String, String> {
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Text written to `path`, if any.
    pub fn get(&self, path: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
    }

    /// Resource copies requested, keyed by destination.
    pub fn resources(&self) -> BTreeMap<String, String> {
        self.resources
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl OutputWriter for MemoryWriter {
    fn write(&self, path: &str, text: &str, extension: &str) -> Result<()> {
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(format!("{}{}", path, extension), text.to_string());
        Ok(())
    }

    fn write_resources(&self, from: &str, to: &str) -> Result<()> {
        self.resources
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(to.to_string(), from.to_string());
        Ok(())
    }
}

/// Tokio-backed writer for async callers.
#[cfg(feature = "async")]
#[derive(Debug, Clone)]
pub struct AsyncFileSystemWriter {
    root: PathBuf,
}

#[cfg(feature = "async")]
impl AsyncFileSystemWriter {
    /// Create a writer rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write `text` to `path` followed by `extension`.
    pub async fn write(&self, path: &str, text: &str, extension: &str) -> Result<()> {
        let target = self.root.join(format!("{}{}", path, extension));
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, text).await?;
        Ok(())
    }

    /// Copy the resource at `from` to `to`.
    pub async fn write_resources(&self, from: &str, to: &str) -> Result<()> {
        let from = PathBuf::from(from);
        let to = self.root.join(to);
        tokio::task::spawn_blocking(move || copy_recursively(&from, &to))
            .await
            .map_err(|e| Error::Other(format!("Resource copy task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_system_writer_creates_directories() {
        let dir = TempDir::new().unwrap();
        let writer = FileSystemWriter::new(dir.path());

        writer.write("libui/-window/show", "# show", ".md").unwrap();
        writer.write("package-list", "$format:gfm", "").unwrap();

        let show = fs::read_to_string(dir.path().join("libui/-window/show.md")).unwrap();
        assert_eq!(show, "# show");
        assert!(dir.path().join("package-list").is_file());
    }

    #[test]
    fn test_copy_directory_resource() {
        let src = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("nested")).unwrap();
        fs::write(src.path().join("logo.svg"), "<svg/>").unwrap();
        fs::write(src.path().join("nested/style.css"), "body {}").unwrap();

        let out = TempDir::new().unwrap();
        let writer = FileSystemWriter::new(out.path());
        writer
            .write_resources(src.path().to_str().unwrap(), "images")
            .unwrap();

        assert!(out.path().join("images/logo.svg").is_file());
        assert!(out.path().join("images/nested/style.css").is_file());
    }

    #[test]
    fn test_missing_resource_is_error() {
        let out = TempDir::new().unwrap();
        let writer = FileSystemWriter::new(out.path());
        let missing = out.path().join("does-not-exist");
        let result = writer.write_resources(missing.to_str().unwrap(), "x");
        assert!(matches!(result, Err(Error::Other(_))));
    }

    #[test]
    fn test_memory_writer() {
        let writer = MemoryWriter::new();
        writer.write("a/b", "text", ".md").unwrap();
        writer.write_resources("static/img", "images").unwrap();

        assert_eq!(writer.get("a/b.md").as_deref(), Some("text"));
        assert_eq!(writer.files().len(), 1);
        assert_eq!(
            writer.resources().get("images").map(String::as_str),
            Some("static/img")
        );
    }
}
