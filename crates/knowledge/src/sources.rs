//! Document sources.
//!
//! The engine reads and writes raw documents through [`DocumentSource`];
//! [`DirectorySource`] keeps them as flat files in one directory.

use crate::types::DocumentInfo;
use knowqa_core::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Storage for the raw documents the index is built from.
pub trait DocumentSource: Send + Sync {
    /// Extension of eligible documents, without the dot.
    fn extension(&self) -> &str;

    /// Whether `filename` may be stored in this source.
    fn is_eligible(&self, filename: &str) -> bool;

    /// Names of all eligible documents, in a stable order.
    fn list_eligible(&self) -> AppResult<Vec<String>>;

    fn read(&self, filename: &str) -> AppResult<Vec<u8>>;

    fn write(&self, filename: &str, bytes: &[u8]) -> AppResult<()>;

    fn remove(&self, filename: &str) -> AppResult<()>;

    fn exists(&self, filename: &str) -> bool;

    fn size(&self, filename: &str) -> AppResult<u64>;

    /// Eligible documents with their sizes.
    fn list_documents(&self) -> AppResult<Vec<DocumentInfo>> {
        self.list_eligible()?
            .into_iter()
            .map(|filename| {
                let size_bytes = self.size(&filename)?;
                Ok(DocumentInfo {
                    filename,
                    size_bytes,
                })
            })
            .collect()
    }
}

/// Reject names that are empty or would escape the source directory.
pub fn validate_filename(filename: &str) -> AppResult<()> {
    if filename.trim().is_empty() {
        return Err(AppError::Input("Invalid filename".to_string()));
    }

    let path = Path::new(filename);
    let is_plain = path.file_name().and_then(|n| n.to_str()) == Some(filename);
    if !is_plain || filename.starts_with('.') {
        return Err(AppError::Input(format!(
            "Invalid filename '{}': expected a plain file name",
            filename
        )));
    }

    Ok(())
}

/// Documents stored as files directly under one directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extension: String,
}

impl DirectorySource {
    /// `extension` is matched without the leading dot, e.g. `"txt"`.
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, filename: &str) -> AppResult<PathBuf> {
        validate_filename(filename)?;
        Ok(self.root.join(filename))
    }
}

impl DocumentSource for DirectorySource {
    fn extension(&self) -> &str {
        &self.extension
    }

    fn is_eligible(&self, filename: &str) -> bool {
        validate_filename(filename).is_ok()
            && Path::new(filename)
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == self.extension)
    }

    fn list_eligible(&self) -> AppResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                AppError::Storage(format!("Failed to list documents in {:?}: {}", self.root, e))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if self.is_eligible(name) {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    fn read(&self, filename: &str) -> AppResult<Vec<u8>> {
        let path = self.path_for(filename)?;
        fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                AppError::NotFound(format!("Document not found: {}", filename))
            }
            _ => AppError::Storage(format!("Failed to read {:?}: {}", path, e)),
        })
    }

    fn write(&self, filename: &str, bytes: &[u8]) -> AppResult<()> {
        let path = self.path_for(filename)?;
        fs::create_dir_all(&self.root).map_err(|e| {
            AppError::Storage(format!(
                "Failed to create uploads directory {:?}: {}",
                self.root, e
            ))
        })?;
        fs::write(&path, bytes)
            .map_err(|e| AppError::Storage(format!("Failed to write {:?}: {}", path, e)))?;

        tracing::debug!("Stored document {:?} ({} bytes)", path, bytes.len());
        Ok(())
    }

    fn remove(&self, filename: &str) -> AppResult<()> {
        let path = self.path_for(filename)?;
        fs::remove_file(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                AppError::NotFound(format!("Document not found: {}", filename))
            }
            _ => AppError::Storage(format!("Failed to delete {:?}: {}", path, e)),
        })
    }

    fn exists(&self, filename: &str) -> bool {
        self.path_for(filename)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    fn size(&self, filename: &str) -> AppResult<u64> {
        let path = self.path_for(filename)?;
        fs::metadata(&path)
            .map(|m| m.len())
            .map_err(|e| AppError::Storage(format!("Failed to stat {:?}: {}", path, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("notes.txt").is_ok());
        assert!(validate_filename("my notes.txt").is_ok());
        assert!(validate_filename("").is_err());
        assert!(validate_filename("   ").is_err());
        assert!(validate_filename("../secret.txt").is_err());
        assert!(validate_filename("dir/notes.txt").is_err());
        assert!(validate_filename(".hidden.txt").is_err());
    }

    #[test]
    fn test_list_eligible_is_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        let source = DirectorySource::new(temp.path(), "txt");

        fs::write(temp.path().join("b.txt"), "b").unwrap();
        fs::write(temp.path().join("a.txt"), "a").unwrap();
        fs::write(temp.path().join("image.png"), "x").unwrap();
        fs::write(temp.path().join("notes.TXT.bak"), "x").unwrap();
        fs::create_dir(temp.path().join("nested.txt")).unwrap();
        fs::write(temp.path().join("nested.txt").join("c.txt"), "c").unwrap();

        assert_eq!(source.list_eligible().unwrap(), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_missing_root_lists_nothing() {
        let temp = TempDir::new().unwrap();
        let source = DirectorySource::new(temp.path().join("uploads"), "txt");
        assert!(source.list_eligible().unwrap().is_empty());
        assert!(source.list_documents().unwrap().is_empty());
    }

    #[test]
    fn test_write_read_size_remove() {
        let temp = TempDir::new().unwrap();
        let source = DirectorySource::new(temp.path().join("uploads"), ".txt");

        source.write("doc.txt", b"hello world").unwrap();
        assert!(source.exists("doc.txt"));
        assert_eq!(source.read("doc.txt").unwrap(), b"hello world");
        assert_eq!(
            source.list_documents().unwrap(),
            vec![DocumentInfo {
                filename: "doc.txt".to_string(),
                size_bytes: 11
            }]
        );

        source.remove("doc.txt").unwrap();
        assert!(!source.exists("doc.txt"));
        assert!(matches!(
            source.remove("doc.txt"),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(source.read("doc.txt"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_is_eligible() {
        let source = DirectorySource::new("uploads", "txt");
        assert!(source.is_eligible("a.txt"));
        assert!(!source.is_eligible("a.md"));
        assert!(!source.is_eligible("txt"));
        assert!(!source.is_eligible("../a.txt"));
    }
}
