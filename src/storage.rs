//! Upload persistence.
//!
//! Each upload is written once under the upload directory as
//! `<uuid>_<sanitized original name>` and kept indefinitely.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors saving or resolving uploads.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload not found: {0}")]
    NotFound(String),
}

/// Directory-backed store for uploaded images.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Open the store, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Save `content` and return the generated filename.
    pub async fn save(&self, original_name: &str, content: &[u8]) -> Result<String, StorageError> {
        let filename = format!(
            "{}_{}",
            uuid::Uuid::new_v4(),
            sanitize_filename(original_name)
        );
        tokio::fs::write(self.root.join(&filename), content).await?;
        debug!("saved upload {} ({} bytes)", filename, content.len());
        Ok(filename)
    }

    /// Resolve a generated filename to a path inside the store.
    ///
    /// Rejects anything that would escape the upload directory.
    pub fn resolve(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let not_found = || StorageError::NotFound(filename.to_string());

        // Generated names are always a single plain path component.
        let single_component = matches!(
            Path::new(filename).components().collect::<Vec<_>>().as_slice(),
            [Component::Normal(_)]
        );
        if !single_component || filename.contains('\\') {
            return Err(not_found());
        }

        let canonical_root = self.root.canonicalize()?;
        let canonical_file = canonical_root
            .join(filename)
            .canonicalize()
            .map_err(|_| not_found())?;

        if !canonical_file.starts_with(&canonical_root) || !canonical_file.is_file() {
            return Err(not_found());
        }
        Ok(canonical_file)
    }
}

/// Make an uploaded filename safe to store.
pub fn sanitize_filename(name: &str) -> String {
    // Browsers on Windows may send a full path.
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let sanitized: String = base
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' | ' ' | '#' | '%' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = sanitized.trim_matches(|c| c == '_' || c == '.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.chars().take(100).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("scan.png"), "scan.png");
        assert_eq!(sanitize_filename("my scan?.png"), "my_scan_.png");
        assert_eq!(sanitize_filename("C:\\Users\\me\\note.jpg"), "note.jpg");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(".."), "upload");
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename(&"a".repeat(300)).len(), 100);
        // Characters that would break the /uploads/ URL.
        assert_eq!(sanitize_filename("a#b%20c.png"), "a_b_20c.png");
    }

    #[tokio::test]
    async fn test_save_prefixes_uuid() {
        let dir = tempdir().unwrap();
        let store = UploadStore::open(dir.path().join("uploads")).unwrap();

        let name = store.save("receipt.png", b"data").await.unwrap();
        let (prefix, rest) = name.split_once('_').unwrap();
        assert!(uuid::Uuid::parse_str(prefix).is_ok());
        assert_eq!(rest, "receipt.png");

        let path = store.resolve(&name).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_same_name_does_not_collide() {
        let dir = tempdir().unwrap();
        let store = UploadStore::open(dir.path()).unwrap();
        let a = store.save("page.png", b"one").await.unwrap();
        let b = store.save("page.png", b"two").await.unwrap();
        assert_ne!(a, b);
        assert_eq!(std::fs::read(store.resolve(&a).unwrap()).unwrap(), b"one");
        assert_eq!(std::fs::read(store.resolve(&b).unwrap()).unwrap(), b"two");
    }

    #[test]
    fn test_resolve_rejects_traversal_and_missing() {
        let dir = tempdir().unwrap();
        let store = UploadStore::open(dir.path().join("uploads")).unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"x").unwrap();

        assert!(matches!(
            store.resolve("../secret.txt"),
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(store.resolve("missing.png"), Err(StorageError::NotFound(_))));
        assert!(matches!(store.resolve(""), Err(StorageError::NotFound(_))));
        assert!(matches!(store.resolve(".."), Err(StorageError::NotFound(_))));
        assert!(matches!(store.resolve("."), Err(StorageError::NotFound(_))));
        assert!(matches!(
            store.resolve("..\\secret.txt"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_inner_dots_are_served() {
        let dir = tempdir().unwrap();
        let store = UploadStore::open(dir.path().join("uploads")).unwrap();

        for original in ["report..v2.png", "a..b.png"] {
            let name = store.save(original, b"data").await.unwrap();
            assert!(name.ends_with(original));
            let path = store.resolve(&name).unwrap();
            assert_eq!(std::fs::read(path).unwrap(), b"data");
        }
    }
}
