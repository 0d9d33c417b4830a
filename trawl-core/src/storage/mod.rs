//! Typed content store and directory listings.
//!
//! Transferred files are organized under fixed subdirectories by content
//! kind. Listing is a directory scan; the filesystem itself is the only
//! catalog of stored content.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::content::ContentKind;

/// Errors that can occur during content store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid file name: {name}")]
    InvalidFileName { name: String },
}

/// Descriptor for one stored file, as returned by listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub kind: ContentKind,
}

/// Content store rooted at a single directory with per-kind subdirectories.
///
/// `videos` and `images` hold their respective kinds; everything else goes
/// under `files`. Subdirectories are created lazily on first placement.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    /// Creates a store rooted at the given directory.
    ///
    /// The root itself is not created until a file is placed.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the subdirectory name a kind maps to.
    ///
    /// Any kind other than video or image defaults to `files`.
    pub fn subdirectory(kind: ContentKind) -> &'static str {
        match kind {
            ContentKind::Video => "videos",
            ContentKind::Image => "images",
            ContentKind::File => "files",
        }
    }

    /// Resolves the destination path for a file of the given kind, creating
    /// the kind's subdirectory if absent.
    ///
    /// # Errors
    /// - `StorageError::InvalidFileName` - Name is empty after sanitizing
    /// - `StorageError::Io` - Subdirectory could not be created
    pub fn prepare_target(
        &self,
        file_name: &str,
        kind: ContentKind,
    ) -> Result<PathBuf, StorageError> {
        let name = sanitize_file_name(file_name);
        if name.is_empty() {
            return Err(StorageError::InvalidFileName {
                name: file_name.to_string(),
            });
        }

        let dir = self.root.join(Self::subdirectory(kind));
        fs::create_dir_all(&dir)?;
        Ok(dir.join(name))
    }

    /// Lists all stored files across the typed subdirectories.
    ///
    /// Missing subdirectories are treated as empty rather than as errors.
    ///
    /// # Errors
    /// - `StorageError::Io` - A subdirectory existed but could not be read
    pub fn list(&self) -> Result<Vec<StoredFile>, StorageError> {
        let mut files = Vec::new();

        for kind in ContentKind::ALL {
            let dir = self.root.join(Self::subdirectory(kind));
            if !dir.is_dir() {
                continue;
            }

            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                let metadata = entry.metadata()?;
                if !metadata.is_file() {
                    continue;
                }

                files.push(StoredFile {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    path: entry.path(),
                    size_bytes: metadata.len(),
                    kind,
                });
            }
        }

        Ok(files)
    }
}

/// Scans a flat directory (the download area), inferring each file's kind
/// from its extension.
///
/// A missing directory lists as empty; downloads that have not happened yet
/// should not fail the listing.
///
/// # Errors
/// - `StorageError::Io` - The directory existed but could not be read
pub fn scan_directory(dir: &Path) -> Result<Vec<StoredFile>, StorageError> {
    let mut files = Vec::new();

    if !dir.is_dir() {
        return Ok(files);
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }

        let path = entry.path();
        files.push(StoredFile {
            name: entry.file_name().to_string_lossy().into_owned(),
            kind: infer_kind(&path),
            size_bytes: metadata.len(),
            path,
        });
    }

    Ok(files)
}

/// Infers a content kind from a file's extension via its MIME type.
pub fn infer_kind(path: &Path) -> ContentKind {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    match mime.type_().as_str() {
        "video" => ContentKind::Video,
        "image" => ContentKind::Image,
        _ => ContentKind::File,
    }
}

/// Strips path components from an externally supplied file name.
///
/// Listing names come from remote markup and must never escape the target
/// directory.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    if base == "." || base == ".." {
        return String::new();
    }

    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_target_creates_kind_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());

        let target = store.prepare_target("clip.mp4", ContentKind::Video).unwrap();
        assert_eq!(target, dir.path().join("videos/clip.mp4"));
        assert!(dir.path().join("videos").is_dir());
        // Other subdirectories stay lazy
        assert!(!dir.path().join("images").exists());
    }

    #[test]
    fn test_non_media_kinds_default_to_files() {
        assert_eq!(ContentStore::subdirectory(ContentKind::File), "files");
        assert_eq!(ContentStore::subdirectory(ContentKind::Video), "videos");
        assert_eq!(ContentStore::subdirectory(ContentKind::Image), "images");
    }

    #[test]
    fn test_list_scans_typed_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());

        let video = store.prepare_target("a.mp4", ContentKind::Video).unwrap();
        fs::write(&video, b"vvvv").unwrap();
        let other = store.prepare_target("b.zip", ContentKind::File).unwrap();
        fs::write(&other, b"zz").unwrap();

        let mut listed = store.list().unwrap();
        listed.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "a.mp4");
        assert_eq!(listed[0].kind, ContentKind::Video);
        assert_eq!(listed[0].size_bytes, 4);
        assert_eq!(listed[1].kind, ContentKind::File);
    }

    #[test]
    fn test_list_on_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path().join("never-created"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_scan_directory_infers_kinds() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("movie.mp4"), b"v").unwrap();
        fs::write(dir.path().join("photo.jpg"), b"i").unwrap();
        fs::write(dir.path().join("archive.zip"), b"f").unwrap();

        let mut files = scan_directory(dir.path()).unwrap();
        files.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(files[0].kind, ContentKind::File);
        assert_eq!(files[1].kind, ContentKind::Video);
        assert_eq!(files[2].kind, ContentKind::Image);
    }

    #[test]
    fn test_scan_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let files = scan_directory(&dir.path().join("absent")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_sanitize_file_name_strips_path_components() {
        assert_eq!(sanitize_file_name("clip.mp4"), "clip.mp4");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("dir\\evil.exe"), "evil.exe");
        assert_eq!(sanitize_file_name(".."), "");
        assert_eq!(sanitize_file_name("  spaced.bin  "), "spaced.bin");
    }
}
