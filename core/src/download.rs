//! Exported order spreadsheets and saving them to disk.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::error::ApiError;

/// File name the export is saved under.
pub const DEFAULT_FILE_NAME: &str = "orders.xlsx";

/// A successfully fetched export, held in memory until saved.
#[derive(Debug, Clone)]
pub struct Download {
    file_name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

impl Download {
    pub fn new(bytes: Bytes, content_type: Option<String>) -> Self {
        Self {
            file_name: DEFAULT_FILE_NAME.to_string(),
            content_type,
            bytes,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Write the export into `dir` as `file_name()` and return the full path.
    ///
    /// An existing file is overwritten. If writing fails part-way the
    /// partial file is removed before the error is returned.
    pub fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ApiError> {
        let path = dir.as_ref().join(&self.file_name);
        write_or_remove(&path, |file| file.write_all(&self.bytes))?;
        tracing::debug!(path = %path.display(), bytes = self.bytes.len(), "saved download");
        Ok(path)
    }
}

/// Create `path`, fill it with `write`, and flush it to disk. On any failure
/// after creation the file is removed, so no partial export is left behind.
fn write_or_remove(
    path: &Path,
    write: impl FnOnce(&mut File) -> std::io::Result<()>,
) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    let result = write(&mut file).and_then(|()| file.sync_all());
    drop(file);
    if result.is_err() {
        let _ = fs::remove_file(path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("order-core-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn save_writes_bytes_under_default_name() {
        let dir = scratch_dir("save");
        let download = Download::new(Bytes::from_static(b"sheet"), None);
        let path = download.save_to(&dir).unwrap();
        assert_eq!(path, dir.join("orders.xlsx"));
        assert_eq!(fs::read(&path).unwrap(), b"sheet");
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn save_overwrites_existing_file() {
        let dir = scratch_dir("overwrite");
        fs::write(dir.join("orders.xlsx"), b"old contents that are longer").unwrap();
        let download = Download::new(Bytes::from_static(b"new"), None);
        let path = download.save_to(&dir).unwrap();
        assert_eq!(fs::read(path).unwrap(), b"new");
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn save_into_missing_directory_is_io_error() {
        let dir = std::env::temp_dir().join("order-core-does-not-exist").join("nested");
        let download = Download::new(Bytes::from_static(b"x"), None);
        let err = download.save_to(&dir).unwrap_err();
        assert!(matches!(err, ApiError::Io(_)));
        assert!(!dir.join("orders.xlsx").exists());
    }

    #[test]
    fn failed_write_removes_partial_file() {
        let dir = scratch_dir("partial");
        let path = dir.join("orders.xlsx");
        let err = write_or_remove(&path, |file| {
            file.write_all(b"first half")?;
            Err(std::io::Error::new(std::io::ErrorKind::WriteZero, "disk full"))
        })
        .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::WriteZero);
        assert!(!path.exists());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn failed_overwrite_leaves_no_file() {
        let dir = scratch_dir("partial-existing");
        let path = dir.join("orders.xlsx");
        fs::write(&path, b"previous export").unwrap();
        let result = write_or_remove(&path, |file| {
            file.write_all(b"new")?;
            Err(std::io::Error::other("connection dropped"))
        });
        assert!(result.is_err());
        assert!(!path.exists());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn custom_file_name() {
        let download = Download::new(Bytes::new(), None).with_file_name("export.csv");
        assert_eq!(download.file_name(), "export.csv");
    }
}
