mod naming;

pub use naming::{sanitize_filename, stored_file_name};

use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Upper bound on collision suffixes tried before giving up.
const MAX_NAME_ATTEMPTS: u32 = 100;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Upload not found: {0}")]
    NotFound(String),
    #[error("No free file name for: {0}")]
    NameExhausted(String),
}

/// Directory holding uploaded payment screenshots.
/// Files are written once and never overwritten.
pub struct UploadDir {
    base_path: PathBuf,
}

impl UploadDir {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, std::io::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Absolute location of a stored file.
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.base_path.join(file_name)
    }

    /// Write `data` under `<timestamp>_<name>`, inserting a counter
    /// (`<timestamp>_<n>_<name>`) when that name is already taken.
    /// Returns the file name actually used.
    pub async fn save(
        &self,
        timestamp: i64,
        sanitized_name: &str,
        data: &Bytes,
    ) -> Result<String, UploadError> {
        tokio::fs::create_dir_all(&self.base_path).await?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = if attempt == 0 {
                stored_file_name(timestamp, sanitized_name)
            } else {
                stored_file_name(timestamp, &format!("{attempt}_{sanitized_name}"))
            };

            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.path(&file_name))
                .await;

            let mut file = match opened {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            file.write_all(data).await?;
            file.flush().await?;
            return Ok(file_name);
        }

        Err(UploadError::NameExhausted(sanitized_name.to_string()))
    }

    pub async fn read(&self, file_name: &str) -> Result<Bytes, UploadError> {
        let path = self.path(file_name);
        if !path.is_file() {
            return Err(UploadError::NotFound(file_name.to_string()));
        }
        let data = tokio::fs::read(&path).await?;
        Ok(Bytes::from(data))
    }

    pub async fn exists(&self, file_name: &str) -> Result<bool, UploadError> {
        Ok(tokio::fs::try_exists(self.path(file_name)).await?)
    }
}
