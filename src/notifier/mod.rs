mod telegram;

pub use telegram::TelegramNotifier;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
    #[error("Notification failed after {attempts} attempt(s): {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

/// Delivers a new-submission alert carrying the payment screenshot.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, photo_path: &Path, caption: &str) -> Result<(), NotifyError>;
}
