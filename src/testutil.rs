//! Shared test helpers for in-crate tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::{Config, FormConfig, ServerConfig, TelegramConfig, UploadConfig};
use crate::notifier::{Notifier, NotifyError};
use crate::storage::Database;
use crate::uploads::UploadDir;
use crate::validation::{SubscriptionForm, UploadedFile};
use crate::AppState;

/// Notifier stub that records every call and either succeeds or fails.
pub struct RecordingNotifier {
    calls: Mutex<Vec<(PathBuf, String)>>,
    succeed: bool,
}

impl RecordingNotifier {
    pub fn succeeding() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            succeed: true,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            succeed: false,
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, photo_path: &Path, caption: &str) -> Result<(), NotifyError> {
        self.calls
            .lock()
            .unwrap()
            .push((photo_path.to_path_buf(), caption.to_string()));

        if self.succeed {
            Ok(())
        } else {
            Err(NotifyError::Exhausted {
                attempts: 3,
                last_error: "stubbed failure".to_string(),
            })
        }
    }
}

/// Create a test AppState with a temporary database and upload directory.
/// Anti-forgery tokens are disabled.
pub fn test_state(temp_dir: &tempfile::TempDir, notifier: Arc<dyn Notifier>) -> Arc<AppState> {
    let data_dir = temp_dir.path().join("data");
    let upload_dir = temp_dir.path().join("uploads");

    let config = Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            data_dir: data_dir.to_string_lossy().to_string(),
        },
        upload: UploadConfig {
            dir: upload_dir.to_string_lossy().to_string(),
            ..UploadConfig::default()
        },
        form: FormConfig {
            csrf_enabled: false,
            ..FormConfig::default()
        },
        telegram: TelegramConfig::default(),
    };

    let db = Database::open(&data_dir).expect("Failed to open test database");
    let uploads = UploadDir::new(&upload_dir).expect("Failed to create test upload dir");

    Arc::new(AppState::new(config, db, uploads, notifier))
}

/// A complete form with a small png screenshot named `receipt.png`.
pub fn png_form(name: &str, phone: &str) -> SubscriptionForm {
    SubscriptionForm {
        name: Some(name.to_string()),
        telegram: Some("@ann".to_string()),
        instagram: Some("@ann_ig".to_string()),
        phone: Some(phone.to_string()),
        payment_screenshot: Some(UploadedFile {
            file_name: "receipt.png".to_string(),
            content_type: Some("image/png".to_string()),
            data: Bytes::from_static(b"\x89PNG\r\n\x1a\nfake"),
        }),
        csrf_token: None,
    }
}
