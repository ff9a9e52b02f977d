//! subscription-intake - Subscription form intake service
//!
//! This crate accepts subscription forms with a payment screenshot and:
//! - Validates fields, file type and size, and a signed anti-forgery token
//! - Stores the screenshot in an upload directory
//! - Persists the subscription in a redb embedded database (ACID, crash-safe)
//! - Forwards the screenshot with a caption to a Telegram chat, with retries

pub mod api;
pub mod config;
pub mod csrf;
pub mod notifier;
pub mod storage;
pub mod submission;
#[cfg(test)]
pub mod testutil;
pub mod uploads;
pub mod validation;

use std::sync::Arc;

use config::Config;
use csrf::CsrfGuard;
use notifier::Notifier;
use storage::Database;
use uploads::UploadDir;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub uploads: UploadDir,
    pub notifier: Arc<dyn Notifier>,
    /// Present when anti-forgery tokens are enforced
    pub csrf: Option<CsrfGuard>,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Database,
        uploads: UploadDir,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let csrf = config
            .form
            .csrf_enabled
            .then(|| CsrfGuard::new(&config.form.secret_key));

        Self {
            config,
            db,
            uploads,
            notifier,
            csrf,
        }
    }
}
