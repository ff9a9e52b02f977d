use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validated subscription fields that have not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub name: String,
    pub telegram_handle: String,
    pub instagram_handle: String,
    pub phone: String,
    /// Stored file name of the payment screenshot inside the upload directory.
    pub screenshot_reference: String,
}

/// A subscription record stored in redb
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: u64,
    pub name: String,
    pub telegram_handle: String,
    pub instagram_handle: String,
    pub phone: String,
    pub screenshot_reference: String,
    pub created_at: DateTime<Utc>,
}
