//! Submission pipeline: validate, store the screenshot, persist the record,
//! notify, respond.
//!
//! Records are at-least-persisted: once the record is committed it stays,
//! even when the notification ultimately fails.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::notifier::NotifyError;
use crate::storage::models::{NewSubscription, Subscription};
use crate::storage::DatabaseError;
use crate::uploads::{sanitize_filename, UploadError};
use crate::validation::{self, Rules, SubscriptionForm, ValidationErrors};
use crate::AppState;

#[derive(Debug)]
pub struct Submitted {
    pub record: Subscription,
    /// Invite link the client should navigate to
    pub redirect: String,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Form validation failed")]
    Validation(ValidationErrors),
    #[error("Failed to save screenshot: {0}")]
    Upload(#[from] UploadError),
    #[error("Failed to persist subscription: {0}")]
    Storage(#[from] DatabaseError),
    #[error("Failed to send notification: {0}")]
    Notification(#[from] NotifyError),
}

pub async fn submit(state: &AppState, form: SubscriptionForm) -> Result<Submitted, SubmitError> {
    submit_at(state, form, Utc::now()).await
}

/// Same as [`submit`] with an explicit clock, which drives the stored
/// file name and the record's `created_at`.
pub async fn submit_at(
    state: &AppState,
    form: SubscriptionForm,
    now: DateTime<Utc>,
) -> Result<Submitted, SubmitError> {
    let rules = Rules {
        max_upload_size: state.config.upload.max_upload_size,
        csrf: state.csrf.as_ref(),
        now,
    };
    let valid = validation::validate(form, &rules).map_err(SubmitError::Validation)?;

    // Phase 1: screenshot to disk
    let sanitized = sanitize_filename(&valid.screenshot.file_name);
    let file_name = state
        .uploads
        .save(now.timestamp(), &sanitized, &valid.screenshot.data)
        .await?;
    tracing::debug!(
        file = %file_name,
        bytes = valid.screenshot.data.len(),
        content_type = ?valid.screenshot.content_type,
        "Stored screenshot"
    );

    // Phase 2: record referencing the stored file
    let record = state.db.create_subscription(
        NewSubscription {
            name: valid.name,
            telegram_handle: valid.telegram,
            instagram_handle: valid.instagram,
            phone: valid.phone,
            screenshot_reference: file_name.clone(),
        },
        now,
    )?;
    tracing::info!(subscription_id = record.id, file = %file_name, "Persisted subscription");

    // Phase 3: notify; failures leave the record in place
    let caption = build_caption(&record);
    if let Err(e) = state
        .notifier
        .notify(&state.uploads.path(&file_name), &caption)
        .await
    {
        tracing::error!(
            subscription_id = record.id,
            error = %e,
            "Notification failed; subscription remains persisted"
        );
        return Err(e.into());
    }

    Ok(Submitted {
        record,
        redirect: state.config.form.invite_link.clone(),
    })
}

/// Telegram HTML caption summarizing a subscription.
pub fn build_caption(record: &Subscription) -> String {
    format!(
        "<b>New Subscription Received</b>\n\
         Name: {}\n\
         Telegram: {}\n\
         Instagram: {}\n\
         Phone: {}",
        escape_html(&record.name),
        escape_html(&record.telegram_handle),
        escape_html(&record.instagram_handle),
        escape_html(&record.phone),
    )
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
