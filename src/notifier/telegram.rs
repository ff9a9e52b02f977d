use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;
use std::time::Duration;

use super::{Notifier, NotifyError};
use crate::config::TelegramConfig;

/// Telegram Bot API `sendPhoto` client with fixed-delay retries.
pub struct TelegramNotifier {
    api_base: String,
    bot_token: SecretString,
    chat_id: String,
    client: Client,
    max_attempts: u32,
    retry_delay: Duration,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
            client,
            max_attempts: config.max_attempts.max(1),
            retry_delay: config.retry_delay,
        })
    }

    // Carries the bot token; never log it.
    fn send_photo_url(&self) -> String {
        format!(
            "{}/bot{}/sendPhoto",
            self.api_base,
            self.bot_token.expose_secret()
        )
    }

    fn form(
        &self,
        photo: &Bytes,
        file_name: &str,
        caption: &str,
    ) -> Result<Form, reqwest::Error> {
        let mime = mime_guess::from_path(file_name).first_or_octet_stream();
        let part = Part::bytes(photo.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime.essence_str())?;

        Ok(Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .text("parse_mode", "HTML")
            .part("photo", part))
    }

    /// One delivery attempt. Any outcome other than 200 counts as a failure.
    async fn send_once(
        &self,
        photo: &Bytes,
        file_name: &str,
        caption: &str,
    ) -> Result<(), String> {
        let form = self
            .form(photo, file_name, caption)
            .map_err(|e| e.without_url().to_string())?;

        let resp = self
            .client
            .post(self.send_photo_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| e.without_url().to_string())?;

        if resp.status() != StatusCode::OK {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("Telegram sendPhoto failed ({status}): {body}"));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, photo_path: &Path, caption: &str) -> Result<(), NotifyError> {
        let photo = Bytes::from(tokio::fs::read(photo_path).await?);
        let file_name = photo_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());

        let mut last_error = String::new();
        for attempt in 1..=self.max_attempts {
            match self.send_once(&photo, &file_name, caption).await {
                Ok(()) => {
                    tracing::debug!(attempt, file = %file_name, "Telegram notification sent");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Telegram notification attempt failed"
                    );
                    last_error = e;
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        Err(NotifyError::Exhausted {
            attempts: self.max_attempts,
            last_error,
        })
    }
}
