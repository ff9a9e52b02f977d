use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use thiserror::Error;

/// Development-only secret; `validate` warns when it is in use.
const DEV_SECRET_KEY: &str = "dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub form: FormConfig,
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Directory holding the redb database file
    pub data_dir: String,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory for stored payment screenshots
    pub dir: String,
    /// Maximum request payload in bytes
    pub max_upload_size: u64,
    /// Expose stored screenshots under `/static/uploads`
    pub serve_public: bool,
}

#[derive(Debug)]
pub struct FormConfig {
    /// Signs anti-forgery tokens
    pub secret_key: SecretString,
    pub csrf_enabled: bool,
    /// Where the client is sent after a successful submission
    pub invite_link: String,
}

#[derive(Debug)]
pub struct TelegramConfig {
    pub api_base: String,
    pub bot_token: SecretString,
    pub chat_id: String,
    /// Per-attempt request timeout
    pub timeout: Duration,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            data_dir: "./data".to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: "./static/uploads".to_string(),
            max_upload_size: 5 * 1024 * 1024, // 5MB
            serve_public: false,
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            secret_key: SecretString::from(DEV_SECRET_KEY.to_string()),
            csrf_enabled: true,
            invite_link: "https://t.me/+o3POA0Le3_M0YzQ1".to_string(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            bot_token: SecretString::from(String::new()),
            chat_id: String::new(),
            timeout: Duration::from_secs(15),
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| var(key).and_then(|s| s.trim().parse::<u64>().ok());

        let server_defaults = ServerConfig::default();
        let upload_defaults = UploadConfig::default();
        let form_defaults = FormConfig::default();
        let telegram_defaults = TelegramConfig::default();

        let flag = |key: &str, default: bool| {
            var(key)
                .map(|v| match v.trim().to_lowercase().as_str() {
                    "true" | "1" | "yes" => true,
                    "false" | "0" | "no" => false,
                    _ => default,
                })
                .unwrap_or(default)
        };

        let max_attempts = match parsed("NOTIFY_MAX_ATTEMPTS") {
            Some(n) => u32::try_from(n).map_err(|_| {
                ConfigError::ValidationError("NOTIFY_MAX_ATTEMPTS is too large".to_string())
            })?,
            None => telegram_defaults.max_attempts,
        };

        let config = Config {
            server: ServerConfig {
                bind_address: var("BIND_ADDRESS").unwrap_or(server_defaults.bind_address),
                data_dir: var("DATA_DIR").unwrap_or(server_defaults.data_dir),
            },
            upload: UploadConfig {
                dir: var("UPLOAD_DIR").unwrap_or(upload_defaults.dir),
                max_upload_size: parsed("MAX_UPLOAD_SIZE")
                    .unwrap_or(upload_defaults.max_upload_size),
                serve_public: flag("SERVE_UPLOADS", upload_defaults.serve_public),
            },
            form: FormConfig {
                secret_key: var("SECRET_KEY")
                    .map(SecretString::from)
                    .unwrap_or(form_defaults.secret_key),
                csrf_enabled: flag("CSRF_ENABLED", form_defaults.csrf_enabled),
                invite_link: var("INVITE_LINK").unwrap_or(form_defaults.invite_link),
            },
            telegram: TelegramConfig {
                api_base: var("TELEGRAM_API_BASE").unwrap_or(telegram_defaults.api_base),
                bot_token: SecretString::from(var("TELEGRAM_BOT_TOKEN").unwrap_or_default()),
                chat_id: var("TELEGRAM_CHAT_ID").unwrap_or_default(),
                timeout: parsed("NOTIFY_TIMEOUT_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(telegram_defaults.timeout),
                max_attempts,
                retry_delay: parsed("NOTIFY_RETRY_DELAY_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(telegram_defaults.retry_delay),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.bot_token.expose_secret().trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "TELEGRAM_BOT_TOKEN is required".to_string(),
            ));
        }

        if self.telegram.chat_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "TELEGRAM_CHAT_ID is required".to_string(),
            ));
        }

        if self.telegram.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "NOTIFY_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        if self.upload.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.form.secret_key.expose_secret() == DEV_SECRET_KEY {
            tracing::warn!("SECRET_KEY is not set; using the development default");
        }

        Ok(())
    }
}
