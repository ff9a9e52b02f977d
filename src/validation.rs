//! Form validation, independent of the HTTP layer.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::csrf::CsrfGuard;

pub const MAX_TEXT_LENGTH: usize = 100;
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

const REQUIRED: &str = "This field is required.";
const IMAGES_ONLY: &str = "Images only!";
const INVALID_PHONE: &str = "Phone number must be exactly 10 digits.";
const CSRF_MISSING: &str = "The CSRF token is missing.";

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern is valid"));

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Raw submitted form, every field optional.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionForm {
    pub name: Option<String>,
    pub telegram: Option<String>,
    pub instagram: Option<String>,
    pub phone: Option<String>,
    pub payment_screenshot: Option<UploadedFile>,
    pub csrf_token: Option<String>,
}

/// A form that passed every rule. Text fields are trimmed.
#[derive(Debug, Clone)]
pub struct ValidSubmission {
    pub name: String,
    pub telegram: String,
    pub instagram: String,
    pub phone: String,
    pub screenshot: UploadedFile,
}

/// Field name -> messages, in stable key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Limits and checks that depend on runtime configuration.
pub struct Rules<'a> {
    pub max_upload_size: u64,
    /// `None` disables the anti-forgery check.
    pub csrf: Option<&'a CsrfGuard>,
    pub now: DateTime<Utc>,
}

/// Check every field and report all failures at once.
pub fn validate(
    form: SubscriptionForm,
    rules: &Rules<'_>,
) -> Result<ValidSubmission, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = check_text(&mut errors, "name", form.name);
    let telegram = check_text(&mut errors, "telegram", form.telegram);
    let instagram = check_text(&mut errors, "instagram", form.instagram);
    let phone = check_phone(&mut errors, form.phone);
    let screenshot = check_screenshot(
        &mut errors,
        form.payment_screenshot,
        rules.max_upload_size,
    );

    if let Some(guard) = rules.csrf {
        match form.csrf_token.as_deref().map(str::trim) {
            None | Some("") => errors.add("csrf_token", CSRF_MISSING),
            Some(token) => {
                if let Err(e) = guard.verify(token, rules.now) {
                    errors.add("csrf_token", e.to_string());
                }
            }
        }
    }

    match (name, telegram, instagram, phone, screenshot) {
        (Some(name), Some(telegram), Some(instagram), Some(phone), Some(screenshot))
            if errors.is_empty() =>
        {
            Ok(ValidSubmission {
                name,
                telegram,
                instagram,
                phone,
                screenshot,
            })
        }
        _ => Err(errors),
    }
}

fn check_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
) -> Option<String> {
    let value = value.as_deref().map(str::trim).unwrap_or_default();

    if value.is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    if value.chars().count() > MAX_TEXT_LENGTH {
        errors.add(
            field,
            format!("Field cannot be longer than {MAX_TEXT_LENGTH} characters."),
        );
        return None;
    }

    Some(value.to_string())
}

fn check_phone(errors: &mut ValidationErrors, value: Option<String>) -> Option<String> {
    let value = value.as_deref().map(str::trim).unwrap_or_default();

    if value.is_empty() {
        errors.add("phone", REQUIRED);
        return None;
    }
    if !PHONE_RE.is_match(value) {
        errors.add("phone", INVALID_PHONE);
        return None;
    }

    Some(value.to_string())
}

fn check_screenshot(
    errors: &mut ValidationErrors,
    file: Option<UploadedFile>,
    max_upload_size: u64,
) -> Option<UploadedFile> {
    const FIELD: &str = "payment_screenshot";

    let file = match file {
        Some(file) if !file.file_name.trim().is_empty() => file,
        _ => {
            errors.add(FIELD, REQUIRED);
            return None;
        }
    };

    if !has_allowed_extension(&file.file_name) {
        errors.add(FIELD, IMAGES_ONLY);
        return None;
    }
    if file.data.len() as u64 > max_upload_size {
        errors.add(
            FIELD,
            format!("File exceeds maximum upload size of {max_upload_size} bytes"),
        );
        return None;
    }

    Some(file)
}

fn has_allowed_extension(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    const MAX: u64 = 5 * 1024 * 1024;

    fn png(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: Some("image/png".to_string()),
            data: Bytes::from_static(b"\x89PNG\r\n\x1a\n"),
        }
    }

    fn valid_form() -> SubscriptionForm {
        SubscriptionForm {
            name: Some("Ann".to_string()),
            telegram: Some("@ann".to_string()),
            instagram: Some("@ann_ig".to_string()),
            phone: Some("1234567890".to_string()),
            payment_screenshot: Some(png("receipt.png")),
            csrf_token: None,
        }
    }

    fn rules() -> Rules<'static> {
        Rules {
            max_upload_size: MAX,
            csrf: None,
            now: Utc::now(),
        }
    }

    #[test]
    fn test_valid_form_is_normalized() {
        let mut form = valid_form();
        form.name = Some("  Ann  ".to_string());

        let valid = validate(form, &rules()).unwrap();
        assert_eq!(valid.name, "Ann");
        assert_eq!(valid.telegram, "@ann");
        assert_eq!(valid.instagram, "@ann_ig");
        assert_eq!(valid.phone, "1234567890");
        assert_eq!(valid.screenshot.file_name, "receipt.png");
    }

    #[test]
    fn test_missing_and_blank_fields_are_required() {
        let mut form = valid_form();
        form.name = None;
        form.telegram = Some("   ".to_string());

        let errors = validate(form, &rules()).unwrap_err();
        assert_eq!(errors.get("name"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.get("telegram"), Some(&[REQUIRED.to_string()][..]));
        assert!(!errors.contains("instagram"));
    }

    #[test]
    fn test_text_length_limit_counts_characters() {
        let mut form = valid_form();
        form.instagram = Some("é".repeat(100));
        assert!(validate(form, &rules()).is_ok());

        let mut form = valid_form();
        form.instagram = Some("a".repeat(101));
        let errors = validate(form, &rules()).unwrap_err();
        assert_eq!(
            errors.get("instagram"),
            Some(&["Field cannot be longer than 100 characters.".to_string()][..])
        );
    }

    #[test]
    fn test_phone_must_be_ten_digits() {
        for bad in ["12345", "12345678901", "123456789a", "+123456789", "１２３４５６７８９０"] {
            let mut form = valid_form();
            form.phone = Some(bad.to_string());
            let errors = validate(form, &rules()).unwrap_err();
            assert_eq!(
                errors.get("phone"),
                Some(&[INVALID_PHONE.to_string()][..]),
                "phone {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_screenshot_required() {
        let mut form = valid_form();
        form.payment_screenshot = None;
        let errors = validate(form, &rules()).unwrap_err();
        assert!(errors.contains("payment_screenshot"));

        let mut form = valid_form();
        form.payment_screenshot = Some(png(""));
        let errors = validate(form, &rules()).unwrap_err();
        assert_eq!(
            errors.get("payment_screenshot"),
            Some(&[REQUIRED.to_string()][..])
        );
    }

    #[test]
    fn test_screenshot_extension() {
        for ok in ["a.jpg", "a.JPEG", "a.Png"] {
            let mut form = valid_form();
            form.payment_screenshot = Some(png(ok));
            assert!(validate(form, &rules()).is_ok(), "{ok} should be accepted");
        }

        for bad in ["a.gif", "a.pdf", "png", "a.png.exe"] {
            let mut form = valid_form();
            form.payment_screenshot = Some(png(bad));
            let errors = validate(form, &rules()).unwrap_err();
            assert_eq!(
                errors.get("payment_screenshot"),
                Some(&[IMAGES_ONLY.to_string()][..]),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_screenshot_size_limit() {
        let mut form = valid_form();
        form.payment_screenshot = Some(UploadedFile {
            data: Bytes::from(vec![0u8; 11]),
            ..png("big.png")
        });
        let rules = Rules {
            max_upload_size: 10,
            ..rules()
        };
        let errors = validate(form, &rules).unwrap_err();
        assert!(errors.contains("payment_screenshot"));
    }

    #[test]
    fn test_all_failures_reported_together() {
        let form = SubscriptionForm::default();
        let errors = validate(form, &rules()).unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(
            fields,
            vec!["instagram", "name", "payment_screenshot", "phone", "telegram"]
        );
    }

    #[test]
    fn test_csrf_token_checked_when_enabled() {
        let guard = CsrfGuard::new(&SecretString::from("secret".to_string()));
        let now = Utc::now();
        let rules = Rules {
            max_upload_size: MAX,
            csrf: Some(&guard),
            now,
        };

        let errors = validate(valid_form(), &rules).unwrap_err();
        assert_eq!(
            errors.get("csrf_token"),
            Some(&[CSRF_MISSING.to_string()][..])
        );

        let mut form = valid_form();
        form.csrf_token = Some("1.bad".to_string());
        let errors = validate(form, &rules).unwrap_err();
        assert_eq!(
            errors.get("csrf_token"),
            Some(&["The CSRF token is invalid.".to_string()][..])
        );

        let mut form = valid_form();
        form.csrf_token = Some(guard.issue(now));
        assert!(validate(form, &rules).is_ok());
    }

    #[test]
    fn test_errors_serialize_as_plain_map() {
        let mut errors = ValidationErrors::default();
        errors.add("phone", INVALID_PHONE);
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({ "phone": [INVALID_PHONE] }));
    }
}
