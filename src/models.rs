// src/models.rs
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::errors::{EstimateError, Result};

/// Largest photo accepted for estimation (4 MB, decoded).
pub const MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;

/// A photo carried as a `data:<mime>;base64,<data>` URI.
///
/// Construction validates the MIME type, the base64 payload and the size limit,
/// so holding a `PhotoDataUri` means the photo is fit to send to a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhotoDataUri {
    mime_type: String,
    data: String,
    byte_len: usize,
}

impl PhotoDataUri {
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| EstimateError::InvalidPhoto("expected a data: URI".to_string()))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| EstimateError::InvalidPhoto("missing data section".to_string()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| EstimateError::InvalidPhoto("photo must be base64 encoded".to_string()))?;

        if !mime_type.starts_with("image/") || mime_type.len() == "image/".len() {
            return Err(EstimateError::InvalidPhoto(format!(
                "unsupported MIME type '{}'",
                mime_type
            )));
        }

        let bytes = STANDARD
            .decode(data.trim())
            .map_err(|e| EstimateError::InvalidPhoto(format!("bad base64 data: {}", e)))?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(EstimateError::ImageTooLarge {
                size: bytes.len(),
                limit: MAX_IMAGE_BYTES,
            });
        }

        Ok(Self {
            mime_type: mime_type.to_string(),
            data: data.trim().to_string(),
            byte_len: bytes.len(),
        })
    }

    /// Encodes raw image bytes, applying the same checks as [`PhotoDataUri::parse`].
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Result<Self> {
        Self::parse(&format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes)))
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The base64 payload, without the `data:` header.
    pub fn base64_data(&self) -> &str {
        &self.data
    }

    /// Size of the decoded image in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }
}

impl fmt::Display for PhotoDataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.data)
    }
}

impl TryFrom<String> for PhotoDataUri {
    type Error = EstimateError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<PhotoDataUri> for String {
    fn from(photo: PhotoDataUri) -> Self {
        photo.to_string()
    }
}

/// What the estimator needs: a photo of the project and a description of the work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateInput {
    pub photo_data_uri: PhotoDataUri,
    pub description: String,
}

/// Labor/material/total triple for a project.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateOutput {
    pub labor_cost: f64,
    pub material_cost: f64,
    pub total_cost: f64,
}

impl EstimateOutput {
    pub fn new(labor_cost: f64, material_cost: f64) -> Self {
        Self {
            labor_cost,
            material_cost,
            total_cost: labor_cost + material_cost,
        }
    }

    /// Replaces whatever total was reported with the sum of the parts.
    pub fn with_consistent_total(self) -> Self {
        Self::new(self.labor_cost, self.material_cost)
    }

    pub fn display(&self) -> EstimateDisplay {
        EstimateDisplay {
            labor_cost: format_usd(self.labor_cost),
            material_cost: format_usd(self.material_cost),
            total_cost: format_usd(self.total_cost),
        }
    }
}

/// Costs formatted for presentation, e.g. `$1,280.00`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateDisplay {
    pub labor_cost: String,
    pub material_cost: String,
    pub total_cost: String,
}

/// Formats an amount as US dollars with thousands separators and two decimals.
pub fn format_usd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl ContactInfo {
    /// Checks the contact form rules; an empty list means the form may be submitted.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.name.trim().chars().count() < 2 {
            errors.push(FieldError {
                field: "name",
                message: "Name must be at least 2 characters.",
            });
        }
        if !EMAIL.is_match(self.email.trim()) {
            errors.push(FieldError {
                field: "email",
                message: "Please enter a valid email address.",
            });
        }
        if self.phone.trim().chars().count() < 10 {
            errors.push(FieldError {
                field: "phone",
                message: "Please enter a valid phone number.",
            });
        }
        errors
    }
}

/// Everything the relay needs to record one lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionData {
    pub contact: ContactInfo,
    pub description: String,
    #[serde(default)]
    pub estimate: Option<EstimateOutput>,
}

/// The `{success, data?, message?}` envelope returned by both actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ActionResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

impl ActionResult<()> {
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(280.0), "$280.00");
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(1234.5), "$1,234.50");
        assert_eq!(format_usd(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_usd(99.999), "$100.00");
    }

    #[test]
    fn test_total_is_recomputed() {
        let reported = EstimateOutput {
            labor_cost: 200.0,
            material_cost: 80.0,
            total_cost: 999.0,
        };
        let fixed = reported.with_consistent_total();
        assert_eq!(fixed.total_cost, 280.0);
        assert_eq!(fixed.display().total_cost, "$280.00");
    }

    #[test]
    fn test_photo_parse() {
        let photo = PhotoDataUri::from_bytes("image/jpeg", &[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        assert_eq!(photo.mime_type(), "image/jpeg");
        assert_eq!(photo.byte_len(), 4);
        assert!(photo.to_string().starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_photo_rejects_oversized() {
        let bytes = vec![0u8; MAX_IMAGE_BYTES + 1];
        let err = PhotoDataUri::from_bytes("image/png", &bytes).unwrap_err();
        assert!(matches!(err, EstimateError::ImageTooLarge { .. }));
    }

    #[test]
    fn test_photo_accepts_exact_limit() {
        let bytes = vec![0u8; MAX_IMAGE_BYTES];
        assert!(PhotoDataUri::from_bytes("image/png", &bytes).is_ok());
    }

    #[test]
    fn test_photo_rejects_non_image() {
        let err = PhotoDataUri::parse("data:text/plain;base64,aGVsbG8=").unwrap_err();
        assert!(matches!(err, EstimateError::InvalidPhoto(_)));
        assert!(PhotoDataUri::parse("https://example.com/a.png").is_err());
        assert!(PhotoDataUri::parse("data:image/png,rawbytes").is_err());
        assert!(PhotoDataUri::parse("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_photo_deserializes_from_string() {
        let input: EstimateInput = serde_json::from_str(
            r#"{"photoDataUri":"data:image/png;base64,iVBORw0KGgo=","description":"Fix fence"}"#,
        )
        .unwrap();
        assert_eq!(input.photo_data_uri.mime_type(), "image/png");
        assert_eq!(input.description, "Fix fence");
    }

    #[test]
    fn test_contact_validation() {
        let good = ContactInfo {
            name: "Jo".to_string(),
            email: "jo@example.com".to_string(),
            phone: "5551234567".to_string(),
        };
        assert!(good.validate().is_empty());

        let no_at = ContactInfo {
            email: "jo.example.com".to_string(),
            ..good.clone()
        };
        let errors = no_at.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "email");

        let bad = ContactInfo {
            name: "J".to_string(),
            email: "".to_string(),
            phone: "555".to_string(),
        };
        let fields: Vec<&str> = bad.validate().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "email", "phone"]);
    }

    #[test]
    fn test_action_result_serialization() {
        let ok = serde_json::to_value(ActionResult::ok(EstimateOutput::new(1.0, 2.0))).unwrap();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["data"]["totalCost"], 3.0);
        assert!(ok.get("message").is_none());

        let failed = serde_json::to_value(ActionResult::<()>::failure("nope")).unwrap();
        assert_eq!(failed["success"], false);
        assert_eq!(failed["message"], "nope");
        assert!(failed.get("data").is_none());
    }
}
