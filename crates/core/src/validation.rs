//! Input validation rules shared by request DTOs.
//!
//! Request bodies derive [`validator::Validate`] and point their custom
//! checks at the functions in this module. [`describe_errors`] flattens a
//! [`ValidationErrors`] tree into the single human-readable message that
//! goes back to API clients.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::CoreError;

/// SKUs and SKU prefixes are restricted to this pattern.
pub const RESTRICTED_STRING_PATTERN: &str = r"^[a-zA-Z\-_]{1,50}$";

static RESTRICTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(RESTRICTED_STRING_PATTERN).expect("valid regex"));

/// Discount applied as a percentage of the price.
pub const DISCOUNT_TYPE_PERCENTAGE: &str = "percentage";

/// Discount applied as a fixed amount off the price.
pub const DISCOUNT_TYPE_FLAT_AMOUNT: &str = "flat_amount";

const VALID_DISCOUNT_TYPES: &[&str] = &[DISCOUNT_TYPE_PERCENTAGE, DISCOUNT_TYPE_FLAT_AMOUNT];

/// The only payload encoding webhooks are delivered in.
pub const WEBHOOK_CONTENT_TYPE_JSON: &str = "application/json";

/// Whether `input` matches [`RESTRICTED_STRING_PATTERN`].
pub fn restricted_string_is_valid(input: &str) -> bool {
    RESTRICTED_RE.is_match(input)
}

/// Validate a SKU or SKU prefix.
pub fn validate_sku(sku: &str) -> Result<(), ValidationError> {
    if restricted_string_is_valid(sku) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_sku").with_message(Cow::Owned(format!(
            "the sku received ({sku}) is invalid"
        ))))
    }
}

/// Validate a discount type against the supported set.
pub fn validate_discount_type(discount_type: &str) -> Result<(), ValidationError> {
    if VALID_DISCOUNT_TYPES.contains(&discount_type) {
        Ok(())
    } else {
        Err(
            ValidationError::new("invalid_discount_type").with_message(Cow::Owned(format!(
                "discount type '{discount_type}' is invalid. Must be one of: {VALID_DISCOUNT_TYPES:?}"
            ))),
        )
    }
}

/// Validate a webhook content type. Matching is case-insensitive.
pub fn validate_webhook_content_type(content_type: &str) -> Result<(), ValidationError> {
    if content_type.eq_ignore_ascii_case(WEBHOOK_CONTENT_TYPE_JSON) {
        Ok(())
    } else {
        Err(
            ValidationError::new("invalid_content_type").with_message(Cow::Owned(format!(
                "unsupported content type '{content_type}', expected {WEBHOOK_CONTENT_TYPE_JSON}"
            ))),
        )
    }
}

/// Validate that a webhook URL is an absolute http(s) URL.
pub fn validate_webhook_url(url: &str) -> Result<(), ValidationError> {
    let trimmed = url.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_webhook_url")
            .with_message(Cow::Borrowed("webhook url must start with http:// or https://")))
    }
}

/// Validate that a webhook subscribes to an event the catalog emits.
pub fn validate_webhook_event_type(event_type: &str) -> Result<(), ValidationError> {
    if crate::event_types::is_known(event_type) {
        Ok(())
    } else {
        Err(
            ValidationError::new("invalid_event_type").with_message(Cow::Owned(format!(
                "unknown event type '{event_type}'. Must be one of: {:?}",
                crate::event_types::ALL
            ))),
        )
    }
}

/// Reject strings that are empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be blank")))
    } else {
        Ok(())
    }
}

/// Reject a list of option names that contains the same name twice.
pub fn ensure_unique_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<(), CoreError> {
    let mut seen = std::collections::HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(CoreError::Validation(format!(
                "product option with the name '{name}' was provided more than once"
            )));
        }
    }
    Ok(())
}

/// Enforce a minimum password length.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), CoreError> {
    if password.chars().count() < min_length {
        return Err(CoreError::Validation(format!(
            "password must be at least {min_length} characters long"
        )));
    }
    Ok(())
}

/// Flatten a validation error tree into `field: message; field: message`.
///
/// Nested struct and list errors are prefixed with their path, e.g.
/// `options[1].name: must not be blank`. Output is sorted for stable messages.
pub fn describe_errors(errors: &ValidationErrors) -> String {
    let mut parts = Vec::new();
    collect_errors(errors, "", &mut parts);
    parts.sort();
    parts.join("; ")
}

fn collect_errors(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    out.push(format!("{path}: {message}"));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_errors(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_errors(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(custom(function = "validate_sku"))]
        sku: String,
        #[validate(custom(function = "validate_not_blank"))]
        name: String,
    }

    #[test]
    fn restricted_strings() {
        assert!(restricted_string_is_valid("shirt"));
        assert!(restricted_string_is_valid("t-shirt_large"));
        assert!(!restricted_string_is_valid(""));
        assert!(!restricted_string_is_valid("has space"));
        assert!(!restricted_string_is_valid("semi;colon"));
        assert!(!restricted_string_is_valid(&"a".repeat(51)));
    }

    #[test]
    fn sku_error_mentions_input() {
        let err = validate_sku("bad sku").unwrap_err();
        assert_eq!(
            err.message.as_deref(),
            Some("the sku received (bad sku) is invalid")
        );
    }

    #[test]
    fn discount_types() {
        assert!(validate_discount_type("percentage").is_ok());
        assert!(validate_discount_type("flat_amount").is_ok());
        assert!(validate_discount_type("bogo").is_err());
    }

    #[test]
    fn webhook_rules() {
        assert!(validate_webhook_content_type("application/json").is_ok());
        assert!(validate_webhook_content_type("Application/JSON").is_ok());
        assert!(validate_webhook_content_type("application/xml").is_err());
        assert!(validate_webhook_url("https://example.com/hook").is_ok());
        assert!(validate_webhook_url("ftp://example.com").is_err());
        assert!(validate_webhook_event_type("product_updated").is_ok());
        assert!(validate_webhook_event_type("order_placed").is_err());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        assert!(ensure_unique_names(["color", "size"]).is_ok());
        let err = ensure_unique_names(["color", "size", "color"]).unwrap_err();
        assert!(err.to_string().contains("'color'"));
    }

    #[test]
    fn password_length() {
        assert!(validate_password_strength("long-enough", 8).is_ok());
        assert!(validate_password_strength("short", 8).is_err());
    }

    #[test]
    fn describe_errors_is_sorted_and_readable() {
        let sample = Sample {
            sku: "no good".to_string(),
            name: "   ".to_string(),
        };
        let errors = sample.validate().unwrap_err();
        assert_eq!(
            describe_errors(&errors),
            "name: must not be blank; sku: the sku received (no good) is invalid"
        );
    }
}
