use serde::Serialize;
use url::Url;

use crate::error::PortfolioError;

/// Outcome of validating a form before it is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: String,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: String::new(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
        }
    }

    pub fn into_result(self) -> Result<(), PortfolioError> {
        if self.is_valid {
            Ok(())
        } else {
            Err(PortfolioError::Validation(self.message))
        }
    }
}

/// Whether `value` parses as an absolute URL.
pub fn url_is_valid(value: &str) -> bool {
    Url::parse(value).is_ok()
}

/// Reject a missing required profile field.
pub(super) fn require_field(value: &str, label: &str) -> Option<ValidationResult> {
    value.is_empty().then(|| {
        ValidationResult::invalid(format!(
            "Cannot save portfolio data. {label} is required!"
        ))
    })
}

/// Reject the first top-level link that is not a URL (1-based in the message).
pub(super) fn check_links(links: &[String]) -> Option<ValidationResult> {
    links
        .iter()
        .position(|link| !url_is_valid(link))
        .map(|index| {
            ValidationResult::invalid(format!(
                "Cannot save portfolio data. Link number {} is not a valid URL!",
                index + 1
            ))
        })
}

pub(super) fn invalid_project(reason: &str) -> ValidationResult {
    ValidationResult::invalid(format!("Cannot save project data. {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_validity() {
        assert!(url_is_valid("https://example.com"));
        assert!(url_is_valid("https://github.com/alice?tab=repositories"));
        assert!(url_is_valid("mailto:alice@example.com"));
        assert!(!url_is_valid("not a url"));
        assert!(!url_is_valid("example.com"));
        assert!(!url_is_valid(""));
    }

    #[test]
    fn link_position_is_one_based() {
        let links = vec![
            "https://example.com".to_string(),
            "https://example.com".to_string(),
            "nope".to_string(),
        ];
        let result = check_links(&links).unwrap();
        assert!(!result.is_valid);
        assert_eq!(
            result.message,
            "Cannot save portfolio data. Link number 3 is not a valid URL!"
        );
    }

    #[test]
    fn into_result_carries_message() {
        let err = ValidationResult::invalid("bad").into_result().unwrap_err();
        assert!(matches!(err, PortfolioError::Validation(msg) if msg == "bad"));
        assert!(ValidationResult::valid().into_result().is_ok());
    }
}
