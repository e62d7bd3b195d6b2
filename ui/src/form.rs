//! Contact form validation.
//!
//! The form never leaves the browser: submitting only validates the fields
//! and shows a localized confirmation or error in `#form-feedback`.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::i18n::LanguageState;

pub const SUCCESS_KEY: &str = "form.success";

/// Field values as typed by the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("a required field is blank")]
    Required,
    #[error("email address does not look valid")]
    InvalidEmail,
}

impl FormError {
    /// Catalog key of the message shown to the visitor.
    pub fn message_key(self) -> &'static str {
        match self {
            FormError::Required => "form.errorRequired",
            FormError::InvalidEmail => "form.errorEmail",
        }
    }
}

impl ContactForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    /// Blank fields (after trimming) win over a malformed email.
    pub fn validate(&self) -> Result<(), FormError> {
        let blank = [&self.name, &self.email, &self.message]
            .iter()
            .any(|value| value.trim().is_empty());
        if blank {
            return Err(FormError::Required);
        }
        if !looks_like_email(&self.email) {
            return Err(FormError::InvalidEmail);
        }
        Ok(())
    }
}

/// Something, `@`, something, `.`, something, with no line terminator in
/// between. The terminators are the ones a browser's `.` refuses to cross.
const EMAIL_SHAPE: &str =
    r"[^\n\r\x{2028}\x{2029}]+@[^\n\r\x{2028}\x{2029}]+\.[^\n\r\x{2028}\x{2029}]+";

static EMAIL_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| match Regex::new(EMAIL_SHAPE) {
    Ok(pattern) => Some(pattern),
    Err(err) => {
        tracing::error!(%err, "email pattern failed to compile");
        None
    }
});

/// Loose shape check; the address may sit anywhere in the value.
pub fn looks_like_email(value: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Error,
}

/// What to show after a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFeedback {
    pub kind: FeedbackKind,
    pub message_key: &'static str,
    pub text: String,
}

impl FormFeedback {
    /// Validate `form` and resolve the message in the current language.
    pub fn for_submission(form: &ContactForm, language: &LanguageState) -> Self {
        let (kind, message_key) = match form.validate() {
            Ok(()) => (FeedbackKind::Success, SUCCESS_KEY),
            Err(err) => (FeedbackKind::Error, err.message_key()),
        };
        Self {
            kind,
            message_key,
            text: language.resolve(message_key).to_string(),
        }
    }

    /// The form is cleared only after a successful submission.
    pub fn should_reset(&self) -> bool {
        self.kind == FeedbackKind::Success
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::i18n::Catalog;

    #[test]
    fn blank_fields_are_required() {
        let form = ContactForm::new("Ada", "   ", "Hello");
        assert_eq!(form.validate(), Err(FormError::Required));
        assert_eq!(ContactForm::default().validate(), Err(FormError::Required));
    }

    #[test]
    fn required_wins_over_bad_email() {
        let form = ContactForm::new("", "nope", "Hello");
        assert_eq!(form.validate(), Err(FormError::Required));
    }

    #[test]
    fn email_shape_is_checked() {
        for bad in ["nope", "@example.com", "a@.com", "a@b.", "a@b\n.com", "a.b@c"] {
            assert!(!looks_like_email(bad), "{bad} should be rejected");
        }
        for good in ["a@b.c", "ada@example.com", " x@y.z ", "@a@b.c", "first.last@mail.co.uk"] {
            assert!(looks_like_email(good), "{good} should be accepted");
        }
    }

    #[test]
    fn address_may_not_span_lines() {
        assert!(EMAIL_PATTERN.is_some());
        for split in ["a@b\r.com", "a@b\u{2028}.com", "a\u{2029}@b.com"] {
            assert!(!looks_like_email(split), "{split:?} should be rejected");
        }
        assert!(looks_like_email("note\nada@example.com"));
    }

    #[test]
    fn feedback_resolves_in_current_language() {
        let catalog = Arc::new(Catalog::embedded("en").unwrap());
        let mut language = LanguageState::new(catalog);
        assert!(language.select("fr"));

        let error = FormFeedback::for_submission(&ContactForm::new("Ada", "ada", "Hi"), &language);
        assert_eq!(error.kind, FeedbackKind::Error);
        assert_eq!(error.message_key, "form.errorEmail");
        assert!(!error.text.is_empty());
        assert!(!error.should_reset());

        let ok = FormFeedback::for_submission(
            &ContactForm::new("Ada", "ada@example.com", "Hi"),
            &language,
        );
        assert_eq!(ok.message_key, SUCCESS_KEY);
        assert_eq!(ok.text, language.catalog().resolve("fr", SUCCESS_KEY));
        assert!(ok.should_reset());
    }
}
