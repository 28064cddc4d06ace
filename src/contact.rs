//! Contact form: field validation, wire types and the submit state machine.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// Loose shape used in the browser before submitting.
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("valid email shape pattern"));

// Stricter whole-string check the relay applies.
static RELAY_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid relay email pattern")
});

pub const SUCCESS_BANNER: &str =
    "Thank you! Your message has been sent successfully. We'll get back to you soon.";
pub const ERROR_BANNER: &str =
    "Sorry, there was an error sending your message. Please try again.";

/// Email shape accepted by the form.
pub fn email_looks_valid(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}

/// Email format accepted by the relay.
pub fn relay_email_valid(email: &str) -> bool {
    RELAY_EMAIL.is_match(email)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FullName,
    Email,
    Subject,
    Message,
}

impl Field {
    /// Parses the form control name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "fullName" | "name" => Some(Field::FullName),
            "email" => Some(Field::Email),
            "subject" => Some(Field::Subject),
            "message" => Some(Field::Message),
            _ => None,
        }
    }
}

/// The request body `POST /api/contact` takes. The relay also accepts `name`
/// for `fullName`; missing fields deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactForm {
    #[serde(alias = "name")]
    pub full_name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

impl ContactResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Per-field validation messages. A `None` field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub full_name: Option<&'static str>,
    pub email: Option<&'static str>,
    pub subject: Option<&'static str>,
    pub message: Option<&'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.email.is_none()
            && self.subject.is_none()
            && self.message.is_none()
    }

    pub fn get(&self, field: Field) -> Option<&'static str> {
        match field {
            Field::FullName => self.full_name,
            Field::Email => self.email,
            Field::Subject => self.subject,
            Field::Message => self.message,
        }
    }

    pub fn clear(&mut self, field: Field) {
        match field {
            Field::FullName => self.full_name = None,
            Field::Email => self.email = None,
            Field::Subject => self.subject = None,
            Field::Message => self.message = None,
        }
    }
}

impl ContactForm {
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::FullName => &self.full_name,
            Field::Email => &self.email,
            Field::Subject => &self.subject,
            Field::Message => &self.message,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::FullName => &mut self.full_name,
            Field::Email => &mut self.email,
            Field::Subject => &mut self.subject,
            Field::Message => &mut self.message,
        }
    }

    /// Client-side checks run before anything is sent.
    pub fn validate(&self) -> FieldErrors {
        let required = |value: &str, message| value.trim().is_empty().then_some(message);
        FieldErrors {
            full_name: required(&self.full_name, "Full name is required"),
            email: required(&self.email, "Email is required").or_else(|| {
                (!email_looks_valid(&self.email)).then_some("Email is invalid")
            }),
            subject: required(&self.subject, "Subject is required"),
            message: required(&self.message, "Message is required"),
        }
    }

    /// True when any field is missing, as the relay counts it.
    pub fn has_missing_field(&self) -> bool {
        [&self.full_name, &self.email, &self.subject, &self.message]
            .iter()
            .any(|v| v.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Success,
    Error,
}

impl SubmitStatus {
    pub fn banner(self) -> Option<&'static str> {
        match self {
            SubmitStatus::Idle => None,
            SubmitStatus::Success => Some(SUCCESS_BANNER),
            SubmitStatus::Error => Some(ERROR_BANNER),
        }
    }
}

/// Form values, errors and submission progress, independent of any UI.
#[derive(Debug, Clone, Default)]
pub struct ContactFormState {
    form: ContactForm,
    errors: FieldErrors,
    status: SubmitStatus,
    submitting: bool,
}

impl ContactFormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn status(&self) -> SubmitStatus {
        self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Updates a field. Typing into a field clears its error.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        *self.form.field_mut(field) = value.into();
        self.errors.clear(field);
    }

    /// Starts a submission. Returns the payload to send, or `None` when
    /// validation failed (errors are then set and nothing is in flight).
    pub fn begin_submit(&mut self) -> Result<Option<ContactForm>> {
        if self.submitting {
            return Err(Error::SubmitInFlight);
        }
        self.errors = self.form.validate();
        if !self.errors.is_empty() {
            return Ok(None);
        }
        self.submitting = true;
        self.status = SubmitStatus::Idle;
        Ok(Some(self.form.clone()))
    }

    /// Resolves the in-flight submission. Success clears the form.
    pub fn finish_submit(&mut self, outcome: Result<ContactResponse>) -> SubmitStatus {
        if !self.submitting {
            tracing::warn!("submission result arrived with nothing in flight");
            return self.status;
        }
        self.submitting = false;
        self.status = match outcome {
            Ok(response) if response.success => {
                self.form = ContactForm::default();
                SubmitStatus::Success
            }
            Ok(response) => {
                tracing::warn!(message = %response.message, "contact relay refused submission");
                SubmitStatus::Error
            }
            Err(err) => {
                tracing::warn!(error = %err, "contact submission failed");
                SubmitStatus::Error
            }
        };
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(email_looks_valid("a@b.co"));
        assert!(!email_looks_valid("a@b"));
        assert!(relay_email_valid("someone@example.com"));
        assert!(!relay_email_valid("some one@example.com"));
        // The form shape is a substring test, the relay anchors.
        assert!(email_looks_valid("x some@one.com"));
        assert!(!relay_email_valid("x some@one.com"));
    }

    #[test]
    fn wire_names_are_camel_case() {
        let form: ContactForm = serde_json::from_str(
            r#"{"name":"Ada","email":"ada@example.com","subject":"Hi","message":"Hello"}"#,
        )
        .unwrap();
        assert_eq!(form.full_name, "Ada");
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["fullName"], "Ada");
    }

    #[test]
    fn missing_fields_deserialize_empty() {
        let form: ContactForm = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert!(form.has_missing_field());
    }
}
