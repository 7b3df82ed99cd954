//! Decoding and validation of inbound contact submissions

use axum::http::{header, HeaderMap};
use serde_json::Value;

/// Raw fields pulled out of a request body. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

/// A submission with all three fields present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl SubmissionFields {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            message: Some(message.into()),
        }
    }

    /// Form-encoded bodies are decoded as forms; everything else is tried as
    /// a JSON object. Undecodable bodies yield no fields at all.
    pub fn from_body(headers: &HeaderMap, body: &[u8]) -> Self {
        if is_form_encoded(headers) {
            Self::from_form(body)
        } else {
            Self::from_json(body)
        }
    }

    pub fn from_json(body: &[u8]) -> Self {
        let object = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(object)) => object,
            _ => return Self::default(),
        };

        let field = |key: &str| match object.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };

        Self {
            name: field("name"),
            email: field("email"),
            message: field("message"),
        }
    }

    pub fn from_form(body: &[u8]) -> Self {
        let mut fields = Self::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            let slot = match key.as_ref() {
                "name" => &mut fields.name,
                "email" => &mut fields.email,
                "message" => &mut fields.message,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        fields
    }

    /// Presence check only: the email is not checked for shape.
    pub fn into_submission(self) -> Option<Submission> {
        let present = |value: Option<String>| value.filter(|v| !v.is_empty());
        Some(Submission {
            name: present(self.name)?,
            email: present(self.email)?,
            message: present(self.message)?,
        })
    }
}

fn is_form_encoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .map(|mime| mime.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str())
        .unwrap_or(false)
}
