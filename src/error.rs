//! Gateway error taxonomy and the Remote API error envelope.
//!
//! ERROR HANDLING
//! ==============
//! Every expected failure (bad credentials, rejected form, missing record)
//! comes back as a `GatewayError` value. Session teardown is the only failure
//! that mutates shared state, and it still surfaces as an ordinary error.
//!
//! The Remote API reports failures as either `{message}` or
//! `{error: {field: [messages]}}`. Laravel's `errors` key is read as well and
//! merged in. Field maps are collected into a `BTreeMap` so messages come out
//! in a stable order.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

// =============================================================================
// ERROR CODES
// =============================================================================

/// Stable machine-readable code attached to an error.
pub trait ErrorCode: fmt::Display {
    fn error_code(&self) -> &'static str;
}

// =============================================================================
// FIELD ERRORS
// =============================================================================

/// One invalid form field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// GATEWAY ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No token is stored; the caller must send the user to the login screen.
    #[error("not signed in")]
    Unauthenticated,

    /// A 401 survived the refresh attempt; the session has been torn down.
    #[error("Session expired. Please login again.")]
    SessionExpired,

    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Transport(String),

    /// Client-side validation rejected the input before any request was sent.
    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    /// The Remote API answered with a non-success status.
    #[error("request rejected with status {status}")]
    Rejected { status: u16, message: Option<String>, fields: Vec<FieldError> },

    /// A success response did not match the documented shape.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The local token store could not be read or written.
    #[error("token store failed: {0}")]
    Store(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl GatewayError {
    /// Build a `Rejected` error from a non-success status and its body.
    #[must_use]
    pub fn rejected(status: u16, body: &str) -> Self {
        let envelope = parse_error_body(body);
        Self::Rejected { status, message: envelope.message, fields: envelope.fields }
    }

    /// Build a single-field client-side validation error.
    #[must_use]
    pub fn invalid(field: &str, message: &str) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    /// `true` when the caller should redirect to the login surface.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::SessionExpired)
    }

    /// HTTP status of a rejected request, if there was one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// One user-visible line per problem: every field error individually,
    /// otherwise the server's message, otherwise the display string.
    #[must_use]
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            Self::Validation(fields) => fields.iter().map(ToString::to_string).collect(),
            Self::Rejected { status, message, fields } => {
                if !fields.is_empty() {
                    return fields.iter().map(ToString::to_string).collect();
                }
                vec![message.clone().unwrap_or_else(|| format!("request failed with status {status}"))]
            }
            other => vec![other.to_string()],
        }
    }
}

impl ErrorCode for GatewayError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "E_UNAUTHENTICATED",
            Self::SessionExpired => "E_SESSION_EXPIRED",
            Self::Transport(_) => "E_TRANSPORT",
            Self::Validation(_) => "E_VALIDATION",
            Self::Rejected { .. } => "E_REJECTED",
            Self::Parse(_) => "E_PARSE",
            Self::Store(_) => "E_STORE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }
}

// =============================================================================
// ERROR ENVELOPE
// =============================================================================

/// Decoded error envelope.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub message: Option<String>,
    pub fields: Vec<FieldError>,
}

/// Decode a non-success body. Bodies that are not JSON objects decode to an
/// empty envelope; the status code still tells the story. Each key is read
/// on its own, so an odd `error` value never hides a readable `message`.
#[must_use]
pub fn parse_error_body(body: &str) -> ErrorEnvelope {
    let Ok(Value::Object(root)) = serde_json::from_str::<Value>(body) else {
        return ErrorEnvelope::default();
    };

    let mut message = root.get("message").and_then(Value::as_str).map(ToOwned::to_owned);
    let mut by_field: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for key in ["error", "errors"] {
        match root.get(key) {
            Some(Value::Object(map)) => {
                for (field, value) in map {
                    let messages = by_field.entry(field.clone()).or_default();
                    for text in field_messages(value) {
                        if !messages.contains(&text) {
                            messages.push(text);
                        }
                    }
                }
            }
            Some(Value::String(text)) if message.is_none() => message = Some(text.clone()),
            _ => {}
        }
    }

    let fields = by_field
        .into_iter()
        .flat_map(|(field, messages)| messages.into_iter().map(move |text| FieldError::new(field.clone(), text)))
        .collect();
    ErrorEnvelope { message, fields }
}

/// A field maps to one message or a list of them.
fn field_messages(value: &Value) -> Vec<String> {
    match value {
        Value::String(text) => vec![text.clone()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).map(ToOwned::to_owned).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
