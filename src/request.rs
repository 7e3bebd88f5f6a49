//! Typed-in question requests and their schema validation.
//!
//! [`ProcessTextRequest::from_json`] checks an arbitrary JSON body and
//! collects *every* violation rather than stopping at the first, so a client
//! can fix its request in one round trip.

use crate::error::{FieldError, SolveError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A question paper supplied as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessTextRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl ProcessTextRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Validate a raw JSON body.
    ///
    /// `text` must be a string of at least one character; `filename`, when
    /// present and not null, must be a string.
    pub fn from_json(body: &Value) -> Result<Self, SolveError> {
        let Some(obj) = body.as_object() else {
            return Err(SolveError::Validation {
                errors: vec![FieldError::new(
                    &[],
                    "invalid_type",
                    format!("Expected object, received {}", json_type(body)),
                )],
            });
        };

        let mut errors = Vec::new();

        let text = match obj.get("text") {
            None | Some(Value::Null) => {
                errors.push(FieldError::new(&["text"], "invalid_type", "Required"));
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                errors.push(FieldError::new(
                    &["text"],
                    "invalid_type",
                    format!("Expected string, received {}", json_type(other)),
                ));
                None
            }
        };

        let filename = match obj.get("filename") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                errors.push(FieldError::new(
                    &["filename"],
                    "invalid_type",
                    format!("Expected string, received {}", json_type(other)),
                ));
                None
            }
        };

        if let Some(ref t) = text {
            if t.is_empty() {
                errors.push(too_short());
            }
        }

        match text {
            Some(text) if errors.is_empty() => Ok(Self { text, filename }),
            _ => Err(SolveError::Validation { errors }),
        }
    }

    /// Validate a request built in code.
    pub fn validate(&self) -> Result<(), SolveError> {
        if self.text.is_empty() {
            return Err(SolveError::Validation {
                errors: vec![too_short()],
            });
        }
        Ok(())
    }
}

fn too_short() -> FieldError {
    FieldError::new(&["text"], "too_small", "Question text is required")
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
