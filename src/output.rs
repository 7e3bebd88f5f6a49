//! Response payloads shared by the library, the HTTP server and the CLI.
//!
//! Field names serialise in camelCase so the JSON matches what browser
//! clients of the service already consume.

use crate::error::{FieldError, SolveError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filename reported for typed-in question text when the caller gave none.
pub const MANUAL_INPUT_FILENAME: &str = "Manual Input";

/// Filename reported for an upload that arrived without one.
pub const DEFAULT_UPLOAD_FILENAME: &str = "upload";

/// Successful result of a solve request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    /// Always `true`; failures are reported as errors, never as envelopes.
    pub success: bool,

    pub filename: String,

    /// Declared content type of the upload. Absent for typed-in text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,

    /// The question text the solutions were generated from.
    pub extracted_text: String,

    /// Markdown worked solutions.
    pub solutions: String,

    pub processed_at: DateTime<Utc>,
}

impl ResponseEnvelope {
    /// Envelope for typed-in question text.
    pub fn for_text(text: String, solutions: String, filename: Option<String>) -> Self {
        Self {
            success: true,
            filename: filename.unwrap_or_else(|| MANUAL_INPUT_FILENAME.to_string()),
            file_type: None,
            extracted_text: text,
            solutions,
            processed_at: Utc::now(),
        }
    }

    /// Envelope for an uploaded file.
    pub fn for_file(
        filename: &str,
        file_type: &str,
        extracted_text: String,
        solutions: String,
    ) -> Self {
        let filename = if filename.trim().is_empty() {
            DEFAULT_UPLOAD_FILENAME.to_string()
        } else {
            filename.to_string()
        };
        Self {
            success: true,
            filename,
            file_type: Some(file_type.to_string()),
            extracted_text,
            solutions,
            processed_at: Utc::now(),
        }
    }
}

/// Result of the health endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    pub llm_connected: bool,
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    pub fn ok(llm_connected: bool) -> Self {
        Self {
            status: "ok".to_string(),
            llm_connected,
            timestamp: Utc::now(),
        }
    }
}

/// Job status. Requests are processed synchronously, so every job is
/// reported as complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub job_id: String,
    pub status: String,
    pub progress: u8,
}

impl JobStatus {
    pub fn completed(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: "completed".to_string(),
            progress: 100,
        }
    }
}

/// JSON body of every failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,

    /// Field-level violations, for schema validation failures only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,

    /// Underlying cause, for failures outside the request's control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
            error: None,
        }
    }

    pub fn with_cause(message: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            error: Some(cause.into()),
            ..Self::new(message)
        }
    }
}

impl From<&SolveError> for ErrorBody {
    fn from(err: &SolveError) -> Self {
        Self {
            message: err.to_string(),
            errors: err.field_errors().map(<[FieldError]>::to_vec),
            error: None,
        }
    }
}
