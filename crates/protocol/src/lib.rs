use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod format;

pub use format::{grouped_count, human_bytes};

pub const PROTOCOL_SCHEMA_VERSION: u32 = 1;

/// One child of a listed directory.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ListingEntry {
    /// Share of the parent's byte total in `[0, 1]`. Zero for every entry when
    /// the parent total is zero.
    pub proportion: f64,
    pub name: String,
    pub path: String,
    pub is_folder: bool,
    pub human_size: String,
    pub file_count: u64,
    pub bytes: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ListingSummary {
    pub total_files: u64,
    pub total_bytes: u64,
    pub primary_scan_seconds: f64,
    pub headline: String,
}

impl ListingSummary {
    pub fn new(total_files: u64, total_bytes: u64, primary_scan_seconds: f64) -> Self {
        let headline = format!(
            "Primary scan took {primary_scan_seconds:.3} seconds and found {} across {} files.",
            human_bytes(total_bytes),
            grouped_count(total_files)
        );
        Self {
            total_files,
            total_bytes,
            primary_scan_seconds,
            headline,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ListingResponse {
    pub path: String,
    pub entries: Vec<ListingEntry>,
    pub summary: ListingSummary,
}

/// Progress of the scans so far, readable while a listing is running.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ScanStatus {
    pub total_files: u64,
    pub total_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_path: Option<String>,
    pub message: String,
}

impl ScanStatus {
    pub fn new(total_files: u64, total_bytes: u64, current_path: Option<String>) -> Self {
        let message = format!(
            "{} discovered across {} files",
            human_bytes(total_bytes),
            grouped_count(total_files)
        );
        Self {
            total_files,
            total_bytes,
            current_path,
            message,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RevealOutcome {
    Revealed,
    Unsupported,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Contention,
    NotFound,
    AccessDenied,
    InvalidRequest,
    Internal,
}

impl ErrorCode {
    pub fn retryable(self) -> bool {
        matches!(self, Self::Contention)
    }

    fn default_hint(self) -> Option<&'static str> {
        match self {
            Self::Contention => Some(
                "Another listing is still running. Retry shortly, and avoid issuing overlapping listings from several clients.",
            ),
            Self::NotFound => Some("Check that the path exists and is a directory."),
            Self::AccessDenied => Some("Check the permissions of the directory."),
            Self::InvalidRequest => {
                Some("Send one JSON object per line with an `action` field (list | status | reveal).")
            }
            Self::Internal => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: ErrorCode,
    pub message: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.retryable(),
            hint: code.default_hint().map(str::to_string),
        }
    }
}

/// Request accepted by the line-oriented JSON interface.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    List { path: String },
    Status,
    Reveal { path: String },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok { data: ResponseData },
    Error { error: ErrorEnvelope },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ResponseData {
    Listing(ListingResponse),
    Status(ScanStatus),
    Reveal { reveal: RevealOutcome },
}

impl Response {
    pub fn ok(data: ResponseData) -> Self {
        Self::Ok { data }
    }

    pub fn error(error: ErrorEnvelope) -> Self {
        Self::Error { error }
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_tagged_requests() {
        let request: Request = serde_json::from_str(r#"{"action":"list","path":"/tmp"}"#).unwrap();
        assert_eq!(
            request,
            Request::List {
                path: "/tmp".to_string()
            }
        );
        let request: Request = serde_json::from_str(r#"{"action":"status"}"#).unwrap();
        assert_eq!(request, Request::Status);
        assert!(serde_json::from_str::<Request>(r#"{"action":"delete"}"#).is_err());
    }

    #[test]
    fn summary_headline_is_human_readable() {
        let summary = ListingSummary::new(1_234, 1536, 2.5);
        assert_eq!(
            summary.headline,
            "Primary scan took 2.500 seconds and found 1.5 KB across 1,234 files."
        );
    }

    #[test]
    fn contention_errors_are_retryable() {
        let envelope = ErrorEnvelope::new(ErrorCode::Contention, "busy");
        assert!(envelope.retryable);
        let json = serialize_json(&Response::error(envelope)).unwrap();
        assert!(json.contains(r#""status":"error""#));
        assert!(json.contains(r#""code":"contention""#));

        assert!(!ErrorEnvelope::new(ErrorCode::NotFound, "gone").retryable);
    }

    #[test]
    fn status_message_matches_counters() {
        let status = ScanStatus::new(2, 400, None);
        assert_eq!(status.message, "400 B discovered across 2 files");
    }
}
