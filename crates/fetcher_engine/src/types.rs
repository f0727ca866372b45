use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// One URL submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchRequest {
    pub url: String,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl From<&str> for FetchRequest {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for FetchRequest {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}

/// Protocol-level facts about a response, known before the body is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMetadata {
    pub status_code: u16,
    pub content_type: Option<String>,
    pub declared_length: Option<u64>,
    pub final_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedImage {
    pub filename: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub content_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    Duplicate { content_hash: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    Success(SavedImage),
    Skipped(SkipReason),
    Failure(FetchError),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, FetchOutcome::Skipped(SkipReason::Duplicate { .. }))
    }

    pub fn failure_kind(&self) -> Option<&FailureKind> {
        match self {
            FetchOutcome::Failure(err) => Some(&err.kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    InvalidUrl,
    Network,
    Validation { reason: RejectReason },
    SizeLimitExceeded { max_bytes: u64, actual: Option<u64> },
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Validation { reason } => write!(f, "validation error ({reason})"),
            FailureKind::SizeLimitExceeded { max_bytes, actual } => match actual {
                Some(actual) => write!(f, "size limit exceeded ({actual} > {max_bytes} bytes)"),
                None => write!(f, "size limit exceeded (max {max_bytes} bytes)"),
            },
            FailureKind::Io => write!(f, "file system error"),
        }
    }
}

/// Why the response validator refused a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum RejectReason {
    HttpStatus { status: u16 },
    NotAnImage { content_type: String },
    DeclaredTooLarge { declared: u64, max_bytes: u64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::HttpStatus { status } => write!(f, "http status {status}"),
            RejectReason::NotAnImage { content_type } => {
                write!(f, "content type '{content_type}' is not an image")
            }
            RejectReason::DeclaredTooLarge {
                declared,
                max_bytes,
            } => write!(f, "declared length {declared} exceeds {max_bytes} bytes"),
        }
    }
}
