use thiserror::Error;

/// Failures the pipeline branches on. Anything else bubbles as `anyhow`.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("http {status}: {url}")]
    Status { status: u16, url: String },

    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}

impl FetchError {
    /// Connection failures, timeouts and a small set of HTTP statuses
    /// (429, 500, 502, 503, 504) are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Connect(_) | FetchError::Timeout(_) => true,
            FetchError::Status { status, .. } => {
                matches!(status, 429 | 500 | 502 | 503 | 504)
            }
            FetchError::RetriesExhausted { .. } => false,
        }
    }

    /// Short machine-readable code for meta.status entries.
    pub fn code(&self) -> String {
        match self {
            FetchError::Connect(_) => "connect".to_string(),
            FetchError::Timeout(_) => "timeout".to_string(),
            FetchError::Status { status, .. } => format!("http_{status}"),
            FetchError::RetriesExhausted { .. } => "retries_exhausted".to_string(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            FetchError::Connect(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid json payload: {0}")]
    Json(String),

    #[error("payload did not match expected shape: {0}")]
    Shape(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        ParseError::Json(e.to_string())
    }
}

/// Parsed result exists but is below the minimum viable size.
#[derive(Debug, Error)]
#[error("{what}: got {got}, need at least {need}")]
pub struct CompletenessError {
    pub what: &'static str,
    pub got: usize,
    pub need: usize,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl SourceError {
    pub fn code(&self) -> String {
        match self {
            SourceError::Fetch(e) => format!("fetch_failed:{}", e.code()),
            SourceError::Parse(_) => "parse_failed".to_string(),
        }
    }
}
