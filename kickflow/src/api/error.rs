use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Received unexpected status code from API: {status}")]
    Status { status: u16 },

    #[error("Failed to parse response: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("Invalid header value for {header}")]
    InvalidHeader { header: &'static str },
}
