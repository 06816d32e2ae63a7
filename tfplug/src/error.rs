//! Error types for tfplug

/// Error type for tfplug operations
#[derive(Debug, thiserror::Error)]
pub enum TfplugError {
    #[error("Resource type not found: {0}")]
    ResourceNotFound(String),

    #[error("Data source type not found: {0}")]
    DataSourceNotFound(String),

    #[error("Provider not configured")]
    ProviderNotConfigured,

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Message of {size} bytes exceeds the limit of {limit} bytes")]
    MessageTooLarge { size: usize, limit: usize },
}

/// Result type alias for tfplug operations
pub type Result<T> = std::result::Result<T, TfplugError>;

impl From<TfplugError> for crate::types::Diagnostic {
    fn from(err: TfplugError) -> Self {
        let summary = match &err {
            TfplugError::ResourceNotFound(_) | TfplugError::DataSourceNotFound(_) => {
                "Unknown type name"
            }
            TfplugError::ProviderNotConfigured => "Provider not configured",
            TfplugError::EncodingError(_) | TfplugError::DecodingError(_) => {
                "Invalid value encoding"
            }
            TfplugError::MessageTooLarge { .. } => "Message too large",
        };
        crate::types::Diagnostic::error(summary, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Diagnostic, DiagnosticSeverity};

    #[test]
    fn errors_convert_to_error_diagnostics() {
        let diag: Diagnostic = TfplugError::DataSourceNotFound("kickflow_group".into()).into();
        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert_eq!(diag.summary, "Unknown type name");
        assert_eq!(
            diag.detail.as_deref(),
            Some("Data source type not found: kickflow_group")
        );
    }

    #[test]
    fn message_limit_is_reported_with_sizes() {
        let err = TfplugError::MessageTooLarge {
            size: 2048,
            limit: 1024,
        };
        assert_eq!(
            err.to_string(),
            "Message of 2048 bytes exceeds the limit of 1024 bytes"
        );
    }
}
