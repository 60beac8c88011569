use resilience::Retryable;
use thiserror::Error;

/// Errors surfaced by the vector store gateway.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Throttling, server-side or transport failure. Retried.
    #[error("vector store request failed: {message}")]
    Service { message: String },
    /// The index or its bucket does not exist.
    #[error("index '{index}' not found in bucket '{bucket}'")]
    IndexNotFound { index: String, bucket: String },
    /// The caller lacks permission on the index.
    #[error(
        "access denied to index '{index}' in bucket '{bucket}'; ensure the caller has s3vectors permissions ({message})"
    )]
    AccessDenied {
        index: String,
        bucket: String,
        message: String,
    },
    /// The store rejected the request, e.g. a vector of the wrong dimension.
    #[error("vector store rejected the request: {0}")]
    Validation(String),
    /// The response could not be interpreted, or the request could not be
    /// built.
    #[error("unexpected vector store response: {0}")]
    Protocol(String),
}

impl StoreError {
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }
}

impl Retryable for StoreError {
    fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Service { .. })
    }
}

/// Maps a remote error code onto the local taxonomy.
///
/// Unknown or missing codes are treated as transient.
pub fn classify_fault(code: Option<&str>, message: String, bucket: &str, index: &str) -> StoreError {
    match code {
        Some("NotFoundException") => StoreError::IndexNotFound {
            index: index.to_string(),
            bucket: bucket.to_string(),
        },
        Some("AccessDeniedException" | "AccessDenied") => StoreError::AccessDenied {
            index: index.to_string(),
            bucket: bucket.to_string(),
            message,
        },
        Some("ValidationException") => StoreError::Validation(message),
        _ => StoreError::Service { message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_codes() {
        let not_found = classify_fault(Some("NotFoundException"), "x".into(), "docs", "main");
        assert_eq!(
            not_found,
            StoreError::IndexNotFound {
                index: "main".into(),
                bucket: "docs".into()
            }
        );
        assert_eq!(
            not_found.to_string(),
            "index 'main' not found in bucket 'docs'"
        );

        for code in ["AccessDeniedException", "AccessDenied"] {
            let err = classify_fault(Some(code), "nope".into(), "docs", "main");
            assert!(matches!(err, StoreError::AccessDenied { .. }));
            assert!(err.to_string().contains("'main'"));
            assert!(err.to_string().contains("'docs'"));
        }

        assert!(matches!(
            classify_fault(Some("ValidationException"), "dim".into(), "b", "i"),
            StoreError::Validation(_)
        ));
    }

    #[test]
    fn unknown_codes_are_transient() {
        for code in [Some("ThrottlingException"), Some("ServiceUnavailable"), None] {
            let err = classify_fault(code, "boom".into(), "b", "i");
            assert!(err.is_retryable(), "{code:?} should be retryable");
        }
    }

    #[test]
    fn terminal_faults_are_not_retryable() {
        assert!(!StoreError::IndexNotFound {
            index: "i".into(),
            bucket: "b".into()
        }
        .is_retryable());
        assert!(!StoreError::Validation("x".into()).is_retryable());
        assert!(!StoreError::Protocol("x".into()).is_retryable());
    }
}
