//! Error types for directory context sources
//!
//! Error definitions with transient/permanent classification.

use thiserror::Error;

/// Error that can occur while building or using a context source.
#[derive(Debug, Error)]
pub enum DirSourceError {
    /// Context source configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Failed to establish a connection to a directory server.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Connection or checkout attempt timed out.
    #[error("connection timeout after {timeout_millis} ms")]
    ConnectionTimeout { timeout_millis: u64 },

    /// Invalid credentials provided.
    #[error("authentication failed: invalid credentials")]
    AuthenticationFailed,

    /// The pool had no available contexts and was configured to fail fast.
    #[error("context pool exhausted ({max_active} contexts in use)")]
    PoolExhausted { max_active: i32 },

    /// A pooled context failed its validation query.
    #[error("context validation failed: {message}")]
    ValidationFailed { message: String },

    /// A directory operation failed.
    #[error("operation failed: {message}")]
    OperationFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl DirSourceError {
    /// Check if this error is transient and the operation may be retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DirSourceError::ConnectionFailed { .. }
                | DirSourceError::ConnectionTimeout { .. }
                | DirSourceError::PoolExhausted { .. }
        )
    }

    /// Check if this error is permanent and retry won't help.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            DirSourceError::InvalidConfiguration { .. } => "INVALID_CONFIG",
            DirSourceError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            DirSourceError::ConnectionTimeout { .. } => "CONNECTION_TIMEOUT",
            DirSourceError::AuthenticationFailed => "AUTH_FAILED",
            DirSourceError::PoolExhausted { .. } => "POOL_EXHAUSTED",
            DirSourceError::ValidationFailed { .. } => "VALIDATION_FAILED",
            DirSourceError::OperationFailed { .. } => "OPERATION_FAILED",
        }
    }

    // Convenience constructors

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        DirSourceError::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        DirSourceError::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirSourceError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation failed error.
    pub fn validation_failed(message: impl Into<String>) -> Self {
        DirSourceError::ValidationFailed {
            message: message.into(),
        }
    }

    /// Create an operation failed error.
    pub fn operation_failed(message: impl Into<String>) -> Self {
        DirSourceError::OperationFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create an operation failed error with source.
    pub fn operation_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirSourceError::OperationFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type for context source operations.
pub type DirSourceResult<T> = Result<T, DirSourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        let transient = vec![
            DirSourceError::connection_failed("test"),
            DirSourceError::ConnectionTimeout { timeout_millis: 30 },
            DirSourceError::PoolExhausted { max_active: 8 },
        ];

        for err in transient {
            assert!(
                err.is_transient(),
                "Expected {} to be transient",
                err.error_code()
            );
        }
    }

    #[test]
    fn test_permanent_errors() {
        let permanent = vec![
            DirSourceError::AuthenticationFailed,
            DirSourceError::invalid_configuration("test"),
            DirSourceError::validation_failed("test"),
            DirSourceError::operation_failed("test"),
        ];

        for err in permanent {
            assert!(
                err.is_permanent(),
                "Expected {} to be permanent",
                err.error_code()
            );
        }
    }

    #[test]
    fn test_error_display() {
        let err = DirSourceError::ConnectionTimeout {
            timeout_millis: 500,
        };
        assert_eq!(err.to_string(), "connection timeout after 500 ms");

        let err = DirSourceError::PoolExhausted { max_active: 8 };
        assert_eq!(err.to_string(), "context pool exhausted (8 contexts in use)");
    }

    #[test]
    fn test_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::Other, "underlying");
        let err = DirSourceError::connection_failed_with_source("failed", source);

        assert!(err.is_transient());
        if let DirSourceError::ConnectionFailed { source, .. } = &err {
            assert!(source.is_some());
        } else {
            panic!("Expected ConnectionFailed variant");
        }
    }
}
