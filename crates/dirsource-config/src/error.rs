//! Error types for declarative configuration parsing.

use thiserror::Error;

use dirsource_core::DirSourceError;

/// Error raised while parsing configuration or registering definitions.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required attribute was absent or blank.
    #[error("{name} attribute must be specified")]
    MissingAttribute { name: &'static str },

    /// An attribute value could not be interpreted.
    #[error("invalid value '{value}' for attribute {name}: {message}")]
    InvalidAttribute {
        name: String,
        value: String,
        message: String,
    },

    /// The `when-exhausted` value matched no known action.
    #[error("unknown exhaustion action: {value}")]
    UnknownExhaustionAction { value: String },

    /// The configuration document could not be read.
    #[error("malformed configuration document: {message}")]
    Xml { message: String },

    /// A definition is already registered under the same id.
    #[error("a context source is already registered under id '{id}'")]
    DuplicateDefinition { id: String },

    /// A definition failed to materialize.
    #[error(transparent)]
    Source(#[from] DirSourceError),
}

impl ConfigError {
    /// Create a malformed-document error.
    pub fn xml(message: impl Into<String>) -> Self {
        ConfigError::Xml {
            message: message.into(),
        }
    }
}

/// Result type for configuration parsing.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::MissingAttribute { name: "username" };
        assert_eq!(err.to_string(), "username attribute must be specified");

        let err = ConfigError::UnknownExhaustionAction {
            value: "BOGUS".to_string(),
        };
        assert_eq!(err.to_string(), "unknown exhaustion action: BOGUS");

        let err = ConfigError::DuplicateDefinition {
            id: "contextSource".to_string(),
        };
        assert!(err.to_string().contains("contextSource"));
    }

    #[test]
    fn test_source_error_is_transparent() {
        let err: ConfigError = DirSourceError::invalid_configuration("bad").into();
        assert_eq!(err.to_string(), "invalid configuration: bad");
    }
}
