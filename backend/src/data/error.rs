//! Error types for artifact loading.
//!
//! Only artifact-level failures are errors. Per-row and per-field anomalies are
//! absorbed by the pipeline as absent data and never surface here.

use std::fmt;
use std::path::{Path, PathBuf};

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Structured context describing where a dataset error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "load_artifact", "reload")
    pub operation: Option<String>,
    /// The artifact element involved (e.g., "table", "day_to_week")
    pub entity: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    /// Set the entity involved.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Set additional details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref entity) = self.entity {
            parts.push(format!("entity={}", entity));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for dataset operations
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The backing artifact does not exist. Fatal for the API boundary.
    #[error("Missing file at {}. Put kepler_data.json at the configured data path {context}", .path.display())]
    MissingArtifact { path: PathBuf, context: ErrorContext },

    /// The artifact exists but could not be read.
    #[error("Failed to read artifact: {message} {context}")]
    Io {
        message: String,
        context: ErrorContext,
    },

    /// The artifact is not valid JSON or an element has the wrong type.
    #[error("Malformed artifact at '{path}': {message} {context}")]
    Parse {
        /// JSON path of the offending element (`.` for the document itself).
        path: String,
        message: String,
        context: ErrorContext,
    },

    /// The top-level document is neither an object nor an array.
    #[error("Invalid artifact shape: {message} {context}")]
    InvalidShape {
        message: String,
        context: ErrorContext,
    },
}

impl DatasetError {
    /// Create a missing-artifact error for `path`.
    pub fn missing(path: impl AsRef<Path>) -> Self {
        Self::MissingArtifact {
            path: path.as_ref().to_path_buf(),
            context: ErrorContext::new("load_artifact"),
        }
    }

    /// Create an IO error with context.
    pub fn io_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Io {
            message: message.into(),
            context,
        }
    }

    /// Create a parse error at a JSON path.
    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
            context: ErrorContext::new("parse_artifact"),
        }
    }

    /// Create a shape error.
    pub fn invalid_shape(message: impl Into<String>) -> Self {
        Self::InvalidShape {
            message: message.into(),
            context: ErrorContext::new("parse_artifact"),
        }
    }

    /// Whether this is the missing-artifact case.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::MissingArtifact { .. })
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::MissingArtifact { context, .. }
            | Self::Io { context, .. }
            | Self::Parse { context, .. }
            | Self::InvalidShape { context, .. } => context,
        }
    }

    /// Attach extra details to the existing context.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        let details = details.into();
        match &mut self {
            Self::MissingArtifact { context, .. }
            | Self::Io { context, .. }
            | Self::Parse { context, .. }
            | Self::InvalidShape { context, .. } => {
                context.details = Some(details);
            }
        }
        self
    }
}

impl From<serde_path_to_error::Error<serde_json::Error>> for DatasetError {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = err.path().to_string();
        let entity = path.split('.').next().unwrap_or_default().to_string();
        Self::Parse {
            path,
            message: err.into_inner().to_string(),
            context: ErrorContext::new("parse_artifact").with_entity(entity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_message_names_path() {
        let err = DatasetError::missing("/srv/data/kepler_data.json");
        assert!(err.is_missing());
        let msg = err.to_string();
        assert!(msg.contains("Missing file at /srv/data/kepler_data.json"));
        assert!(msg.contains("operation=load_artifact"));
    }

    #[test]
    fn test_context_display() {
        let ctx = ErrorContext::new("reload")
            .with_entity("table")
            .with_details("row 3");
        assert_eq!(
            ctx.to_string(),
            "[operation=reload, entity=table, details=row 3]"
        );
        assert_eq!(ErrorContext::default().to_string(), "[]");
    }

    #[test]
    fn test_with_details_updates_context() {
        let err = DatasetError::parse("table", "invalid type").with_details("expected array");
        assert_eq!(err.context().details.as_deref(), Some("expected array"));
        assert!(!err.is_missing());
    }
}
