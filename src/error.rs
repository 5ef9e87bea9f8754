//! Error types for compkit
//!
//! All modules use `CompkitResult<T>` as their return type.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for compkit operations
pub type CompkitResult<T> = Result<T, CompkitError>;

/// All errors that can occur in compkit
#[derive(Error, Debug)]
pub enum CompkitError {
    // Resolution errors
    #[error("Component not found: {name}{}", .required_by.as_ref().map(|p| format!(" (required by {})", p)).unwrap_or_default())]
    ComponentNotFound {
        name: String,
        required_by: Option<String>,
    },

    // Registry errors
    #[error("Failed to fetch {component}: {reason}")]
    FetchFailed { component: String, reason: String },

    #[error("Invalid registry response: {0}")]
    RegistryInvalid(String),

    #[error("{message} (timed out after {}ms)", .after.as_millis())]
    Timeout { message: String, after: Duration },

    // Installation errors
    #[error("File already exists: {0}")]
    FileExists(PathBuf),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path: {path}: {reason}")]
    PathInvalid { path: PathBuf, reason: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid workspace pattern: {0}")]
    Glob(#[from] globset::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl CompkitError {
    /// Create an IO error with context, classified by error kind
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        let context = context.into();
        let context = match classify_io(source.kind()) {
            Some(class) => format!("{} ({})", context, class),
            None => context,
        };
        Self::Io { context, source }
    }

    /// Create a component-not-found error for a requested name
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::ComponentNotFound {
            name: name.into(),
            required_by: None,
        }
    }

    /// Create a fetch failure error
    pub fn fetch(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FetchFailed {
            component: component.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::FetchFailed { .. } | Self::Timeout { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ComponentNotFound { .. } => Some("Run: compkit search to list available components"),
            Self::FileExists(_) => Some("Re-run with --overwrite to replace existing files"),
            Self::FetchFailed { .. } | Self::Timeout { .. } => {
                Some("Check registry.url in your config or set COMPKIT_REGISTRY")
            }
            Self::ConfigInvalid { .. } => Some("Run: compkit config show"),
            _ => None,
        }
    }
}

/// Classify an IO error kind for display: not-found vs permission vs other
pub fn classify_io(kind: ErrorKind) -> Option<&'static str> {
    match kind {
        ErrorKind::NotFound => Some("not found"),
        ErrorKind::PermissionDenied => Some("permission denied"),
        _ => None,
    }
}
