//! Error types.

/// Why a skill page could not reach the ready state.
///
/// Every variant is terminal for the page instance that produced it: the view
/// switches to its error state and nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The identifier has no entry in the catalog index.
    #[error("Skill '{0}' was not found in the registry")]
    NotFound(String),

    /// The record resolved but its document could not be fetched.
    #[error("Could not load the skill document at {target}: {reason}. The SKILL.md file might be missing")]
    DocumentFetchFailed { target: String, reason: String },

    /// The catalog index itself could not be read or parsed.
    #[error("The skill index is unavailable: {0}")]
    IndexUnavailable(String),
}

impl LoadError {
    /// Short classification used in logs and the error view heading.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::NotFound(_) => "not_found",
            LoadError::DocumentFetchFailed { .. } => "document_fetch_failed",
            LoadError::IndexUnavailable(_) => "index_unavailable",
        }
    }
}

/// Clipboard write failure. Logged by callers, never shown as an error view.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("clipboard write failed: {0}")]
    WriteFailed(String),
}

/// Settings file and dotted-path errors.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Invalid value for {path}: {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("Failed to write settings to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
