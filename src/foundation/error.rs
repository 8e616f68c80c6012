/// Convenience result type used across promoreel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Malformed or incomplete input (product record, options, configuration).
    #[error("validation error: {0}")]
    Validation(String),

    /// Frame or thumbnail drawing failure.
    #[error("render error: {0}")]
    Render(String),

    /// Narration audio could not be produced.
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// The external encoder failed, timed out, or broke its contract.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Filesystem failure creating directories or reading/writing run files.
    #[error("io error: {0}")]
    Io(String),

    /// The run was cancelled through its cancellation token.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Errors when serializing or deserializing records.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Stable, message-free classification of a [`ReelError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`ReelError::Validation`].
    Validation,
    /// See [`ReelError::Render`].
    Render,
    /// See [`ReelError::Synthesis`].
    Synthesis,
    /// See [`ReelError::Encoding`].
    Encoding,
    /// See [`ReelError::Io`].
    Io,
    /// See [`ReelError::Cancelled`].
    Cancelled,
    /// See [`ReelError::Serde`].
    Serde,
    /// See [`ReelError::Other`].
    Other,
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ReelError::Synthesis`] value.
    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::Synthesis(msg.into())
    }

    /// Build a [`ReelError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`ReelError::Io`] value describing `err` while working on `path`.
    pub fn io_at(action: &str, path: &std::path::Path, err: std::io::Error) -> Self {
        Self::Io(format!("failed to {action} '{}': {err}", path.display()))
    }

    /// Build a [`ReelError::Cancelled`] value.
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Classify this error without inspecting its message.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Render(_) => ErrorKind::Render,
            Self::Synthesis(_) => ErrorKind::Synthesis,
            Self::Encoding(_) => ErrorKind::Encoding,
            Self::Io(_) => ErrorKind::Io,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::Serde(_) => ErrorKind::Serde,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

impl From<serde_json::Error> for ReelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
