use thiserror::Error;

/// Application-wide error types.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed MDX. `line` is 1-based when the position is known.
    #[error("{}", compile_message(.line, .message))]
    Compile { line: Option<usize>, message: String },

    /// The object store (or anything upstream of it) failed.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn compile_message(line: &Option<usize>, message: &str) -> String {
    match line {
        Some(line) => format!("MDX compile error at line {line}: {message}"),
        None => format!("MDX compile error: {message}"),
    }
}

impl AppError {
    pub fn compile_at(line: usize, message: impl Into<String>) -> Self {
        AppError::Compile {
            line: Some(line),
            message: message.into(),
        }
    }
}

/// Helper conversion from anyhow::Error
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {err}"))
    }
}
