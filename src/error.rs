use thiserror::Error;


/// Failures that happen outside of evaluation. Anything that goes wrong while
/// evaluating is an [`crate::Value::Error`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RokError {
    #[error("invalid token at offset {offset}")]
    InvalidToken { offset: usize },

    #[error("syntax error: {0}")]
    SyntaxError(String),

    #[error("could not read '{path}': {reason}")]
    Io { path: String, reason: String },
}

impl RokError {
    pub(crate) fn io(path: &str, error: std::io::Error) -> Self {
        Self::Io { path: path.to_owned(), reason: error.to_string() }
    }
}
