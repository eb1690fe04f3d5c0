use thiserror::Error;

/// Core error type. One variant per pipeline failure kind.
///
/// Extraction degrades gracefully on low-signal text and only errors on
/// genuinely non-text input. Parsing and edit application are strict: they
/// fail fast with precise location information rather than producing a
/// silently-wrong tree.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("malformed document at byte {offset}: {message}")]
    DocumentParse { offset: usize, message: String },

    #[error("invalid edit operation: {0}")]
    InvalidOperation(String),

    #[error("invalid profile snapshot: {0}")]
    MatchingInput(String),
}

impl CoreError {
    /// Byte offset of the offending command, when this is a parse error.
    pub fn offset(&self) -> Option<usize> {
        match self {
            CoreError::DocumentParse { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}
