use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Updates never create blocks; the name must already be present.
    BlockNotFound(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::BlockNotFound(name) => write!(f, "block '{}' not found in model", name),
        }
    }
}

impl std::error::Error for StoreError {}
