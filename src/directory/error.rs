use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryErrorKind {
    NotFound,
    Decode,
    Backend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryError {
    pub kind: DirectoryErrorKind,
    pub message: String,
}

impl DirectoryError {
    pub fn new(kind: DirectoryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == DirectoryErrorKind::NotFound
    }
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DirectoryError {}

pub fn not_found(message: impl Into<String>) -> DirectoryError {
    DirectoryError::new(DirectoryErrorKind::NotFound, message)
}

pub fn decode_error(message: impl Into<String>) -> DirectoryError {
    DirectoryError::new(DirectoryErrorKind::Decode, message)
}

pub fn backend_failure(message: impl Into<String>) -> DirectoryError {
    DirectoryError::new(DirectoryErrorKind::Backend, message)
}
