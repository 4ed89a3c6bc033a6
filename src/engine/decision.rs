use std::fmt;

use serde::{Deserialize, Serialize};

use crate::directory::Principal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionErrorKind {
    /// The directory has no record of the principal.
    NotFound,
    /// The directory lookup itself failed.
    Directory,
    /// Entitlement data disagrees with what the affiliation implies.
    EntitlementMismatch,
}

/// A non-fatal problem found while evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionError {
    pub kind: DecisionErrorKind,
    pub message: String,
}

impl DecisionError {
    pub fn new(kind: DecisionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for DecisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DecisionError {}

pub fn not_found(message: impl Into<String>) -> DecisionError {
    DecisionError::new(DecisionErrorKind::NotFound, message)
}

pub fn directory_failure(message: impl Into<String>) -> DecisionError {
    DecisionError::new(DecisionErrorKind::Directory, message)
}

pub fn entitlement_mismatch(message: impl Into<String>) -> DecisionError {
    DecisionError::new(DecisionErrorKind::EntitlementMismatch, message)
}

/// Outcome of one eligibility check.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub eligible: bool,
    pub reason: String,
    pub principal: Principal,
    pub error: Option<DecisionError>,
}

impl Decision {
    pub fn new(eligible: bool, reason: impl Into<String>, principal: Principal) -> Self {
        Self {
            eligible,
            reason: reason.into(),
            principal,
            error: None,
        }
    }

    pub fn with_error(mut self, error: DecisionError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
