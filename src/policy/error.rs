use thiserror::Error;

use crate::{directory::DirectoryError, policy::validation::PolicyViolation};

/// Configuration faults that prevent an engine from being built.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid service policy: {}", join_violations(.violations))]
    InvalidPolicy { violations: Vec<PolicyViolation> },
    #[error("override group {group} does not exist in the directory")]
    OverrideGroupMissing { group: String },
    #[error(
        "got 0 members for override group {group}; remove it from override_groups if it is no longer used, otherwise make sure the directory application can read its membership"
    )]
    OverrideGroupEmpty { group: String },
    #[error("failed to resolve override group {group}: {source}")]
    OverrideGroupLookup {
        group: String,
        #[source]
        source: DirectoryError,
    },
}

impl ConfigError {
    pub fn violations(&self) -> &[PolicyViolation] {
        match self {
            ConfigError::InvalidPolicy { violations } => violations,
            _ => &[],
        }
    }
}

fn join_violations(violations: &[PolicyViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
