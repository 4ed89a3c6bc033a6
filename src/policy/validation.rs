use std::fmt;

use thiserror::Error;

use crate::{
    affiliation::Affiliation,
    policy::{
        error::ConfigError,
        types::{SUPER_ADMIN_GROUP, ServicePolicy},
    },
};

/// Eligible affiliation lists shorter than this are flagged for review.
pub const CORE_AFFILIATION_COUNT: usize = 4;

/// A policy defect that makes the engine unsafe to run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("collab-iam-admins is missing from override_groups: {configured:?}")]
    MissingSuperAdminGroup { configured: Vec<String> },
    #[error("eligible_affiliations cannot be empty")]
    EmptyEligibleAffiliations,
    #[error(
        "SponsoredAffiliate cannot be in eligible_affiliations; eligible sponsorship levels go in eligible_sponsorship_levels"
    )]
    SponsoredAffiliateListed,
    #[error(
        "eligible_affiliations contains an unfamiliar affiliation {value} (should be one of Faculty, RegularStaff, Student, TemporaryStaff, Alumni, Retiree)"
    )]
    UnfamiliarAffiliation { value: String },
    #[error("eligible_sponsorship_levels contains an invalid entry {level} (must be 1, 2, and/or 3)")]
    InvalidSponsorshipLevel { level: u8 },
}

/// A suspicious but legal policy setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyAdvisory {
    ShortAffiliationList { affiliations: Vec<String> },
    NoSponsoredAffiliates,
}

impl fmt::Display for PolicyAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyAdvisory::ShortAffiliationList { affiliations } => write!(
                f,
                "eligible_affiliations is unusually short: {affiliations:?}. Faculty, RegularStaff, Student, and TemporaryStaff are eligible for almost every service; are you sure?"
            ),
            PolicyAdvisory::NoSponsoredAffiliates => write!(
                f,
                "eligible_sponsorship_levels is empty. Are you sure that no sponsored affiliates are eligible?"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyValidation {
    pub violations: Vec<PolicyViolation>,
    pub advisories: Vec<PolicyAdvisory>,
}

impl PolicyValidation {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn into_result(self) -> Result<Vec<PolicyAdvisory>, ConfigError> {
        if self.violations.is_empty() {
            Ok(self.advisories)
        } else {
            Err(ConfigError::InvalidPolicy {
                violations: self.violations,
            })
        }
    }
}

impl ServicePolicy {
    /// Checks every rule independently and reports all findings at once.
    pub fn validate(&self) -> PolicyValidation {
        let mut report = PolicyValidation::default();

        if !self.override_groups.contains(SUPER_ADMIN_GROUP) {
            report.violations.push(PolicyViolation::MissingSuperAdminGroup {
                configured: self.override_groups.iter().cloned().collect(),
            });
        }

        if self.eligible_affiliations.is_empty() {
            report
                .violations
                .push(PolicyViolation::EmptyEligibleAffiliations);
        } else {
            for value in &self.eligible_affiliations {
                match value.parse::<Affiliation>() {
                    Ok(Affiliation::SponsoredAffiliate) => report
                        .violations
                        .push(PolicyViolation::SponsoredAffiliateListed),
                    Ok(tier) if Affiliation::POLICY_ASSIGNABLE.contains(&tier) => {}
                    _ => report.violations.push(PolicyViolation::UnfamiliarAffiliation {
                        value: value.clone(),
                    }),
                }
            }
            if self.eligible_affiliations.len() < CORE_AFFILIATION_COUNT {
                report.advisories.push(PolicyAdvisory::ShortAffiliationList {
                    affiliations: self.eligible_affiliations.iter().cloned().collect(),
                });
            }
        }

        if self.eligible_sponsorship_levels.is_empty() {
            report.advisories.push(PolicyAdvisory::NoSponsoredAffiliates);
        }
        for &level in &self.eligible_sponsorship_levels {
            if !(1..=3).contains(&level) {
                report
                    .violations
                    .push(PolicyViolation::InvalidSponsorshipLevel { level });
            }
        }

        report
    }
}
