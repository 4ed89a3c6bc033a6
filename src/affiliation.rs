use std::{fmt, str::FromStr, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Institutional role tiers, declared in descending precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Affiliation {
    Faculty,
    RegularStaff,
    Student,
    TemporaryStaff,
    SponsoredAffiliate,
    Retiree,
    Alumni,
    Unknown,
}

impl Affiliation {
    /// Every matchable tier, highest first. `Unknown` is the fallback and never matched.
    pub const PRECEDENCE: [Affiliation; 7] = [
        Affiliation::Faculty,
        Affiliation::RegularStaff,
        Affiliation::Student,
        Affiliation::TemporaryStaff,
        Affiliation::SponsoredAffiliate,
        Affiliation::Retiree,
        Affiliation::Alumni,
    ];

    /// Tiers a service policy may list directly.
    pub const POLICY_ASSIGNABLE: [Affiliation; 6] = [
        Affiliation::Faculty,
        Affiliation::RegularStaff,
        Affiliation::Student,
        Affiliation::TemporaryStaff,
        Affiliation::Alumni,
        Affiliation::Retiree,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Affiliation::Faculty => "Faculty",
            Affiliation::RegularStaff => "RegularStaff",
            Affiliation::Student => "Student",
            Affiliation::TemporaryStaff => "TemporaryStaff",
            Affiliation::SponsoredAffiliate => "SponsoredAffiliate",
            Affiliation::Retiree => "Retiree",
            Affiliation::Alumni => "Alumni",
            Affiliation::Unknown => "Unknown",
        }
    }

    /// Resolves the governing tier from raw directory role strings.
    ///
    /// Raw roles carry campus suffixes (`FacultyAA`, `StudentFLNT`), so a tier
    /// matches when any raw string contains its name.
    pub fn resolve<S: AsRef<str>>(raw_roles: &[S]) -> Affiliation {
        Self::PRECEDENCE
            .into_iter()
            .find(|tier| {
                raw_roles
                    .iter()
                    .any(|raw| raw.as_ref().contains(tier.as_str()))
            })
            .unwrap_or(Affiliation::Unknown)
    }
}

impl fmt::Display for Affiliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown affiliation '{0}'")]
pub struct UnknownAffiliation(pub String);

impl FromStr for Affiliation {
    type Err = UnknownAffiliation;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::PRECEDENCE
            .into_iter()
            .find(|tier| tier.as_str() == value)
            .ok_or_else(|| UnknownAffiliation(value.to_string()))
    }
}

fn institutional_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^um\d+").expect("institutional id pattern must compile"))
}

/// Sponsorship level for a principal whose governing tier is `SponsoredAffiliate`.
///
/// Precedence is fixed: an institutional `um<digits>` id is level 3, otherwise an
/// entity id in the `99` range is level 2, otherwise level 1. Any other tier
/// yields `None`.
pub fn sponsorship_level(
    highest: Affiliation,
    principal_id: &str,
    entity_id: &str,
) -> Option<u8> {
    if highest != Affiliation::SponsoredAffiliate {
        return None;
    }

    if institutional_id_pattern().is_match(principal_id) {
        Some(3)
    } else if entity_id.starts_with("99") {
        Some(2)
    } else {
        Some(1)
    }
}
