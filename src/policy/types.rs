use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::affiliation::Affiliation;

/// Override group that every service must honor.
pub const SUPER_ADMIN_GROUP: &str = "collab-iam-admins";

fn default_entitlement_key() -> Option<String> {
    Some("enterprise".to_string())
}

fn default_override_groups() -> BTreeSet<String> {
    BTreeSet::from([SUPER_ADMIN_GROUP.to_string()])
}

fn default_eligible_affiliations() -> BTreeSet<String> {
    [
        Affiliation::Faculty,
        Affiliation::RegularStaff,
        Affiliation::Student,
        Affiliation::TemporaryStaff,
    ]
    .into_iter()
    .map(|tier| tier.as_str().to_string())
    .collect()
}

fn default_eligible_sponsorship_levels() -> BTreeSet<u8> {
    BTreeSet::from([1])
}

/// Declarative eligibility rules for one service.
///
/// `entitlement_key = None` means the service trusts affiliation alone.
/// Affiliation names stay as configured text so validation can name whatever
/// an operator actually wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePolicy {
    pub service_label: String,
    #[serde(default = "default_entitlement_key")]
    pub entitlement_key: Option<String>,
    #[serde(default = "default_override_groups")]
    pub override_groups: BTreeSet<String>,
    #[serde(default = "default_eligible_affiliations")]
    pub eligible_affiliations: BTreeSet<String>,
    #[serde(default = "default_eligible_sponsorship_levels")]
    pub eligible_sponsorship_levels: BTreeSet<u8>,
}

impl ServicePolicy {
    pub fn new(service_label: impl Into<String>) -> Self {
        Self {
            service_label: service_label.into(),
            entitlement_key: default_entitlement_key(),
            override_groups: default_override_groups(),
            eligible_affiliations: default_eligible_affiliations(),
            eligible_sponsorship_levels: default_eligible_sponsorship_levels(),
        }
    }

    pub fn with_entitlement_key(mut self, entitlement_key: Option<&str>) -> Self {
        self.entitlement_key = entitlement_key.map(str::to_string);
        self
    }

    pub fn with_override_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.override_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_eligible_affiliations<I, S>(mut self, affiliations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.eligible_affiliations = affiliations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_eligible_sponsorship_levels<I>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        self.eligible_sponsorship_levels = levels.into_iter().collect();
        self
    }

    pub fn admits_affiliation(&self, tier: Affiliation) -> bool {
        self.eligible_affiliations.contains(tier.as_str())
    }

    pub fn admits_sponsorship_level(&self, level: u8) -> bool {
        self.eligible_sponsorship_levels.contains(&level)
    }

    /// Short description of what decides eligibility, for log lines.
    pub fn decision_mode(&self) -> String {
        match &self.entitlement_key {
            Some(key) => format!("entitlement:{key}"),
            None => "affiliation-only".to_string(),
        }
    }
}
