use serde::{Deserialize, Serialize};

/// Eligibility markers the upstream entitlement pipeline uses for a granted service.
pub const POSITIVE_ELIGIBILITY: [&str; 3] = ["yes", "yesDelay", "yesImmed"];

/// One per-service entitlement record as published by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementRecord {
    pub system: String,
    #[serde(default)]
    pub eligibility: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl EntitlementRecord {
    pub fn new(system: impl Into<String>, eligibility: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            eligibility: eligibility.into(),
            ..Self::default()
        }
    }

    pub fn is_positive(&self) -> bool {
        POSITIVE_ELIGIBILITY.contains(&self.eligibility.as_str())
    }
}

/// Returns the first record for `service` that grants it, if any.
pub fn find_granting_record<'a>(
    records: &'a [EntitlementRecord],
    service: &str,
) -> Option<&'a EntitlementRecord> {
    records
        .iter()
        .find(|record| record.system == service && record.is_positive())
}

pub fn has_service_entitlement(records: &[EntitlementRecord], service: &str) -> bool {
    find_granting_record(records, service).is_some()
}
