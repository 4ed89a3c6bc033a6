use std::{
    collections::BTreeMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use eligibility_checker::{
    directory::{
        DirectoryError, DirectoryPort, Group, Principal,
        error::{backend_failure, not_found},
    },
    engine::{DeprovisionError, DeprovisionPort, EligibilityEngine},
    entitlement::EntitlementRecord,
    policy::ServicePolicy,
};

pub const ADMIN_GROUP: &str = "collab-iam-admins";
pub const PRIMARY_GROUP: &str = "something-iam-primary";
pub const EMPTY_GROUP: &str = "empty-group";
pub const RETIRED_GROUP: &str = "retired-group";
pub const BROKEN_GROUP: &str = "broken-group";
pub const BROKEN_PRINCIPAL: &str = "timeout";

const ALL_ROLES: [&str; 7] = [
    "FacultyAA",
    "RegularStaffDBRN",
    "StudentFLNT",
    "TemporaryStaffFLNT",
    "SponsoredAffiliateAA",
    "Retiree",
    "AlumniAA",
];

fn granted_entitlements() -> Vec<EntitlementRecord> {
    vec![
        EntitlementRecord::new("papercut", "yesDelay"),
        EntitlementRecord::new("canvas", "yesImmed"),
        EntitlementRecord::new("adobecc", "cc"),
        EntitlementRecord::new("enterprise", "yes"),
    ]
}

fn lapsed_entitlements() -> Vec<EntitlementRecord> {
    vec![
        EntitlementRecord::new("box", "yesImmed"),
        EntitlementRecord::new("adobecc", "acct"),
        EntitlementRecord::new("canvas", "yesImmed"),
    ]
}

fn person(id: &str, roles: &[&str], entity_id: &str, granted: bool) -> Principal {
    Principal::new(id)
        .with_display_name(format!("Test {id}"))
        .with_email(format!("{id}@umich.edu"))
        .with_entity_id(entity_id)
        .with_affiliations(roles.iter().copied())
        .with_entitlements(if granted {
            granted_entitlements()
        } else {
            lapsed_entitlements()
        })
}

/// In-memory directory with lookup counters.
#[derive(Default)]
pub struct FakeDirectory {
    principals: BTreeMap<String, Principal>,
    groups: BTreeMap<String, Group>,
    principal_fetches: AtomicUsize,
    group_fetches: AtomicUsize,
}

impl FakeDirectory {
    pub fn new() -> Self {
        let sponsored = &ALL_ROLES[4..];
        let people = [
            person("nemcardf", &ALL_ROLES, "00000000", true),
            person("nemcardrs", &ALL_ROLES[1..], "00000000", true),
            person("nemcards", &ALL_ROLES[2..], "00000000", true),
            person("nemcardts", &ALL_ROLES[3..], "00000000", true),
            person("nemcardsa1", sponsored, "00000000", true),
            person("nemcardsa2", sponsored, "99000000", false),
            person("um999999", sponsored, "99000000", false),
            person("nemcardr", &ALL_ROLES[5..], "00000000", false),
            person("nemcarda", &ALL_ROLES[6..], "00000000", false),
            person("nemcardferr", &ALL_ROLES, "00000000", false),
            person("nemcardaerr", &ALL_ROLES[6..], "00000000", true),
            person("nemcardu", &["Contractor"], "00000000", false),
            Principal::new("nemcardrsn")
                .with_entity_id("00000000")
                .with_affiliations(["StudentFLNT", "RegularStaffDBRN"])
                .with_entitlements(lapsed_entitlements()),
        ];

        let groups = [
            Group::new(ADMIN_GROUP, ["nemcardf", "nemcardrs"]),
            Group::new(PRIMARY_GROUP, ["nemcarda", "nemcardts", "nemcardf"]),
            Group::new(EMPTY_GROUP, Vec::<String>::new()),
            Group::missing(RETIRED_GROUP),
        ];

        Self {
            principals: people
                .into_iter()
                .map(|principal| (principal.id().to_string(), principal))
                .collect(),
            groups: groups
                .into_iter()
                .map(|group| (group.name.clone(), group))
                .collect(),
            ..Self::default()
        }
    }

    pub fn group_fetch_count(&self) -> usize {
        self.group_fetches.load(Ordering::SeqCst)
    }

    pub fn principal_fetch_count(&self) -> usize {
        self.principal_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DirectoryPort for FakeDirectory {
    async fn fetch_principal(&self, id: &str) -> Result<Principal, DirectoryError> {
        self.principal_fetches.fetch_add(1, Ordering::SeqCst);
        if id == BROKEN_PRINCIPAL {
            return Err(backend_failure("directory search timed out"));
        }
        self.principals
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(format!("no directory entry found for {id}")))
    }

    async fn fetch_group(&self, name: &str) -> Result<Group, DirectoryError> {
        self.group_fetches.fetch_add(1, Ordering::SeqCst);
        if name == BROKEN_GROUP {
            return Err(backend_failure("directory bind failed"));
        }
        self.groups
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(format!("directory group {name} does not exist")))
    }
}

pub fn entitlement_policy() -> ServicePolicy {
    ServicePolicy::new("Test Service with uSE").with_override_groups([ADMIN_GROUP, PRIMARY_GROUP])
}

pub fn affiliation_policy() -> ServicePolicy {
    ServicePolicy::new("Test Service with no uSE")
        .with_entitlement_key(None)
        .with_override_groups([ADMIN_GROUP, PRIMARY_GROUP])
}

pub async fn build_engine(policy: ServicePolicy) -> (EligibilityEngine, Arc<FakeDirectory>) {
    let directory = Arc::new(FakeDirectory::new());
    let engine = EligibilityEngine::new(policy, directory.clone())
        .await
        .expect("engine should build");
    (engine, directory)
}

/// Records every deprovision request and answers with a fixed outcome.
pub struct RecordingDeprovisioner {
    outcome: Result<bool, String>,
    pub calls: Mutex<Vec<String>>,
}

impl RecordingDeprovisioner {
    pub fn succeeding() -> Self {
        Self::with_outcome(Ok(true))
    }

    pub fn with_outcome(outcome: Result<bool, String>) -> Self {
        Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock should not be poisoned").clone()
    }
}

#[async_trait]
impl DeprovisionPort for RecordingDeprovisioner {
    async fn deprovision(&self, principal_id: &str) -> Result<bool, DeprovisionError> {
        self.calls
            .lock()
            .expect("calls lock should not be poisoned")
            .push(principal_id.to_string());
        self.outcome
            .clone()
            .map_err(|message| DeprovisionError::new(principal_id, message))
    }
}
