use std::{collections::BTreeSet, sync::OnceLock};

use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};

use crate::{
    affiliation::{self, Affiliation},
    entitlement::{self, EntitlementRecord},
};

/// A person as returned by the directory.
///
/// Raw attributes are fixed at construction. The highest affiliation is derived
/// on first use and cached for the lifetime of the value.
#[derive(Debug, Clone, Default)]
pub struct Principal {
    id: String,
    display_name: String,
    email: Option<String>,
    exists: bool,
    entity_id: String,
    raw_affiliations: Vec<String>,
    raw_entitlements: Vec<EntitlementRecord>,
    highest_affiliation: OnceLock<Affiliation>,
}

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            exists: true,
            ..Self::default()
        }
    }

    /// Placeholder for an id the directory has no record of.
    pub fn missing(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            exists: false,
            ..Self::default()
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = entity_id.into();
        self
    }

    pub fn with_affiliations<I, S>(mut self, raw_affiliations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.raw_affiliations = raw_affiliations.into_iter().map(Into::into).collect();
        self.highest_affiliation = OnceLock::new();
        self
    }

    pub fn with_entitlements(mut self, raw_entitlements: Vec<EntitlementRecord>) -> Self {
        self.raw_entitlements = raw_entitlements;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn raw_affiliations(&self) -> &[String] {
        &self.raw_affiliations
    }

    pub fn raw_entitlements(&self) -> &[EntitlementRecord] {
        &self.raw_entitlements
    }

    /// Highest affiliation if it has already been resolved.
    pub fn resolved_affiliation(&self) -> Option<Affiliation> {
        self.highest_affiliation.get().copied()
    }

    pub fn highest_affiliation(&self) -> Affiliation {
        *self
            .highest_affiliation
            .get_or_init(|| Affiliation::resolve(self.raw_affiliations.as_slice()))
    }

    pub fn sponsorship_level(&self) -> Option<u8> {
        affiliation::sponsorship_level(self.highest_affiliation(), &self.id, &self.entity_id)
    }

    pub fn has_service_entitlement(&self, service: &str) -> bool {
        entitlement::has_service_entitlement(&self.raw_entitlements, service)
    }

    /// Name for log lines and messages, falling back to the id.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.id
        } else {
            &self.display_name
        }
    }
}

impl Serialize for Principal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Principal", 8)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("display_name", &self.display_name)?;
        state.serialize_field("email", &self.email)?;
        state.serialize_field("exists", &self.exists)?;
        state.serialize_field("entity_id", &self.entity_id)?;
        state.serialize_field("raw_affiliations", &self.raw_affiliations)?;
        state.serialize_field("raw_entitlements", &self.raw_entitlements)?;
        state.serialize_field("highest_affiliation", &self.resolved_affiliation())?;
        state.end()
    }
}

/// An administrative group, reduced to its member ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub exists: bool,
    pub member_ids: BTreeSet<String>,
}

impl Group {
    pub fn new<I, S>(name: impl Into<String>, member_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            exists: true,
            member_ids: member_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exists: false,
            member_ids: BTreeSet::new(),
        }
    }
}
