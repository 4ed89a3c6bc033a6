use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    directory::{
        error::{DirectoryError, decode_error},
        types::{Group, Principal},
    },
    entitlement::EntitlementRecord,
};

pub const ATTR_UID: &str = "uid";
pub const ATTR_CN: &str = "cn";
pub const ATTR_DISPLAY_NAME: &str = "displayName";
pub const ATTR_MAIL: &str = "mail";
pub const ATTR_ENTITY_ID: &str = "entityid";
pub const ATTR_INST_ROLES: &str = "umichInstRoles";
pub const ATTR_SERVICE_ENTITLEMENT: &str = "umichServiceEntitlement";
pub const ATTR_MEMBER: &str = "member";

/// A raw directory search result: a distinguished name and multi-valued attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DirectoryEntry {
    pub dn: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl DirectoryEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn values(&self, name: &str) -> &[String] {
        self.attributes
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }

    /// Principal id: the `uid` attribute, else the `uid=` component of the DN.
    pub fn principal_id(&self) -> Option<&str> {
        self.first(ATTR_UID).or_else(|| member_id_from_dn(&self.dn))
    }

    /// Group name: the `cn` attribute, else the `cn=` component of the DN.
    pub fn group_name(&self) -> Option<&str> {
        self.first(ATTR_CN)
            .or_else(|| leading_rdn_value(&self.dn, "cn"))
    }

    pub fn to_principal(&self) -> Result<Principal, DirectoryError> {
        let id = self
            .principal_id()
            .ok_or_else(|| decode_error(format!("entry '{}' has no uid", self.dn)))?;

        let mut principal = Principal::new(id)
            .with_display_name(self.first(ATTR_DISPLAY_NAME).unwrap_or_default())
            .with_entity_id(self.first(ATTR_ENTITY_ID).unwrap_or_default())
            .with_affiliations(self.values(ATTR_INST_ROLES).iter().cloned())
            .with_entitlements(self.decode_entitlements(id));
        if let Some(mail) = self.first(ATTR_MAIL) {
            principal = principal.with_email(mail);
        }
        Ok(principal)
    }

    pub fn to_group(&self) -> Result<Group, DirectoryError> {
        let name = self
            .group_name()
            .ok_or_else(|| decode_error(format!("entry '{}' has no cn", self.dn)))?;

        let mut members = Vec::new();
        for member_dn in self.values(ATTR_MEMBER) {
            match member_id_from_dn(member_dn) {
                Some(member_id) => members.push(member_id),
                None => tracing::warn!(
                    target: "directory",
                    group = %name,
                    member_dn = %member_dn,
                    "group_member_without_uid_skipped"
                ),
            }
        }
        Ok(Group::new(name, members))
    }

    fn decode_entitlements(&self, principal_id: &str) -> Vec<EntitlementRecord> {
        self.values(ATTR_SERVICE_ENTITLEMENT)
            .iter()
            .filter_map(|raw| match serde_json::from_str::<EntitlementRecord>(raw) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!(
                        target: "directory",
                        principal_id = %principal_id,
                        error = %err,
                        "malformed_entitlement_record_skipped"
                    );
                    None
                }
            })
            .collect()
    }
}

/// Extracts the id from a member DN such as `uid=nemcardf,ou=People,dc=umich,dc=edu`.
pub fn member_id_from_dn(dn: &str) -> Option<&str> {
    leading_rdn_value(dn, "uid")
}

fn leading_rdn_value<'a>(dn: &'a str, attribute: &str) -> Option<&'a str> {
    let rdn = dn.split(',').next()?.trim();
    let (name, value) = rdn.split_once('=')?;
    if !name.trim().eq_ignore_ascii_case(attribute) {
        return None;
    }
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}
