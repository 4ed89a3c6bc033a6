use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::directory::{
    entry::DirectoryEntry,
    error::{DirectoryError, not_found},
    ports::DirectoryPort,
    types::{Group, Principal},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    #[serde(default)]
    pub people: Vec<DirectoryEntry>,
    #[serde(default)]
    pub groups: Vec<DirectoryEntry>,
}

/// Directory backed by an exported snapshot of people and group entries.
///
/// Entries are decoded on every lookup; nothing derived is shared between calls.
#[derive(Debug, Clone, Default)]
pub struct FileDirectory {
    people: BTreeMap<String, DirectoryEntry>,
    groups: BTreeMap<String, DirectoryEntry>,
}

impl FileDirectory {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read directory snapshot {}", path.display()))?;
        let snapshot: DirectorySnapshot = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse directory snapshot {}", path.display()))?;
        let directory = Self::from_snapshot(snapshot)?;

        tracing::info!(
            target: "directory",
            path = %path.display(),
            people = directory.people.len(),
            groups = directory.groups.len(),
            "directory_snapshot_loaded"
        );
        Ok(directory)
    }

    pub fn from_snapshot(snapshot: DirectorySnapshot) -> Result<Self> {
        let mut people = BTreeMap::new();
        for entry in snapshot.people {
            let id = entry
                .principal_id()
                .ok_or_else(|| anyhow!("person entry '{}' has no uid", entry.dn))?
                .to_string();
            if people.insert(id.clone(), entry).is_some() {
                return Err(anyhow!("duplicate person entry for uid '{id}'"));
            }
        }

        let mut groups = BTreeMap::new();
        for entry in snapshot.groups {
            let name = entry
                .group_name()
                .ok_or_else(|| anyhow!("group entry '{}' has no cn", entry.dn))?
                .to_string();
            if groups.insert(name.clone(), entry).is_some() {
                return Err(anyhow!("duplicate group entry for cn '{name}'"));
            }
        }

        Ok(Self { people, groups })
    }
}

#[async_trait]
impl DirectoryPort for FileDirectory {
    async fn fetch_principal(&self, id: &str) -> Result<Principal, DirectoryError> {
        self.people
            .get(id)
            .ok_or_else(|| not_found(format!("no directory entry found for {id}")))?
            .to_principal()
    }

    async fn fetch_group(&self, name: &str) -> Result<Group, DirectoryError> {
        self.groups
            .get(name)
            .ok_or_else(|| not_found(format!("directory group {name} does not exist")))?
            .to_group()
    }
}
