//! Group representations.

use serde::{Deserialize, Serialize};

/// A directory group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRepresentation {
    /// IdP-assigned identifier.
    #[serde(default)]
    pub id: String,
    /// Group name, unique within the realm.
    #[serde(default)]
    pub name: String,
    /// Path in the group hierarchy (e.g. `/parent/child`).
    #[serde(default)]
    pub path: String,
    /// Child groups.
    #[serde(default)]
    pub sub_groups: Vec<GroupRepresentation>,
}

/// Group creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCreate {
    /// Group name.
    pub name: String,
}

impl GroupCreate {
    /// Creates a payload for a top-level group.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Payload joining a user to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembership {
    /// User identifier.
    pub user_id: String,
    /// Group identifier.
    pub group_id: String,
    /// Realm of both entities.
    pub realm: String,
}

impl GroupMembership {
    /// Returns the admin API path of this membership, relative to the realm.
    #[must_use]
    pub fn path(&self) -> String {
        format!("users/{}/groups/{}", self.user_id, self.group_id)
    }
}
