//! Role representations and role bindings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Well-known realm role names.
pub mod roles {
    /// Owner of backup applications.
    pub const APPLICATION_OWNER: &str = "px-backup-app.admin";
    /// User of backup applications.
    pub const APPLICATION_USER: &str = "px-backup-app.user";
    /// Owner of backup infrastructure.
    pub const INFRASTRUCTURE_OWNER: &str = "px-backup-infra.admin";
    /// Composite role every realm user gets by default.
    pub const DEFAULT_ROLES: &str = "default-roles-master";
}

/// A realm role.
///
/// Callers address roles by `name`; the `id` is resolved on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRepresentation {
    /// IdP-assigned identifier.
    #[serde(default)]
    pub id: String,
    /// Role name.
    #[serde(default)]
    pub name: String,
    /// Role description.
    #[serde(default)]
    pub description: String,
    /// Whether the role aggregates other roles.
    #[serde(default)]
    pub composite: bool,
    /// Whether the role belongs to a client rather than the realm.
    #[serde(default)]
    pub client_role: bool,
    /// Realm name or client id owning the role.
    #[serde(default)]
    pub container_id: String,
    /// Custom role attributes.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, Vec<String>>,
    /// Roles aggregated by a composite role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composites: Option<RoleComposites>,
}

/// Roles aggregated by a composite role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleComposites {
    /// Client roles keyed by client id.
    #[serde(default)]
    pub client: HashMap<String, Vec<String>>,
    /// Realm role names.
    #[serde(default)]
    pub realm: Vec<String>,
}

/// The holder of a role binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
    /// A user, by id.
    User(String),
    /// A group, by id.
    Group(String),
}

impl Principal {
    /// Returns the principal's id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::User(id) | Self::Group(id) => id,
        }
    }

    /// Returns the admin API collection the principal lives in.
    #[must_use]
    pub const fn collection(&self) -> &'static str {
        match self {
            Self::User(_) => "users",
            Self::Group(_) => "groups",
        }
    }
}

/// Assignment of a realm role to a user or group.
///
/// A binding has no lifecycle of its own: it is created and removed through
/// the principal's realm role mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleBinding {
    /// User or group holding the role.
    pub principal: Principal,
    /// Role identifier.
    pub role_id: String,
    /// Role name.
    pub role_name: String,
    /// Role description sent along with the mapping.
    pub description: String,
    /// Realm owning the role.
    pub realm: String,
}

impl RoleBinding {
    /// Returns the realm role mapping path of the principal, relative to the realm.
    #[must_use]
    pub fn mapping_path(&self) -> String {
        format!(
            "{}/{}/role-mappings/realm",
            self.principal.collection(),
            self.principal.id()
        )
    }

    /// Returns the one-element role list sent to create or remove the mapping.
    #[must_use]
    pub fn payload(&self) -> Vec<RoleRepresentation> {
        vec![RoleRepresentation {
            id: self.role_id.clone(),
            name: self.role_name.clone(),
            description: self.description.clone(),
            composite: false,
            client_role: false,
            container_id: self.realm.clone(),
            ..RoleRepresentation::default()
        }]
    }
}
