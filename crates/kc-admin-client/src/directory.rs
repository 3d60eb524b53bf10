//! Directory management: users, groups, realm roles and their bindings.
//!
//! Every mutating operation runs the same sequence: resolve names to ids,
//! obtain auth headers, build the payload, send it. Resolution that finds no
//! match yields an empty id and the operation carries on with it; the IdP
//! then rejects the request and that error is what the caller sees.

use kc_core::{retry_until_deadline, RetryError, RetryPolicy};
use kc_model::{
    GroupCreate, GroupMembership, GroupRepresentation, Principal, RoleBinding, RoleRepresentation,
    UserRepresentation,
};
use reqwest::header::HeaderMap;

use crate::client::IdentityClient;
use crate::error::{IdpError, IdpResult};
use crate::token::TokenBroker;

/// Multi-step directory operations on top of [`IdentityClient`].
#[derive(Clone)]
pub struct DirectoryOperations {
    client: IdentityClient,
    consistency: RetryPolicy,
    realm: String,
}

impl DirectoryOperations {
    /// Creates directory operations for `realm`.
    pub fn new(client: IdentityClient, consistency: RetryPolicy, realm: impl Into<String>) -> Self {
        Self {
            client,
            consistency,
            realm: realm.into(),
        }
    }

    /// Returns a copy polling with `policy` in [`Self::fetch_user_details`].
    #[must_use]
    pub fn with_consistency_policy(&self, policy: RetryPolicy) -> Self {
        Self {
            consistency: policy,
            ..self.clone()
        }
    }

    /// Returns the underlying client.
    #[must_use]
    pub fn client(&self) -> &IdentityClient {
        &self.client
    }

    /// Returns the token broker.
    #[must_use]
    pub fn broker(&self) -> &TokenBroker {
        self.client.broker()
    }

    // Listing

    /// Lists all realm roles.
    pub async fn list_roles(&self) -> IdpResult<Vec<RoleRepresentation>> {
        let headers = self.client.auth_headers().await?;
        self.list("roles", &headers).await
    }

    /// Lists all users.
    pub async fn list_users(&self) -> IdpResult<Vec<UserRepresentation>> {
        let headers = self.client.auth_headers().await?;
        self.list("users", &headers).await
    }

    /// Lists all top-level groups.
    pub async fn list_groups(&self) -> IdpResult<Vec<GroupRepresentation>> {
        let headers = self.client.auth_headers().await?;
        self.list("groups", &headers).await
    }

    async fn list<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        headers: &HeaderMap,
    ) -> IdpResult<Vec<T>> {
        self.client
            .get(path, headers)
            .await
            .map_err(|e| e.into_directory(&format!("failed to list {path}")))
    }

    // Resolution

    /// Returns the id of the user named exactly `username`, or an empty
    /// string if there is none.
    pub async fn resolve_user_id(&self, username: &str) -> IdpResult<String> {
        let users = self.list_users().await?;
        Ok(first_id(users.iter().map(|u| (&u.username, &u.id)), username, "user"))
    }

    /// Returns the id of the group named exactly `name`, or an empty string
    /// if there is none.
    pub async fn resolve_group_id(&self, name: &str) -> IdpResult<String> {
        let groups = self.list_groups().await?;
        Ok(first_id(groups.iter().map(|g| (&g.name, &g.id)), name, "group"))
    }

    /// Returns the id of the realm role named exactly `role`, or an empty
    /// string if there is none.
    pub async fn resolve_role_id(&self, role: &str) -> IdpResult<String> {
        let roles = self.list_roles().await?;
        Ok(first_id(roles.iter().map(|r| (&r.name, &r.id)), role, "role"))
    }

    // Role mappings

    /// Lists the realm roles mapped directly to `username`.
    pub async fn user_realm_roles(&self, username: &str) -> IdpResult<Vec<RoleRepresentation>> {
        let id = self.resolve_user_id(username).await?;
        let headers = self.client.auth_headers().await?;
        self.list(&format!("users/{id}/role-mappings/realm"), &headers)
            .await
    }

    /// Lists the realm roles `username` holds, including those inherited
    /// through composite roles and groups.
    pub async fn user_effective_roles(
        &self,
        username: &str,
    ) -> IdpResult<Vec<RoleRepresentation>> {
        let id = self.resolve_user_id(username).await?;
        let headers = self.client.auth_headers().await?;
        self.list(&format!("users/{id}/role-mappings/realm/composite"), &headers)
            .await
    }

    /// Lists the realm roles mapped to `group`.
    pub async fn group_realm_roles(&self, group: &str) -> IdpResult<Vec<RoleRepresentation>> {
        let id = self.resolve_group_id(group).await?;
        let headers = self.client.auth_headers().await?;
        self.list(&format!("groups/{id}/role-mappings/realm"), &headers)
            .await
    }

    /// Grants realm role `role` to `username`.
    pub async fn add_role_to_user(
        &self,
        username: &str,
        role: &str,
        description: &str,
    ) -> IdpResult<()> {
        let principal = Principal::User(self.resolve_user_id(username).await?);
        self.bind_role(principal, role, description).await?;
        tracing::info!(username, role, "Role granted to user");
        Ok(())
    }

    /// Grants realm role `role` to `group`.
    pub async fn add_role_to_group(
        &self,
        group: &str,
        role: &str,
        description: &str,
    ) -> IdpResult<()> {
        let principal = Principal::Group(self.resolve_group_id(group).await?);
        self.bind_role(principal, role, description).await?;
        tracing::info!(group, role, "Role granted to group");
        Ok(())
    }

    /// Revokes realm role `role` from `username`.
    pub async fn delete_role_from_user(
        &self,
        username: &str,
        role: &str,
        description: &str,
    ) -> IdpResult<()> {
        let principal = Principal::User(self.resolve_user_id(username).await?);
        self.unbind_role(principal, role, description).await?;
        tracing::info!(username, role, "Role revoked from user");
        Ok(())
    }

    /// Revokes realm role `role` from `group`.
    pub async fn delete_role_from_group(
        &self,
        group: &str,
        role: &str,
        description: &str,
    ) -> IdpResult<()> {
        let principal = Principal::Group(self.resolve_group_id(group).await?);
        self.unbind_role(principal, role, description).await?;
        tracing::info!(group, role, "Role revoked from group");
        Ok(())
    }

    async fn binding(
        &self,
        principal: Principal,
        role: &str,
        description: &str,
    ) -> IdpResult<RoleBinding> {
        Ok(RoleBinding {
            principal,
            role_id: self.resolve_role_id(role).await?,
            role_name: role.to_string(),
            description: description.to_string(),
            realm: self.realm.clone(),
        })
    }

    async fn bind_role(&self, principal: Principal, role: &str, description: &str) -> IdpResult<()> {
        let binding = self.binding(principal, role, description).await?;
        let headers = self.client.auth_headers().await?;
        self.client
            .post(&binding.mapping_path(), &binding.payload(), &headers)
            .await
    }

    async fn unbind_role(
        &self,
        principal: Principal,
        role: &str,
        description: &str,
    ) -> IdpResult<()> {
        let binding = self.binding(principal, role, description).await?;
        let headers = self.client.auth_headers().await?;
        self.client
            .delete(&binding.mapping_path(), Some(&binding.payload()), &headers)
            .await
    }

    // Users

    /// Creates an enabled user with a permanent password.
    pub async fn add_user(
        &self,
        username: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> IdpResult<()> {
        let user = UserRepresentation::with_password(username, first_name, last_name, email, password);
        let headers = self.client.auth_headers().await?;
        self.client.post("users", &user, &headers).await?;
        tracing::info!(username, "User created");
        Ok(())
    }

    /// Deletes the user named `username`.
    pub async fn delete_user(&self, username: &str) -> IdpResult<()> {
        let id = self.resolve_user_id(username).await?;
        let headers = self.client.auth_headers().await?;
        self.client
            .delete::<()>(&format!("users/{id}"), None, &headers)
            .await?;
        tracing::info!(username, "User deleted");
        Ok(())
    }

    /// Makes `username` a member of `group`.
    pub async fn add_group_to_user(&self, username: &str, group: &str) -> IdpResult<()> {
        let membership = GroupMembership {
            user_id: self.resolve_user_id(username).await?,
            group_id: self.resolve_group_id(group).await?,
            realm: self.realm.clone(),
        };
        let headers = self.client.auth_headers().await?;
        self.client
            .put(&membership.path(), &membership, &headers)
            .await?;
        tracing::info!(username, group, "User added to group");
        Ok(())
    }

    /// Returns the username and email of the user with id `user_id`.
    ///
    /// Right after a user is created the IdP may not list it yet, or list it
    /// without username or email. Both conditions are polled at the
    /// configured interval until the deadline; any other failure except a
    /// configuration error is polled as well. Exhausting the deadline yields
    /// [`IdpError::Directory`] wrapping the last failure; a request still
    /// pending at the deadline is abandoned.
    pub async fn fetch_user_details(&self, user_id: &str) -> IdpResult<(String, String)> {
        let headers = self.client.auth_headers().await?;

        let outcome = retry_until_deadline(
            &self.consistency,
            || self.user_details_attempt(user_id, &headers),
            |e: &IdpError| !matches!(e, IdpError::Config(_)),
        )
        .await;

        match outcome {
            Ok(details) => Ok(details),
            Err(RetryError::Exhausted {
                attempts,
                deadline,
                last,
            }) => Err(IdpError::directory_caused_by(
                format!("details of user {user_id} unavailable after {attempts} attempt(s) within {deadline:?}"),
                last,
            )),
            Err(RetryError::TimedOut { attempts, deadline }) => Err(IdpError::directory(format!(
                "details of user {user_id} unavailable: attempt {attempts} still pending at the {deadline:?} deadline"
            ))),
            Err(RetryError::Aborted { error, .. }) => Err(error),
        }
    }

    async fn user_details_attempt(
        &self,
        user_id: &str,
        headers: &HeaderMap,
    ) -> IdpResult<(String, String)> {
        let users: Vec<UserRepresentation> = self.list("users", headers).await?;
        let user = users
            .into_iter()
            .find(|u| u.id == user_id)
            .ok_or_else(|| IdpError::directory(format!("user {user_id} not listed yet")))?;
        if user.is_complete() {
            Ok((user.username, user.email))
        } else {
            Err(IdpError::directory(format!(
                "user {user_id} listed without username or email"
            )))
        }
    }

    // Groups

    /// Creates a top-level group.
    pub async fn add_group(&self, name: &str) -> IdpResult<()> {
        let headers = self.client.auth_headers().await?;
        self.client
            .post("groups", &GroupCreate::new(name), &headers)
            .await?;
        tracing::info!(group = name, "Group created");
        Ok(())
    }

    /// Deletes the group named `name`.
    pub async fn delete_group(&self, name: &str) -> IdpResult<()> {
        let id = self.resolve_group_id(name).await?;
        let headers = self.client.auth_headers().await?;
        self.client
            .delete::<()>(&format!("groups/{id}"), None, &headers)
            .await?;
        tracing::info!(group = name, "Group deleted");
        Ok(())
    }
}

fn first_id<'a>(
    entries: impl Iterator<Item = (&'a String, &'a String)>,
    name: &str,
    kind: &str,
) -> String {
    match entries.into_iter().find(|(n, _)| n.as_str() == name) {
        Some((_, id)) => id.clone(),
        None => {
            tracing::debug!(kind, name, "No match, continuing with empty id");
            String::new()
        }
    }
}
