//! Common test utilities and fixtures.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Form, Json, Router};
use kc_admin_client::IdentityBridge;
use kc_core::{BridgeConfig, RetryPolicy};
use kc_model::{roles, GroupRepresentation, RoleComposites, RoleRepresentation, UserRepresentation};
use kc_secrets::{read_field, MemorySecretStore};
use parking_lot::{Mutex, MutexGuard};
use serde_json::json;
use tokio::sync::oneshot;

/// Realm served by the fake IdP.
pub const REALM: &str = "master";
/// Administrative username.
pub const ADMIN_USERNAME: &str = "px-central-admin";
/// Administrative password stored in the credential secret.
pub const ADMIN_PASSWORD: &str = "Adm1n-Passw0rd";
/// OAuth2 client accepted by the token endpoint.
pub const CLIENT_ID: &str = "pxcentral";
/// Unrelated field kept in the admin token secret.
pub const CA_FIELD: &str = "ca.crt";

/// Read-after-write lag applied to users created while it is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lag {
    /// Number of user listings the new user is absent from.
    pub hidden: u32,
    /// Number of subsequent listings that show the user without email.
    pub incomplete: u32,
}

struct StoredUser {
    user: UserRepresentation,
    password: String,
    lag: Lag,
}

#[derive(Default)]
struct Directory {
    users: Vec<StoredUser>,
    groups: Vec<GroupRepresentation>,
    roles: Vec<RoleRepresentation>,
    user_roles: HashMap<String, BTreeSet<String>>,
    group_roles: HashMap<String, BTreeSet<String>>,
    memberships: HashMap<String, BTreeSet<String>>,
    tokens: HashSet<String>,
    issued: u64,
    lag: Lag,
}

#[derive(Clone, Copy)]
enum Holder {
    User,
    Group,
}

impl Directory {
    fn seeded() -> Self {
        let mut dir = Self::default();
        for name in [
            roles::APPLICATION_OWNER,
            roles::APPLICATION_USER,
            roles::INFRASTRUCTURE_OWNER,
        ] {
            dir.roles.push(RoleRepresentation {
                id: uuid::Uuid::new_v4().to_string(),
                name: name.to_string(),
                container_id: REALM.to_string(),
                ..RoleRepresentation::default()
            });
        }
        dir.roles.push(RoleRepresentation {
            id: uuid::Uuid::new_v4().to_string(),
            name: roles::DEFAULT_ROLES.to_string(),
            description: "${role_default-roles}".to_string(),
            composite: true,
            container_id: REALM.to_string(),
            composites: Some(RoleComposites {
                realm: vec![roles::APPLICATION_USER.to_string()],
                ..RoleComposites::default()
            }),
            ..RoleRepresentation::default()
        });

        dir.insert_user(
            UserRepresentation {
                username: ADMIN_USERNAME.to_string(),
                email: "admin@example.com".to_string(),
                enabled: true,
                ..UserRepresentation::default()
            },
            ADMIN_PASSWORD.to_string(),
        );
        dir
    }

    fn insert_user(&mut self, mut user: UserRepresentation, password: String) -> String {
        user.id = uuid::Uuid::new_v4().to_string();
        user.credentials.clear();
        let id = user.id.clone();

        if let Some(default_role) = self.role_id(roles::DEFAULT_ROLES) {
            self.user_roles
                .entry(id.clone())
                .or_default()
                .insert(default_role);
        }
        self.users.push(StoredUser {
            user,
            password,
            lag: self.lag,
        });
        id
    }

    fn role_id(&self, name: &str) -> Option<String> {
        self.roles.iter().find(|r| r.name == name).map(|r| r.id.clone())
    }

    fn user_exists(&self, id: &str) -> bool {
        self.users.iter().any(|u| u.user.id == id)
    }

    fn group_exists(&self, id: &str) -> bool {
        self.groups.iter().any(|g| g.id == id)
    }

    fn exists(&self, holder: Holder, id: &str) -> bool {
        match holder {
            Holder::User => self.user_exists(id),
            Holder::Group => self.group_exists(id),
        }
    }

    fn mappings(&mut self, holder: Holder) -> &mut HashMap<String, BTreeSet<String>> {
        match holder {
            Holder::User => &mut self.user_roles,
            Holder::Group => &mut self.group_roles,
        }
    }

    fn roles_by_id<'a>(&self, ids: impl IntoIterator<Item = &'a String>) -> Vec<RoleRepresentation> {
        ids.into_iter()
            .filter_map(|id| self.roles.iter().find(|r| &r.id == id).cloned())
            .collect()
    }

    fn effective_role_ids(&self, user_id: &str) -> BTreeSet<String> {
        let mut pending: Vec<String> = self
            .user_roles
            .get(user_id)
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        for group in self.memberships.get(user_id).into_iter().flatten() {
            pending.extend(self.group_roles.get(group).into_iter().flatten().cloned());
        }

        let mut effective = BTreeSet::new();
        while let Some(id) = pending.pop() {
            if !effective.insert(id.clone()) {
                continue;
            }
            let composites = self
                .roles
                .iter()
                .find(|r| r.id == id)
                .and_then(|r| r.composites.as_ref());
            for name in composites.into_iter().flat_map(|c| c.realm.iter()) {
                pending.extend(self.role_id(name));
            }
        }
        effective
    }
}

/// State shared by the fake IdP's handlers.
pub struct IdpState {
    directory: Mutex<Directory>,
    requests: Mutex<Vec<(Method, String)>>,
}

impl IdpState {
    fn authorized(
        &self,
        realm: &str,
        headers: &HeaderMap,
    ) -> Result<MutexGuard<'_, Directory>, StatusCode> {
        if realm != REALM {
            return Err(StatusCode::NOT_FOUND);
        }
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;
        let directory = self.directory.lock();
        if directory.tokens.contains(token) {
            Ok(directory)
        } else {
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// An in-process IdP serving the token and admin endpoints.
pub struct FakeIdp {
    state: Arc<IdpState>,
    /// Base URL, usable as endpoint override.
    pub base_url: String,
    _shutdown_tx: oneshot::Sender<()>,
}

impl FakeIdp {
    /// Starts the IdP on an ephemeral port.
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(IdpState {
            directory: Mutex::new(Directory::seeded()),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/auth/realms/{realm}/protocol/openid-connect/token", post(issue_token))
            .route("/auth/admin/realms/{realm}/roles", get(list_roles))
            .route("/auth/admin/realms/{realm}/users", get(list_users).post(create_user))
            .route("/auth/admin/realms/{realm}/users/{id}", axum::routing::delete(delete_user))
            .route(
                "/auth/admin/realms/{realm}/users/{id}/role-mappings/realm",
                get(user_roles).post(add_user_roles).delete(remove_user_roles),
            )
            .route(
                "/auth/admin/realms/{realm}/users/{id}/role-mappings/realm/composite",
                get(user_effective_roles),
            )
            .route(
                "/auth/admin/realms/{realm}/users/{id}/groups/{group_id}",
                put(join_group),
            )
            .route("/auth/admin/realms/{realm}/groups", get(list_groups).post(create_group))
            .route("/auth/admin/realms/{realm}/groups/{id}", axum::routing::delete(delete_group))
            .route(
                "/auth/admin/realms/{realm}/groups/{id}/role-mappings/realm",
                get(group_roles).post(add_group_roles).delete(remove_group_roles),
            )
            .fallback(|| async { StatusCode::NOT_FOUND })
            .layer(middleware::from_fn_with_state(Arc::clone(&state), record))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);

        let (_shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                tracing::error!("Fake IdP error: {}", e);
            }
        });

        Ok(Self {
            state,
            base_url,
            _shutdown_tx,
        })
    }

    /// Applies `lag` to users created from now on.
    pub fn set_lag(&self, lag: Lag) {
        self.state.directory.lock().lag = lag;
    }

    /// Counts requests with `method` on exactly `path`.
    pub fn request_count(&self, method: &Method, path: &str) -> usize {
        self.state
            .requests
            .lock()
            .iter()
            .filter(|(m, p)| m == method && p == path)
            .count()
    }

    /// Returns the number of tokens issued so far.
    pub fn issued_tokens(&self) -> u64 {
        self.state.directory.lock().issued
    }

    /// Returns `true` if `username` is a member of the group named `group`.
    pub fn is_member(&self, username: &str, group: &str) -> bool {
        let dir = self.state.directory.lock();
        let user = dir.users.iter().find(|u| u.user.username == username);
        let group = dir.groups.iter().find(|g| g.name == group);
        match (user, group) {
            (Some(u), Some(g)) => dir
                .memberships
                .get(&u.user.id)
                .is_some_and(|groups| groups.contains(&g.id)),
            _ => false,
        }
    }

    /// Returns the id of `username`, ignoring any read lag.
    pub fn user_id(&self, username: &str) -> Option<String> {
        self.state
            .directory
            .lock()
            .users
            .iter()
            .find(|u| u.user.username == username)
            .map(|u| u.user.id.clone())
    }

    /// Changes the password of an existing user.
    pub fn set_password(&self, username: &str, password: &str) {
        let mut dir = self.state.directory.lock();
        if let Some(user) = dir.users.iter_mut().find(|u| u.user.username == username) {
            user.password = password.to_string();
        }
    }
}

async fn record(State(state): State<Arc<IdpState>>, request: Request, next: Next) -> Response {
    state
        .requests
        .lock()
        .push((request.method().clone(), request.uri().path().to_string()));
    next.run(request).await
}

// Token endpoint

async fn issue_token(
    State(state): State<Arc<IdpState>>,
    Path(realm): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let field = |key: &str| form.get(key).map(String::as_str).unwrap_or_default();

    if realm != REALM || field("client_id") != CLIENT_ID || field("grant_type") != "password" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_request"})),
        )
            .into_response();
    }

    let mut dir = state.directory.lock();
    let valid = dir
        .users
        .iter()
        .any(|u| u.user.username == field("username") && u.password == field("password"));
    if !valid {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid_grant", "error_description": "Invalid user credentials"})),
        )
            .into_response();
    }

    dir.issued += 1;
    let token = format!("tok-{}-{}", field("username"), dir.issued);
    dir.tokens.insert(token.clone());
    Json(json!({"access_token": token, "token_type": "Bearer", "expires_in": 31_536_000}))
        .into_response()
}

// Roles

async fn list_roles(
    State(state): State<Arc<IdpState>>,
    Path(realm): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<RoleRepresentation>>, StatusCode> {
    let dir = state.authorized(&realm, &headers)?;
    Ok(Json(dir.roles.clone()))
}

// Users

async fn list_users(
    State(state): State<Arc<IdpState>>,
    Path(realm): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<UserRepresentation>>, StatusCode> {
    let mut dir = state.authorized(&realm, &headers)?;

    let mut listed = Vec::new();
    for stored in &mut dir.users {
        if stored.lag.hidden > 0 {
            stored.lag.hidden -= 1;
            continue;
        }
        let mut user = stored.user.clone();
        if stored.lag.incomplete > 0 {
            stored.lag.incomplete -= 1;
            user.email.clear();
        }
        listed.push(user);
    }
    Ok(Json(listed))
}

async fn create_user(
    State(state): State<Arc<IdpState>>,
    Path(realm): Path<String>,
    headers: HeaderMap,
    Json(user): Json<UserRepresentation>,
) -> Result<impl IntoResponse, StatusCode> {
    let mut dir = state.authorized(&realm, &headers)?;

    if user.username.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    if dir.users.iter().any(|u| u.user.username == user.username) {
        return Err(StatusCode::CONFLICT);
    }
    let password = user
        .credentials
        .first()
        .map(|c| c.value.clone())
        .unwrap_or_default();
    let id = dir.insert_user(user, password);

    Ok((
        StatusCode::CREATED,
        [("Location", format!("/auth/admin/realms/{realm}/users/{id}"))],
    ))
}

async fn delete_user(
    State(state): State<Arc<IdpState>>,
    Path((realm, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> StatusCode {
    let mut dir = match state.authorized(&realm, &headers) {
        Ok(dir) => dir,
        Err(status) => return status,
    };
    if !dir.user_exists(&id) {
        return StatusCode::NOT_FOUND;
    }
    dir.users.retain(|u| u.user.id != id);
    dir.user_roles.remove(&id);
    dir.memberships.remove(&id);
    StatusCode::NO_CONTENT
}

async fn join_group(
    State(state): State<Arc<IdpState>>,
    Path((realm, id, group_id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> StatusCode {
    let mut dir = match state.authorized(&realm, &headers) {
        Ok(dir) => dir,
        Err(status) => return status,
    };
    if !dir.user_exists(&id) || !dir.group_exists(&group_id) {
        return StatusCode::NOT_FOUND;
    }
    dir.memberships.entry(id).or_default().insert(group_id);
    StatusCode::NO_CONTENT
}

// Groups

async fn list_groups(
    State(state): State<Arc<IdpState>>,
    Path(realm): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<GroupRepresentation>>, StatusCode> {
    let dir = state.authorized(&realm, &headers)?;
    Ok(Json(dir.groups.clone()))
}

async fn create_group(
    State(state): State<Arc<IdpState>>,
    Path(realm): Path<String>,
    headers: HeaderMap,
    Json(group): Json<GroupRepresentation>,
) -> StatusCode {
    let mut dir = match state.authorized(&realm, &headers) {
        Ok(dir) => dir,
        Err(status) => return status,
    };
    if group.name.is_empty() {
        return StatusCode::BAD_REQUEST;
    }
    if dir.groups.iter().any(|g| g.name == group.name) {
        return StatusCode::CONFLICT;
    }
    dir.groups.push(GroupRepresentation {
        id: uuid::Uuid::new_v4().to_string(),
        path: format!("/{}", group.name),
        name: group.name,
        sub_groups: Vec::new(),
    });
    StatusCode::CREATED
}

async fn delete_group(
    State(state): State<Arc<IdpState>>,
    Path((realm, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> StatusCode {
    let mut dir = match state.authorized(&realm, &headers) {
        Ok(dir) => dir,
        Err(status) => return status,
    };
    if !dir.group_exists(&id) {
        return StatusCode::NOT_FOUND;
    }
    dir.groups.retain(|g| g.id != id);
    dir.group_roles.remove(&id);
    for groups in dir.memberships.values_mut() {
        groups.remove(&id);
    }
    StatusCode::NO_CONTENT
}

// Role mappings

fn mapped_roles(
    state: &IdpState,
    holder: Holder,
    realm: &str,
    id: &str,
    headers: &HeaderMap,
) -> Result<Json<Vec<RoleRepresentation>>, StatusCode> {
    let mut dir = state.authorized(realm, headers)?;
    if !dir.exists(holder, id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let ids = dir.mappings(holder).get(id).cloned().unwrap_or_default();
    Ok(Json(dir.roles_by_id(&ids)))
}

fn change_mappings(
    state: &IdpState,
    holder: Holder,
    realm: &str,
    id: &str,
    headers: &HeaderMap,
    roles: Vec<RoleRepresentation>,
    grant: bool,
) -> StatusCode {
    let mut dir = match state.authorized(realm, headers) {
        Ok(dir) => dir,
        Err(status) => return status,
    };
    if !dir.exists(holder, id) {
        return StatusCode::NOT_FOUND;
    }
    if roles.iter().any(|r| !dir.roles.iter().any(|known| known.id == r.id)) {
        return StatusCode::NOT_FOUND;
    }

    let mapped = dir.mappings(holder).entry(id.to_string()).or_default();
    for role in roles {
        if grant {
            mapped.insert(role.id);
        } else {
            mapped.remove(&role.id);
        }
    }
    StatusCode::NO_CONTENT
}

async fn user_roles(
    State(state): State<Arc<IdpState>>,
    Path((realm, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Vec<RoleRepresentation>>, StatusCode> {
    mapped_roles(&state, Holder::User, &realm, &id, &headers)
}

async fn add_user_roles(
    State(state): State<Arc<IdpState>>,
    Path((realm, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(roles): Json<Vec<RoleRepresentation>>,
) -> StatusCode {
    change_mappings(&state, Holder::User, &realm, &id, &headers, roles, true)
}

async fn remove_user_roles(
    State(state): State<Arc<IdpState>>,
    Path((realm, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(roles): Json<Vec<RoleRepresentation>>,
) -> StatusCode {
    change_mappings(&state, Holder::User, &realm, &id, &headers, roles, false)
}

async fn user_effective_roles(
    State(state): State<Arc<IdpState>>,
    Path((realm, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Vec<RoleRepresentation>>, StatusCode> {
    let dir = state.authorized(&realm, &headers)?;
    if !dir.user_exists(&id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let ids = dir.effective_role_ids(&id);
    Ok(Json(dir.roles_by_id(&ids)))
}

async fn group_roles(
    State(state): State<Arc<IdpState>>,
    Path((realm, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Vec<RoleRepresentation>>, StatusCode> {
    mapped_roles(&state, Holder::Group, &realm, &id, &headers)
}

async fn add_group_roles(
    State(state): State<Arc<IdpState>>,
    Path((realm, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(roles): Json<Vec<RoleRepresentation>>,
) -> StatusCode {
    change_mappings(&state, Holder::Group, &realm, &id, &headers, roles, true)
}

async fn remove_group_roles(
    State(state): State<Arc<IdpState>>,
    Path((realm, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(roles): Json<Vec<RoleRepresentation>>,
) -> StatusCode {
    change_mappings(&state, Holder::Group, &realm, &id, &headers, roles, false)
}

/// Test environment: a fake IdP plus in-memory secrets, wired through an
/// [`IdentityBridge`] using the endpoint override.
pub struct TestEnv {
    /// The fake IdP.
    pub idp: FakeIdp,
    /// Secret store holding the admin credential and admin token secrets.
    pub store: Arc<MemorySecretStore>,
    /// Bridge configuration.
    pub config: BridgeConfig,
    /// Bridge with the admin password read from the credential secret.
    pub bridge: IdentityBridge,
}

impl TestEnv {
    /// Creates a new test environment.
    pub async fn new() -> anyhow::Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("kc_admin_client=debug,kc_secrets=debug,kc_core=debug")
            .with_test_writer()
            .try_init();

        let idp = FakeIdp::start().await?;

        let mut config = BridgeConfig::default();
        config.ui_endpoint = Some(idp.base_url.clone());
        config.http_timeout_secs = 5;
        config.consistency = RetryPolicy::new(Duration::from_millis(50), Duration::from_secs(2));

        let store = Arc::new(MemorySecretStore::new());
        store.insert_fields(&config.admin_credential_secret, &[("credential", ADMIN_PASSWORD)]);
        store.insert_fields(
            &config.admin_token_secret,
            &[(CA_FIELD, "-----BEGIN CERTIFICATE-----")],
        );

        let bridge = IdentityBridge::from_secret(config.clone(), store.clone()).await?;

        Ok(Self {
            idp,
            store,
            config,
            bridge,
        })
    }

    /// Builds another bridge over the same IdP and store with an explicit
    /// admin password.
    pub fn bridge_with_password(&self, password: &str) -> anyhow::Result<IdentityBridge> {
        Ok(IdentityBridge::new(self.config.clone(), self.store.clone(), password)?)
    }

    /// Reads a field of the admin token secret.
    pub fn token_secret_field(&self, field: &str) -> Option<String> {
        self.store
            .snapshot(&self.config.admin_token_secret)
            .and_then(|secret| read_field(&secret, field).ok().flatten())
    }

    /// Returns the admin API path of `suffix`.
    pub fn admin_path(suffix: &str) -> String {
        format!("/auth/admin/realms/{REALM}/{suffix}")
    }
}
