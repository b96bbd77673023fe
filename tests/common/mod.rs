#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use warden::router::init_router;
use warden::state::AppState;
use warden_auth::create_access_token;
use warden_cli::seeder::{self, BootstrapConfig};
use warden_config::{CorsConfig, GuardConfig, JwtConfig, PasswordConfig};
use warden_core::permissions::DEFAULT_GUARD;
use warden_db::{InMemoryStore, RbacStore};
use warden_models::{PermissionId, UserId, UserWithRoles};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "password";
/// bcrypt's minimum cost keeps the suite fast.
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_state(store: Arc<dyn RbacStore>) -> AppState {
    AppState {
        store,
        jwt_config: JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry: 3600,
        },
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        password_config: PasswordConfig {
            bcrypt_cost: TEST_BCRYPT_COST,
        },
        guard_config: GuardConfig {
            default_guard: DEFAULT_GUARD.to_string(),
        },
    }
}

/// An empty in-memory store.
pub fn empty_state() -> AppState {
    test_state(Arc::new(InMemoryStore::new()))
}

/// Default permissions, `super-admin`, `admin` and one super admin user.
pub async fn bootstrapped_state() -> AppState {
    let state = empty_state();
    seeder::bootstrap(
        state.store(),
        &BootstrapConfig {
            name: "Super Admin".to_string(),
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
            bcrypt_cost: TEST_BCRYPT_COST,
        },
    )
    .await
    .unwrap();
    state
}

pub fn app(state: &AppState) -> Router {
    init_router(state.clone())
}

pub async fn super_admin(state: &AppState) -> UserWithRoles {
    let user = state
        .store()
        .find_user_by_email(ADMIN_EMAIL)
        .await
        .unwrap()
        .unwrap();
    state.store().get_user(user.id).await.unwrap()
}

pub fn token_for(state: &AppState, user_id: UserId, email: &str) -> String {
    create_access_token(user_id.into_inner(), email, &state.jwt_config).unwrap()
}

pub async fn super_admin_token(state: &AppState) -> String {
    let admin = super_admin(state).await;
    token_for(state, admin.id, &admin.email)
}

pub async fn permission_id(state: &AppState, name: &str) -> PermissionId {
    state
        .store()
        .list_permissions()
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.permission.name == name)
        .map(|p| p.permission.id)
        .unwrap_or_else(|| panic!("permission '{}' missing", name))
}

pub async fn permission_ids(state: &AppState, names: &[&str]) -> Vec<PermissionId> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        ids.push(permission_id(state, name).await);
    }
    ids
}

/// Stores a user directly, skipping password hashing.
pub async fn insert_user(state: &AppState, email: &str, role: &str) -> UserWithRoles {
    state
        .store()
        .create_user(warden_models::NewUser {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash: "unused".to_string(),
            role_name: role.to_string(),
        })
        .await
        .unwrap()
}

/// Sends one request through the router and returns the status and the
/// JSON body (`Null` when empty).
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
