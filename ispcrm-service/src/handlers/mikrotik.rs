use axum::{extract::Path, extract::State, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::{
    dtos::mikrotik::{CreateRouterUserRequest, UpdateRouterUserRequest},
    middleware::AuthUser,
    services::metrics,
    services::mikrotik::{NewPppSecret, PppSecretPatch},
    utils::ValidatedJson,
    AppState,
};

/// List PPPoE users on the router.
pub async fn list_router_users(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let secrets = state.mikrotik.list_secrets().await.inspect_err(|_| {
        metrics::record_router_request("list", "failure");
    })?;

    metrics::record_router_request("list", "success");

    Ok(Json(secrets))
}

/// Create a PPPoE user on the router.
pub async fn create_router_user(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateRouterUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let secret = NewPppSecret {
        name: req.username.clone(),
        password: req.password,
        profile: req.profile.unwrap_or_else(|| "default".to_string()),
        service: req.service.unwrap_or_else(|| "pppoe".to_string()),
    };

    state.mikrotik.create_secret(&secret).await.inspect_err(|_| {
        metrics::record_router_request("create", "failure");
    })?;

    metrics::record_router_request("create", "success");
    tracing::info!(username = %req.username, "PPPoE user created");

    Ok(Json(serde_json::json!({
        "message": "User created successfully",
        "username": req.username
    })))
}

/// Update a PPPoE user on the router, addressed by name.
pub async fn update_router_user(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Path(username): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateRouterUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let secret = state
        .mikrotik
        .find_secret(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

    let patch = PppSecretPatch {
        password: req.password,
        profile: req.profile,
        disabled: req.disabled.map(|d| d.to_string()),
    };

    state
        .mikrotik
        .update_secret(&secret.id, &patch)
        .await
        .inspect_err(|_| {
            metrics::record_router_request("update", "failure");
        })?;

    metrics::record_router_request("update", "success");
    tracing::info!(username = %username, "PPPoE user updated");

    Ok(Json(serde_json::json!({
        "message": "User updated successfully"
    })))
}

/// Delete a PPPoE user on the router, addressed by name.
pub async fn delete_router_user(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let secret = state
        .mikrotik
        .find_secret(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

    state
        .mikrotik
        .delete_secret(&secret.id)
        .await
        .inspect_err(|_| {
            metrics::record_router_request("delete", "failure");
        })?;

    metrics::record_router_request("delete", "success");
    tracing::info!(username = %username, "PPPoE user deleted");

    Ok(Json(serde_json::json!({
        "message": "User deleted successfully"
    })))
}
