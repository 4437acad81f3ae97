use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::clients::{ClientPayload, ListClientsQuery},
    middleware::AuthUser,
    models::{ClientInput, ClientStatus, ListClientsFilter},
    utils::ValidatedJson,
    AppState,
};

fn to_input(payload: ClientPayload) -> Result<ClientInput, AppError> {
    let status = payload
        .status
        .as_deref()
        .map(str::parse::<ClientStatus>)
        .transpose()
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e)))?;

    Ok(ClientInput {
        name: payload.name,
        phone: payload.phone,
        email: payload.email,
        address: payload.address,
        package: payload.package,
        monthly_fee: payload.monthly_fee,
        status,
        mikrotik_username: payload.mikrotik_username,
    })
}

/// List the caller's clients, optionally narrowed by search or status.
pub async fn list_clients(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<ListClientsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<ClientStatus>)
        .transpose()
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e)))?;

    let clients = state
        .db
        .list_clients(
            claims.sub,
            &ListClientsFilter {
                search: query.search,
                status,
            },
        )
        .await?;

    Ok(Json(clients))
}

/// Get one of the caller's clients.
pub async fn get_client(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(client_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let client = state
        .db
        .get_client(claims.sub, client_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client not found")))?;

    Ok(Json(client))
}

/// Create a client under the caller.
pub async fn create_client(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ValidatedJson(payload): ValidatedJson<ClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    let input = to_input(payload)?;
    let client = state.db.create_client(claims.sub, &input).await?;

    Ok((StatusCode::CREATED, Json(client)))
}

/// Replace one of the caller's clients.
pub async fn update_client(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(client_id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<ClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    let input = to_input(payload)?;
    let client = state
        .db
        .update_client(claims.sub, client_id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client not found")))?;

    Ok(Json(client))
}

/// Delete one of the caller's clients. Ledger rows cascade with it.
pub async fn delete_client(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(client_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.db.delete_client(claims.sub, client_id).await?;
    if !deleted {
        return Err(AppError::NotFound(anyhow::anyhow!("Client not found")));
    }

    Ok(Json(serde_json::json!({
        "message": "Client deleted successfully"
    })))
}
