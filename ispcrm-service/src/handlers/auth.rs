use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::{
    dtos::auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    models::CreateUser,
    services::metrics,
    utils::{password, ValidatedJson},
    AppState,
};

/// Register an operator account.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let hashed = password::hash_password(&req.password)?;

    let user = state
        .db
        .create_user(&CreateUser {
            username: req.username,
            password: hashed,
            name: req.name,
            email: req.email,
            role: req.role.unwrap_or_else(|| "user".to_string()),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { user: user.into() }),
    ))
}

/// Login with username and password; returns a bearer token.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.db.find_user_by_username(&req.username).await?;

    let user = match user {
        Some(user) => user,
        None => {
            metrics::record_login("failure");
            return Err(AppError::Unauthorized(anyhow::anyhow!(
                "Invalid credentials"
            )));
        }
    };

    if !password::verify_password(&req.password, &user.password)? {
        metrics::record_login("failure");
        return Err(AppError::Unauthorized(anyhow::anyhow!(
            "Invalid credentials"
        )));
    }

    let token = state.jwt.generate_token(&user)?;
    metrics::record_login("success");

    tracing::info!(user_id = %user.id, "Operator logged in");

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            token,
            user: user.into(),
        }),
    ))
}
