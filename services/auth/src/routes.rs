//! Authentication service routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use booking::{BookingError, models::UserAccount};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    AppState,
    jwt::now_secs,
    models::{LoginRequest, SignupRequest},
    validation::validate_signup,
};

/// Account summary plus a fresh token pair
#[derive(Serialize)]
pub struct AuthResponse {
    pub account_id: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Request carrying a refresh token
#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token))
        .route("/auth/logout", post(logout))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);
    let redis = state.sessions.health_check().await.unwrap_or(false);

    let status = if database && redis {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if status == StatusCode::OK { "ok" } else { "degraded" },
            "service": "auth-service",
            "database": database,
            "redis": redis,
        })),
    )
}

/// Register a new email/password identity
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Sign-up attempt for: {}", payload.email);

    validate_signup(&payload).map_err(AuthError::BadRequest)?;

    let credential = state
        .credentials
        .create(
            payload.email.trim(),
            payload.display_name.trim(),
            &payload.password,
        )
        .await?
        .ok_or_else(|| AuthError::Conflict("Email is already registered".to_string()))?;

    let account = state.accounts.ensure_account(&credential.identity()).await?;
    let response = issue_tokens(&state, &account).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Email/password sign-in
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Login attempt for: {}", payload.email);

    let credential = state
        .credentials
        .find_by_email(payload.email.trim())
        .await?
        .ok_or(AuthError::Unauthorized)?;

    if !crate::credentials::verify_password(&credential.password_hash, &payload.password)? {
        warn!("Invalid password for: {}", credential.id);
        return Err(AuthError::Unauthorized);
    }

    let account = state.accounts.ensure_account(&credential.identity()).await?;
    let response = issue_tokens(&state, &account).await?;

    Ok((StatusCode::OK, Json(response)))
}

/// Exchange a refresh token for a new pair; the old token is revoked
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Token refresh request");

    let claims = state
        .jwt_service
        .validate_refresh_token(&payload.refresh_token)
        .map_err(|_| AuthError::Unauthorized)?;

    if !state
        .sessions
        .is_current(claims.sub, &payload.refresh_token)
        .await?
    {
        return Err(AuthError::Unauthorized);
    }

    let credential = state
        .credentials
        .find_by_id(claims.sub)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    state
        .sessions
        .revoke(&payload.refresh_token, claims.exp.saturating_sub(now_secs()?))
        .await?;

    // role is re-read so a role change takes effect on the next refresh
    let account = state.accounts.ensure_account(&credential.identity()).await?;
    let response = issue_tokens(&state, &account).await?;

    Ok((StatusCode::OK, Json(response)))
}

/// Logout endpoint
pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Logout request");

    let claims = state
        .jwt_service
        .validate_refresh_token(&payload.refresh_token)
        .map_err(|_| AuthError::Unauthorized)?;

    state
        .sessions
        .revoke(&payload.refresh_token, claims.exp.saturating_sub(now_secs()?))
        .await?;
    state.sessions.end(claims.sub).await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({"message": "Logged out successfully"})),
    ))
}

async fn issue_tokens(state: &AppState, account: &UserAccount) -> Result<AuthResponse, AuthError> {
    let access_token = state.jwt_service.generate_access_token(account)?;
    let refresh_token = state.jwt_service.generate_refresh_token(account)?;
    state.sessions.store(account.id, &refresh_token).await?;

    Ok(AuthResponse {
        account_id: account.id.to_string(),
        email: account.email.clone(),
        display_name: account.display_name.clone(),
        role: account.role.to_string(),
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    })
}

/// Custom error type for authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<BookingError> for AuthError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::Validation(msg) => AuthError::BadRequest(msg),
            BookingError::Authorization(_) | BookingError::NotFound(_) => AuthError::Unauthorized,
            BookingError::Transient(e) => AuthError::Unavailable(e.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AuthError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AuthError::Unavailable(msg) => {
                error!("Auth dependency unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable".to_string(),
                )
            }
            AuthError::Internal(e) => {
                error!("Auth request failed: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
