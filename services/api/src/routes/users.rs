//! Account endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use booking::{Session, models::Role};
use uuid::Uuid;

use crate::{
    error::ApiResult,
    models::{AccountDetailsRequest, RenameRequest, RoleRequest},
    state::AppState,
};

pub async fn me(Extension(session): Extension<Session>) -> impl IntoResponse {
    Json(session)
}

pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.accounts.list(&session).await?))
}

pub async fn set_role(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RoleRequest>,
) -> ApiResult<impl IntoResponse> {
    let role: Role = payload.role.parse()?;
    state.workers.set_role(&session, id, role).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_account(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountDetailsRequest>,
) -> ApiResult<impl IntoResponse> {
    let account = state
        .accounts
        .update_details(&session, id, &payload.display_name, &payload.email)
        .await?;
    Ok(Json(account))
}

pub async fn delete_account(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.accounts.delete(&session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn rename_self(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<RenameRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        state
            .accounts
            .rename_self(&session, &payload.display_name)
            .await?,
    ))
}
