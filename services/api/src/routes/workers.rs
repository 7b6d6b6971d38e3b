//! Worker application, profile and approval endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use booking::{Session, upload::PhotoUpload};
use uuid::Uuid;

use crate::{
    error::ApiResult,
    models::{ApplyRequest, PhotoUrlResponse, RemovePortfolioRequest, UpdateWorkerRequest},
    state::AppState,
};

/// Approved workers for the public map; no sign-in required
pub async fn public_workers(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workers.list_public().await?))
}

pub async fn apply(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<ApplyRequest>,
) -> ApiResult<impl IntoResponse> {
    let profile = state.workers.apply(&session, &payload.display_name).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn my_standing(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workers.standing(&session).await?))
}

pub async fn update_my_profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<UpdateWorkerRequest>,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .workers
        .update_profile(&session, payload.update, payload.portfolio_photos)
        .await?;
    Ok(Json(profile))
}

pub async fn remove_portfolio_photo(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<RemovePortfolioRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        state
            .workers
            .remove_portfolio_photo(&session, &payload.url)
            .await?,
    ))
}

pub async fn set_profile_photo(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(photo): Json<PhotoUpload>,
) -> ApiResult<impl IntoResponse> {
    let url = state.workers.set_profile_photo(&session, photo).await?;
    Ok(Json(PhotoUrlResponse { url }))
}

pub async fn roster(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workers.roster(&session).await?))
}

pub async fn approve(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workers.approve(&session, id).await?))
}

pub async fn revoke(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workers.revoke(&session, id).await?))
}
