//! Reservation endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use booking::{Session, models::ReservationStatus};
use uuid::Uuid;

use crate::{
    error::ApiResult,
    models::{CreateReservationRequest, StatusRequest},
    state::AppState,
};

pub async fn create_reservation(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<CreateReservationRequest>,
) -> ApiResult<impl IntoResponse> {
    let reservation = state
        .reservations
        .create(&session, payload.draft, payload.photos)
        .await?;

    Ok((StatusCode::CREATED, Json(reservation)))
}

pub async fn my_reservations(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.reservations.list_mine(&session).await?))
}

pub async fn my_completed_reservations(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.reservations.list_mine_completed(&session).await?))
}

pub async fn get_reservation(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.reservations.get(&session, id).await?))
}

pub async fn all_reservations(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.reservations.list_all(&session).await?))
}

pub async fn set_reservation_status(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let status: ReservationStatus = payload.status.parse()?;
    Ok(Json(state.reservations.set_status(&session, id, status).await?))
}

pub async fn delete_reservation(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.reservations.delete(&session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
