//! Chat room endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use booking::Session;
use uuid::Uuid;

use crate::{
    error::ApiResult,
    models::{DeletedResponse, SendMessageRequest},
    state::AppState,
};

pub async fn list_rooms(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.chat.rooms(&session).await?))
}

pub async fn room_messages(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(room_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.chat.messages(&session, room_id).await?))
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(room_id): Path<Uuid>,
    Json(payload): Json<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let message = state.chat.send(&session, room_id, &payload.text).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn delete_room(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(room_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state.chat.delete_room(&session, room_id).await?;
    Ok(Json(DeletedResponse { deleted }))
}
