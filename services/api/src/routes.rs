//! API service routes

mod chat;
mod events;
mod reservations;
mod users;
mod workers;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde_json::json;

use crate::{middleware::auth_middleware, state::AppState};

/// Photos travel inline in JSON bodies
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/reservations", post(reservations::create_reservation))
        .route("/reservations/mine", get(reservations::my_reservations))
        .route(
            "/reservations/mine/completed",
            get(reservations::my_completed_reservations),
        )
        .route("/reservations/:id", get(reservations::get_reservation))
        .route("/admin/reservations", get(reservations::all_reservations))
        .route(
            "/admin/reservations/:id/status",
            put(reservations::set_reservation_status),
        )
        .route(
            "/admin/reservations/:id",
            delete(reservations::delete_reservation),
        )
        .route("/workers/apply", post(workers::apply))
        .route(
            "/workers/me",
            get(workers::my_standing).put(workers::update_my_profile),
        )
        .route(
            "/workers/me/portfolio",
            delete(workers::remove_portfolio_photo),
        )
        .route("/workers/me/photo", put(workers::set_profile_photo))
        .route("/admin/workers", get(workers::roster))
        .route("/admin/workers/:id/approve", post(workers::approve))
        .route("/admin/workers/:id/revoke", post(workers::revoke))
        .route("/admin/users", get(users::list_accounts))
        .route(
            "/admin/users/:id",
            put(users::update_account).delete(users::delete_account),
        )
        .route("/admin/users/:id/role", put(users::set_role))
        .route("/me", get(users::me))
        .route("/me/name", put(users::rename_self))
        .route("/chat/rooms", get(chat::list_rooms))
        .route(
            "/chat/rooms/:room_id",
            delete(chat::delete_room),
        )
        .route(
            "/chat/rooms/:room_id/messages",
            get(chat::room_messages).post(chat::send_message),
        )
        .route("/events", get(events::stream_events))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/workers", get(workers::public_workers))
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.db_pool {
        Some(pool) => common::database::health_check(pool).await.unwrap_or(false),
        None => true,
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if database { "ok" } else { "degraded" },
            "service": "api-service",
            "database": database,
        })),
    )
}
