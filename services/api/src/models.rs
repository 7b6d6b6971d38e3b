//! API models for request and response payloads

use booking::{
    models::{ReservationDraft, WorkerProfileUpdate},
    upload::PhotoUpload,
};
use serde::{Deserialize, Serialize};

/// Reservation form plus attached photos
#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    #[serde(flatten)]
    pub draft: ReservationDraft,
    #[serde(default)]
    pub photos: Vec<PhotoUpload>,
}

/// New status, as a code (`COMPLETED`) or a label (`작업완료`)
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApplyRequest {
    pub display_name: String,
}

/// Profile edits plus portfolio photos to append
#[derive(Debug, Deserialize)]
pub struct UpdateWorkerRequest {
    #[serde(flatten)]
    pub update: WorkerProfileUpdate,
    #[serde(default)]
    pub portfolio_photos: Vec<PhotoUpload>,
}

#[derive(Debug, Deserialize)]
pub struct RemovePortfolioRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct PhotoUrlResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct AccountDetailsRequest {
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}
