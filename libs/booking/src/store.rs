//! Persistence seams
//!
//! Each trait groups the document operations one service needs. Methods that
//! touch more than one record (approval + role, account + profile) must be
//! applied all-or-nothing by the implementation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::StoreResult,
    models::{
        ChatMessage, NewAccount, NewChatMessage, NewReservation, Reservation, ReservationStatus,
        Role, RoleUpdate, UserAccount, WorkerProfile,
    },
};

#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Write a new reservation; the store assigns `id` and `created_at`
    async fn insert_reservation(&self, reservation: NewReservation) -> StoreResult<Reservation>;

    async fn get_reservation(&self, id: Uuid) -> StoreResult<Option<Reservation>>;

    /// Overwrite the status; `None` when the reservation does not exist
    async fn update_reservation_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> StoreResult<Option<Reservation>>;

    /// Returns whether a reservation was removed
    async fn delete_reservation(&self, id: Uuid) -> StoreResult<bool>;

    /// All reservations, newest first
    async fn list_reservations(&self) -> StoreResult<Vec<Reservation>>;

    /// A customer's reservations, newest first, optionally filtered by status
    async fn list_customer_reservations(
        &self,
        customer_id: Uuid,
        status: Option<ReservationStatus>,
    ) -> StoreResult<Vec<Reservation>>;
}

#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn get_account(&self, id: Uuid) -> StoreResult<Option<UserAccount>>;

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>>;

    async fn insert_account(&self, account: NewAccount) -> StoreResult<UserAccount>;

    /// All accounts, newest first
    async fn list_accounts(&self) -> StoreResult<Vec<UserAccount>>;

    async fn rename_account(&self, id: Uuid, display_name: &str) -> StoreResult<bool>;

    /// Rewrite name and email; with `sync_worker_name` the worker profile
    /// display name is rewritten in the same batch
    async fn update_account_details(
        &self,
        id: Uuid,
        display_name: &str,
        email: &str,
        sync_worker_name: bool,
    ) -> StoreResult<bool>;

    /// Remove the account and any worker profile in one batch
    async fn delete_account(&self, id: Uuid) -> StoreResult<bool>;

    /// Write the avatar URL on the account and, when one exists, on the
    /// worker profile in one batch. Returns false when the account is missing.
    async fn set_account_photo(&self, account_id: Uuid, url: &str) -> StoreResult<bool>;

    async fn get_worker(&self, account_id: Uuid) -> StoreResult<Option<WorkerProfile>>;

    /// Worker profiles ordered by most recent update
    async fn list_workers(&self, approved_only: bool) -> StoreResult<Vec<WorkerProfile>>;

    /// Insert or update a profile; an existing `is_approved` value is kept
    async fn save_worker_profile(&self, profile: &WorkerProfile) -> StoreResult<WorkerProfile>;

    /// Write the approval flag and the account role together.
    /// Returns false when either record is missing, in which case nothing is written.
    async fn set_approval_and_role(
        &self,
        account_id: Uuid,
        approved: bool,
        role: Role,
    ) -> StoreResult<bool>;

    /// Write the account role, syncing `is_approved` when a profile exists
    async fn set_role(&self, account_id: Uuid, role: Role) -> StoreResult<Option<RoleUpdate>>;
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn insert_message(&self, message: NewChatMessage) -> StoreResult<ChatMessage>;

    /// Messages of one room, oldest first
    async fn room_messages(&self, room_id: Uuid) -> StoreResult<Vec<ChatMessage>>;

    /// Most recent messages across all rooms, newest first
    async fn recent_messages(&self, limit: usize) -> StoreResult<Vec<ChatMessage>>;

    /// Remove every message of a room in one batch; returns the count removed
    async fn delete_room(&self, room_id: Uuid) -> StoreResult<u64>;
}

/// Object storage for uploaded photos
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `path` and return its public URL
    async fn put(&self, path: &str, data: Vec<u8>, content_type: &str) -> StoreResult<String>;

    async fn delete(&self, path: &str) -> StoreResult<()>;
}
