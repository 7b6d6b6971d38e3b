//! In-process store and blob backends
//!
//! Used by tests and by local runs without PostgreSQL. All records sit behind
//! one mutex so every multi-record batch is applied in a single critical
//! section.

use async_trait::async_trait;
use chrono::Utc;
use std::{
    collections::HashMap,
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
};
use uuid::Uuid;

use crate::{
    error::{StoreError, StoreResult},
    models::{
        ChatMessage, NewAccount, NewChatMessage, NewReservation, Reservation, ReservationStatus,
        Role, RoleUpdate, UserAccount, WorkerProfile,
    },
    store::{BlobStore, ChatStore, DirectoryStore, ReservationStore},
};

#[derive(Default)]
struct Records {
    // insertion order doubles as creation order
    reservations: Vec<Reservation>,
    accounts: Vec<UserAccount>,
    workers: HashMap<Uuid, WorkerProfile>,
    messages: Vec<ChatMessage>,
}

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Records>,
    failing_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make later record writes (inserts, profile saves, avatar writes) fail
    pub fn fail_writes(&self, failing: bool) {
        self.failing_writes.store(failing, Ordering::SeqCst);
    }

    fn writable(&self) -> StoreResult<()> {
        if self.failing_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("memory store rejected the write".to_string()));
        }
        Ok(())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Records>> {
        self.records
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn insert_reservation(&self, reservation: NewReservation) -> StoreResult<Reservation> {
        self.writable()?;
        let record = Reservation {
            id: Uuid::new_v4(),
            customer_id: reservation.customer_id,
            customer_name: reservation.customer_name,
            customer_phone: reservation.customer_phone,
            location_name: reservation.location_name,
            coordinates: reservation.coordinates,
            requested_date: reservation.requested_date,
            description: reservation.description,
            photo_urls: reservation.photo_urls,
            status: reservation.status,
            created_at: Utc::now(),
        };
        self.lock()?.reservations.push(record.clone());
        Ok(record)
    }

    async fn get_reservation(&self, id: Uuid) -> StoreResult<Option<Reservation>> {
        Ok(self.lock()?.reservations.iter().find(|r| r.id == id).cloned())
    }

    async fn update_reservation_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> StoreResult<Option<Reservation>> {
        let mut records = self.lock()?;
        Ok(records
            .reservations
            .iter_mut()
            .find(|r| r.id == id)
            .map(|r| {
                r.status = status;
                r.clone()
            }))
    }

    async fn delete_reservation(&self, id: Uuid) -> StoreResult<bool> {
        let mut records = self.lock()?;
        let before = records.reservations.len();
        records.reservations.retain(|r| r.id != id);
        Ok(records.reservations.len() != before)
    }

    async fn list_reservations(&self) -> StoreResult<Vec<Reservation>> {
        Ok(self.lock()?.reservations.iter().rev().cloned().collect())
    }

    async fn list_customer_reservations(
        &self,
        customer_id: Uuid,
        status: Option<ReservationStatus>,
    ) -> StoreResult<Vec<Reservation>> {
        Ok(self
            .lock()?
            .reservations
            .iter()
            .rev()
            .filter(|r| r.customer_id == customer_id)
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn get_account(&self, id: Uuid) -> StoreResult<Option<UserAccount>> {
        Ok(self.lock()?.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        Ok(self
            .lock()?
            .accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert_account(&self, account: NewAccount) -> StoreResult<UserAccount> {
        self.writable()?;
        let mut records = self.lock()?;
        if records.accounts.iter().any(|a| a.id == account.id) {
            return Err(StoreError::Backend(format!(
                "account {} already exists",
                account.id
            )));
        }
        let record = UserAccount {
            id: account.id,
            email: account.email,
            display_name: account.display_name,
            role: account.role,
            photo_url: None,
            created_at: Utc::now(),
        };
        records.accounts.push(record.clone());
        Ok(record)
    }

    async fn list_accounts(&self) -> StoreResult<Vec<UserAccount>> {
        Ok(self.lock()?.accounts.iter().rev().cloned().collect())
    }

    async fn rename_account(&self, id: Uuid, display_name: &str) -> StoreResult<bool> {
        let mut records = self.lock()?;
        match records.accounts.iter_mut().find(|a| a.id == id) {
            Some(account) => {
                account.display_name = display_name.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_account_details(
        &self,
        id: Uuid,
        display_name: &str,
        email: &str,
        sync_worker_name: bool,
    ) -> StoreResult<bool> {
        let mut records = self.lock()?;
        let Some(account) = records.accounts.iter_mut().find(|a| a.id == id) else {
            return Ok(false);
        };
        account.display_name = display_name.to_string();
        account.email = email.to_string();

        if sync_worker_name {
            if let Some(profile) = records.workers.get_mut(&id) {
                profile.display_name = display_name.to_string();
                profile.updated_at = Utc::now();
            }
        }
        Ok(true)
    }

    async fn delete_account(&self, id: Uuid) -> StoreResult<bool> {
        let mut records = self.lock()?;
        let before = records.accounts.len();
        records.accounts.retain(|a| a.id != id);
        let removed = records.accounts.len() != before;
        if removed {
            records.workers.remove(&id);
        }
        Ok(removed)
    }

    async fn set_account_photo(&self, account_id: Uuid, url: &str) -> StoreResult<bool> {
        self.writable()?;
        let mut records = self.lock()?;
        let Records {
            accounts, workers, ..
        } = &mut *records;

        let Some(account) = accounts.iter_mut().find(|a| a.id == account_id) else {
            return Ok(false);
        };
        account.photo_url = Some(url.to_string());

        if let Some(profile) = workers.get_mut(&account_id) {
            profile.photo_url = Some(url.to_string());
            profile.updated_at = Utc::now();
        }
        Ok(true)
    }

    async fn get_worker(&self, account_id: Uuid) -> StoreResult<Option<WorkerProfile>> {
        Ok(self.lock()?.workers.get(&account_id).cloned())
    }

    async fn list_workers(&self, approved_only: bool) -> StoreResult<Vec<WorkerProfile>> {
        let records = self.lock()?;
        let mut workers: Vec<WorkerProfile> = records
            .workers
            .values()
            .filter(|w| !approved_only || w.is_approved)
            .cloned()
            .collect();
        workers.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(workers)
    }

    async fn save_worker_profile(&self, profile: &WorkerProfile) -> StoreResult<WorkerProfile> {
        self.writable()?;
        let mut records = self.lock()?;
        let mut stored = profile.clone();
        if let Some(existing) = records.workers.get(&profile.account_id) {
            stored.is_approved = existing.is_approved;
        }
        records.workers.insert(stored.account_id, stored.clone());
        Ok(stored)
    }

    async fn set_approval_and_role(
        &self,
        account_id: Uuid,
        approved: bool,
        role: Role,
    ) -> StoreResult<bool> {
        let mut records = self.lock()?;
        let Records {
            accounts, workers, ..
        } = &mut *records;

        let (Some(account), Some(profile)) = (
            accounts.iter_mut().find(|a| a.id == account_id),
            workers.get_mut(&account_id),
        ) else {
            return Ok(false);
        };

        profile.is_approved = approved;
        profile.updated_at = Utc::now();
        account.role = role;
        Ok(true)
    }

    async fn set_role(&self, account_id: Uuid, role: Role) -> StoreResult<Option<RoleUpdate>> {
        let mut records = self.lock()?;
        let Records {
            accounts, workers, ..
        } = &mut *records;

        let Some(account) = accounts.iter_mut().find(|a| a.id == account_id) else {
            return Ok(None);
        };
        let previous = account.role;
        account.role = role;

        let profile_synced = match workers.get_mut(&account_id) {
            Some(profile) => {
                profile.is_approved = role == Role::Worker;
                profile.updated_at = Utc::now();
                true
            }
            None => false,
        };

        Ok(Some(RoleUpdate {
            previous,
            profile_synced,
        }))
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn insert_message(&self, message: NewChatMessage) -> StoreResult<ChatMessage> {
        self.writable()?;
        let record = ChatMessage {
            id: Uuid::new_v4(),
            room_id: message.room_id,
            sender_id: message.sender_id,
            sender_name: message.sender_name,
            text: message.text,
            created_at: Utc::now(),
            is_read: false,
        };
        self.lock()?.messages.push(record.clone());
        Ok(record)
    }

    async fn room_messages(&self, room_id: Uuid) -> StoreResult<Vec<ChatMessage>> {
        Ok(self
            .lock()?
            .messages
            .iter()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn recent_messages(&self, limit: usize) -> StoreResult<Vec<ChatMessage>> {
        Ok(self
            .lock()?
            .messages
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn delete_room(&self, room_id: Uuid) -> StoreResult<u64> {
        let mut records = self.lock()?;
        let before = records.messages.len();
        records.messages.retain(|m| m.room_id != room_id);
        Ok((before - records.messages.len()) as u64)
    }
}

/// Blob store keeping objects in memory, served as `memory://{path}`
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    failing: Mutex<Vec<String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later `put` whose path contains `fragment` fail
    pub fn fail_paths_containing(&self, fragment: &str) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.push(fragment.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects
            .lock()
            .map(|o| o.contains_key(path))
            .unwrap_or(false)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, path: &str, data: Vec<u8>, content_type: &str) -> StoreResult<String> {
        let should_fail = self
            .failing
            .lock()
            .map_err(|_| StoreError::Blob("blob store lock poisoned".to_string()))?
            .iter()
            .any(|fragment| path.contains(fragment.as_str()));
        if should_fail {
            return Err(StoreError::Blob(format!("upload rejected: {}", path)));
        }

        self.objects
            .lock()
            .map_err(|_| StoreError::Blob("blob store lock poisoned".to_string()))?
            .insert(path.to_string(), (data, content_type.to_string()));
        Ok(format!("memory://{}", path))
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        self.objects
            .lock()
            .map_err(|_| StoreError::Blob("blob store lock poisoned".to_string()))?
            .remove(path);
        Ok(())
    }
}
