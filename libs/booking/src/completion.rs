//! One-time "work completed" notice for customers
//!
//! The watcher looks at the customer's COMPLETED reservations and surfaces
//! each one until it is dismissed. Dismissals are recorded in a device-local
//! [`AckStore`] and are never sent to the server, so a different device will
//! show the notice again.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::{StoreError, StoreResult},
    feed::ChangeEvent,
    models::{Reservation, ReservationStatus},
};

/// Acknowledgment key for a reservation
pub fn ack_key(reservation_id: Uuid) -> String {
    format!("notified_completion_{}", reservation_id)
}

/// Device-local acknowledgment flags
pub trait AckStore: Send + Sync {
    fn is_acknowledged(&self, key: &str) -> bool;

    fn acknowledge(&self, key: &str) -> StoreResult<()>;

    /// Forget every flag
    fn clear(&self) -> StoreResult<()>;
}

#[derive(Debug, Default)]
pub struct MemoryAckStore {
    keys: Mutex<HashSet<String>>,
}

impl MemoryAckStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn keys(&self) -> StoreResult<MutexGuard<'_, HashSet<String>>> {
        self.keys
            .lock()
            .map_err(|_| StoreError::Backend("ack store lock poisoned".to_string()))
    }
}

impl AckStore for MemoryAckStore {
    fn is_acknowledged(&self, key: &str) -> bool {
        self.keys().map(|k| k.contains(key)).unwrap_or(false)
    }

    fn acknowledge(&self, key: &str) -> StoreResult<()> {
        self.keys()?.insert(key.to_string());
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        self.keys()?.clear();
        Ok(())
    }
}

/// Flags persisted as a JSON array of keys
#[derive(Debug)]
pub struct FileAckStore {
    path: PathBuf,
    keys: Mutex<HashSet<String>>,
}

impl FileAckStore {
    /// Open or create the flag file; a missing file starts empty
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let keys = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => HashSet::new(),
            Ok(bytes) => serde_json::from_slice::<HashSet<String>>(&bytes).map_err(|e| {
                StoreError::Corrupt(format!("ack file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                return Err(StoreError::Backend(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        debug!("Loaded {} acknowledgment flags from {}", keys.len(), path.display());
        Ok(Self {
            path,
            keys: Mutex::new(keys),
        })
    }

    fn persist(&self, keys: &HashSet<String>) -> StoreResult<()> {
        let mut sorted: Vec<&String> = keys.iter().collect();
        sorted.sort();
        let bytes = serde_json::to_vec_pretty(&sorted)
            .map_err(|e| StoreError::Backend(format!("failed to encode ack flags: {}", e)))?;
        fs::write(&self.path, bytes).map_err(|e| {
            StoreError::Backend(format!("failed to write {}: {}", self.path.display(), e))
        })
    }

    fn keys(&self) -> StoreResult<MutexGuard<'_, HashSet<String>>> {
        self.keys
            .lock()
            .map_err(|_| StoreError::Backend("ack store lock poisoned".to_string()))
    }
}

impl AckStore for FileAckStore {
    fn is_acknowledged(&self, key: &str) -> bool {
        self.keys().map(|k| k.contains(key)).unwrap_or(false)
    }

    fn acknowledge(&self, key: &str) -> StoreResult<()> {
        let mut keys = self.keys()?;
        if keys.insert(key.to_string()) {
            self.persist(&keys)?;
        }
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        let mut keys = self.keys()?;
        keys.clear();
        self.persist(&keys)
    }
}

/// Decides which completed reservations still need a notice
#[derive(Clone)]
pub struct CompletionWatcher {
    customer_id: Uuid,
    acks: Arc<dyn AckStore>,
}

impl CompletionWatcher {
    pub fn new(customer_id: Uuid, acks: Arc<dyn AckStore>) -> Self {
        Self { customer_id, acks }
    }

    fn needs_notice(&self, reservation: &Reservation) -> bool {
        reservation.customer_id == self.customer_id
            && reservation.status == ReservationStatus::Completed
            && !self.acks.is_acknowledged(&ack_key(reservation.id))
    }

    /// Unacknowledged completed reservations in a snapshot, in snapshot order
    pub fn pending<'a>(&self, snapshot: &'a [Reservation]) -> Vec<&'a Reservation> {
        snapshot.iter().filter(|r| self.needs_notice(r)).collect()
    }

    /// The notice to show next for a snapshot, if any
    pub fn next_prompt<'a>(&self, snapshot: &'a [Reservation]) -> Option<&'a Reservation> {
        snapshot.iter().find(|r| self.needs_notice(r))
    }

    /// A notice triggered by a live change, if the change completes one of
    /// the customer's reservations that has not been acknowledged
    pub fn observe_event(&self, event: &ChangeEvent) -> Option<Reservation> {
        match event {
            ChangeEvent::ReservationCreated { reservation }
            | ChangeEvent::ReservationUpdated { reservation }
                if self.needs_notice(reservation) =>
            {
                Some(reservation.clone())
            }
            _ => None,
        }
    }

    /// Record that the notice for `reservation_id` was dismissed on this device
    pub fn dismiss(&self, reservation_id: Uuid) -> StoreResult<()> {
        info!("Completion notice dismissed: {}", reservation_id);
        self.acks.acknowledge(&ack_key(reservation_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;
    use chrono::{NaiveDate, Utc};

    fn reservation(customer_id: Uuid, status: ReservationStatus) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            customer_id,
            customer_name: "홍길동".to_string(),
            customer_phone: "010-1234-5678".to_string(),
            location_name: "경북 성주군 성주읍".to_string(),
            coordinates: Coordinates::new(35.9, 128.2),
            requested_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            description: String::new(),
            photo_urls: vec![],
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_dismissed_notice_is_not_shown_again() {
        let me = Uuid::new_v4();
        let watcher = CompletionWatcher::new(me, Arc::new(MemoryAckStore::new()));
        let done = reservation(me, ReservationStatus::Completed);
        let snapshot = vec![reservation(me, ReservationStatus::Pending), done.clone()];

        assert_eq!(watcher.next_prompt(&snapshot).map(|r| r.id), Some(done.id));
        // not dismissed yet: still shown
        assert_eq!(watcher.pending(&snapshot).len(), 1);

        watcher.dismiss(done.id).unwrap();
        assert!(watcher.next_prompt(&snapshot).is_none());
        assert!(
            watcher
                .observe_event(&ChangeEvent::ReservationUpdated { reservation: done })
                .is_none()
        );
    }

    #[test]
    fn test_other_customers_and_statuses_are_ignored() {
        let me = Uuid::new_v4();
        let watcher = CompletionWatcher::new(me, Arc::new(MemoryAckStore::new()));

        let theirs = reservation(Uuid::new_v4(), ReservationStatus::Completed);
        let confirmed = reservation(me, ReservationStatus::Confirmed);

        assert!(watcher.next_prompt(&[theirs.clone(), confirmed.clone()]).is_none());
        assert!(
            watcher
                .observe_event(&ChangeEvent::ReservationUpdated { reservation: theirs })
                .is_none()
        );
        assert!(
            watcher
                .observe_event(&ChangeEvent::ReservationUpdated { reservation: confirmed })
                .is_none()
        );
    }

    #[test]
    fn test_clearing_flags_shows_notice_again() {
        let me = Uuid::new_v4();
        let acks = Arc::new(MemoryAckStore::new());
        let watcher = CompletionWatcher::new(me, acks.clone());
        let done = reservation(me, ReservationStatus::Completed);

        watcher.dismiss(done.id).unwrap();
        assert!(acks.is_acknowledged(&ack_key(done.id)));

        acks.clear().unwrap();
        assert!(watcher.next_prompt(std::slice::from_ref(&done)).is_some());
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let path = std::env::temp_dir().join(format!("beolcho_acks_{}.json", Uuid::new_v4()));
        let id = Uuid::new_v4();

        {
            let store = FileAckStore::open(&path).unwrap();
            assert!(!store.is_acknowledged(&ack_key(id)));
            store.acknowledge(&ack_key(id)).unwrap();
        }

        let reopened = FileAckStore::open(&path).unwrap();
        assert!(reopened.is_acknowledged(&ack_key(id)));

        reopened.clear().unwrap();
        assert!(!FileAckStore::open(&path).unwrap().is_acknowledged(&ack_key(id)));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let path = std::env::temp_dir().join(format!("beolcho_acks_{}.json", Uuid::new_v4()));
        fs::write(&path, b"not json").unwrap();

        assert!(matches!(
            FileAckStore::open(&path),
            Err(StoreError::Corrupt(_))
        ));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_ack_key_format() {
        let id = Uuid::nil();
        assert_eq!(
            ack_key(id),
            "notified_completion_00000000-0000-0000-0000-000000000000"
        );
    }
}
