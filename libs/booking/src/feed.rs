//! Change feed for live views
//!
//! Services publish an event after every successful write. Subscribers hold a
//! broadcast receiver; dropping it ends the subscription.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::{
    models::{ChatMessage, PublicWorker, Reservation, UserAccount, WorkerProfile},
    session::Session,
};

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeEvent {
    ReservationCreated { reservation: Reservation },
    ReservationUpdated { reservation: Reservation },
    ReservationDeleted { id: Uuid, customer_id: Uuid },
    WorkerChanged { worker: WorkerProfile },
    /// Masked form of `WorkerChanged` for viewers other than the worker and admins
    PublicWorkerChanged { worker: PublicWorker },
    AccountChanged { account: UserAccount },
    AccountDeleted { id: Uuid },
    ChatMessage { message: ChatMessage },
    ChatRoomDeleted { room_id: Uuid },
}

impl ChangeEvent {
    /// Whether the caller may see this event on their live feed
    pub fn visible_to(&self, session: &Session) -> bool {
        if session.is_admin() {
            return true;
        }

        let me = session.account_id;
        match self {
            ChangeEvent::ReservationCreated { reservation }
            | ChangeEvent::ReservationUpdated { reservation } => reservation.customer_id == me,
            ChangeEvent::ReservationDeleted { customer_id, .. } => *customer_id == me,
            ChangeEvent::WorkerChanged { worker } => worker.is_approved || worker.account_id == me,
            ChangeEvent::PublicWorkerChanged { .. } => true,
            ChangeEvent::AccountChanged { account } => account.id == me,
            ChangeEvent::AccountDeleted { id } => *id == me,
            ChangeEvent::ChatMessage { message } => message.room_id == me,
            ChangeEvent::ChatRoomDeleted { room_id } => *room_id == me,
        }
    }

    /// The event as the caller may receive it, or `None` when hidden
    ///
    /// Approved workers reach every viewer, but only the worker and
    /// administrators get the full profile; everyone else gets the public
    /// entry with a masked phone.
    pub fn view_for(&self, session: &Session) -> Option<ChangeEvent> {
        if !self.visible_to(session) {
            return None;
        }

        match self {
            ChangeEvent::WorkerChanged { worker }
                if !session.is_admin() && worker.account_id != session.account_id =>
            {
                Some(ChangeEvent::PublicWorkerChanged {
                    worker: PublicWorker::from(worker),
                })
            }
            event => Some(event.clone()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChangeEvent::ReservationCreated { .. } => "reservation_created",
            ChangeEvent::ReservationUpdated { .. } => "reservation_updated",
            ChangeEvent::ReservationDeleted { .. } => "reservation_deleted",
            ChangeEvent::WorkerChanged { .. } | ChangeEvent::PublicWorkerChanged { .. } => {
                "worker_changed"
            }
            ChangeEvent::AccountChanged { .. } => "account_changed",
            ChangeEvent::AccountDeleted { .. } => "account_deleted",
            ChangeEvent::ChatMessage { .. } => "chat_message",
            ChangeEvent::ChatRoomDeleted { .. } => "chat_room_deleted",
        }
    }
}

/// Fan-out of [`ChangeEvent`]s to live subscribers
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishing with no subscribers is not an error
    pub fn publish(&self, event: ChangeEvent) {
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => debug!("Published {} to {} subscribers", name, receivers),
            Err(_) => debug!("Published {} with no subscribers", name),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
