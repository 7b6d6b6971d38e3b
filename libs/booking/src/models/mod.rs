//! Booking domain models

pub mod account;
pub mod chat;
pub mod geo;
pub mod reservation;
pub mod worker;

// Re-export for convenience
pub use account::{IdentityProfile, NewAccount, Role, RoleUpdate, UserAccount};
pub use chat::{ChatMessage, ChatRoom, NewChatMessage};
pub use geo::Coordinates;
pub use reservation::{NewReservation, Reservation, ReservationDraft, ReservationStatus};
pub use worker::{ApprovalState, PublicWorker, WorkerProfile, WorkerProfileUpdate, WorkerRoster};
