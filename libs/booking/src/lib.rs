//! Booking domain for the Beolcho service
//!
//! This crate owns the reservation lifecycle, the worker application and
//! approval flow, account roles, chat rooms and the completion-notice
//! watcher. Persistence sits behind the traits in [`store`], implemented by
//! [`postgres::PgBookingStore`] for the services and by
//! [`memory::MemoryStore`] for tests.
//!
//! Every operation takes an explicit [`Session`] describing the caller;
//! nothing reads ambient "current user" state.

pub mod account;
pub mod chat;
pub mod completion;
pub mod error;
pub mod feed;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod reservation;
pub mod session;
pub mod store;
pub mod upload;
pub mod validation;
pub mod worker;

pub use error::{BookingError, BookingResult, StoreError, StoreResult};
pub use session::Session;
