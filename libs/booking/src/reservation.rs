//! Reservation lifecycle operations

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{BookingError, BookingResult},
    feed::{ChangeEvent, ChangeFeed},
    models::{NewReservation, Reservation, ReservationDraft, ReservationStatus},
    session::Session,
    store::ReservationStore,
    upload::{PhotoUpload, PhotoUploader},
    validation::validate_reservation_draft,
};

/// Creates, reassigns and removes reservations
#[derive(Clone)]
pub struct ReservationService {
    reservations: Arc<dyn ReservationStore>,
    uploader: PhotoUploader,
    feed: ChangeFeed,
}

impl ReservationService {
    pub fn new(
        reservations: Arc<dyn ReservationStore>,
        uploader: PhotoUploader,
        feed: ChangeFeed,
    ) -> Self {
        Self {
            reservations,
            uploader,
            feed,
        }
    }

    /// Submit a new reservation for the caller
    ///
    /// The form and photos are validated before any upload. Photos are
    /// uploaded concurrently; the record is written only once all of them
    /// are stored. If the write fails the uploaded photos are removed.
    pub async fn create(
        &self,
        session: &Session,
        draft: ReservationDraft,
        photos: Vec<PhotoUpload>,
    ) -> BookingResult<Reservation> {
        info!("Creating reservation for customer: {}", session.account_id);

        let checked = validate_reservation_draft(&draft)?;
        self.uploader
            .validate(&photos, self.uploader.limits().max_reservation_photos)?;

        let prefix = format!("reservations/{}", session.account_id);
        let stored = self.uploader.upload_all(&prefix, photos).await?;

        let new_reservation = NewReservation {
            customer_id: session.account_id,
            customer_name: checked.customer_name,
            customer_phone: checked.customer_phone,
            location_name: checked.location_name,
            coordinates: checked.coordinates,
            requested_date: checked.requested_date,
            description: checked.description,
            photo_urls: stored.iter().map(|b| b.url.clone()).collect(),
            status: ReservationStatus::Pending,
        };

        let reservation = match self.reservations.insert_reservation(new_reservation).await {
            Ok(reservation) => reservation,
            Err(e) => {
                self.uploader.discard(&stored).await;
                return Err(e.into());
            }
        };

        self.feed.publish(ChangeEvent::ReservationCreated {
            reservation: reservation.clone(),
        });
        Ok(reservation)
    }

    /// Overwrite the status of a reservation. Administrators only.
    pub async fn set_status(
        &self,
        session: &Session,
        reservation_id: Uuid,
        status: ReservationStatus,
    ) -> BookingResult<Reservation> {
        session.require_admin("changing reservation status")?;
        info!("Setting reservation {} status to {}", reservation_id, status);

        let current = self
            .reservations
            .get_reservation(reservation_id)
            .await?
            .ok_or_else(|| not_found(reservation_id))?;

        if !current.status.is_conventional_transition(status) {
            warn!(
                "Unconventional status change on reservation {}: {} -> {}",
                reservation_id, current.status, status
            );
        }

        let updated = self
            .reservations
            .update_reservation_status(reservation_id, status)
            .await?
            .ok_or_else(|| not_found(reservation_id))?;

        self.feed.publish(ChangeEvent::ReservationUpdated {
            reservation: updated.clone(),
        });
        Ok(updated)
    }

    /// Permanently remove a reservation in any status. Administrators only.
    pub async fn delete(&self, session: &Session, reservation_id: Uuid) -> BookingResult<()> {
        session.require_admin("deleting a reservation")?;
        info!("Deleting reservation: {}", reservation_id);

        let current = self
            .reservations
            .get_reservation(reservation_id)
            .await?
            .ok_or_else(|| not_found(reservation_id))?;

        if !self.reservations.delete_reservation(reservation_id).await? {
            return Err(not_found(reservation_id));
        }

        self.feed.publish(ChangeEvent::ReservationDeleted {
            id: reservation_id,
            customer_id: current.customer_id,
        });
        Ok(())
    }

    pub async fn get(&self, session: &Session, reservation_id: Uuid) -> BookingResult<Reservation> {
        let reservation = self
            .reservations
            .get_reservation(reservation_id)
            .await?
            .ok_or_else(|| not_found(reservation_id))?;
        session.require_owner_or_admin(reservation.customer_id, "reading a reservation")?;
        Ok(reservation)
    }

    /// Every reservation, newest first. Administrators only.
    pub async fn list_all(&self, session: &Session) -> BookingResult<Vec<Reservation>> {
        session.require_admin("listing all reservations")?;
        Ok(self.reservations.list_reservations().await?)
    }

    pub async fn list_mine(&self, session: &Session) -> BookingResult<Vec<Reservation>> {
        Ok(self
            .reservations
            .list_customer_reservations(session.account_id, None)
            .await?)
    }

    /// The caller's completed reservations; input to the completion watcher
    pub async fn list_mine_completed(&self, session: &Session) -> BookingResult<Vec<Reservation>> {
        Ok(self
            .reservations
            .list_customer_reservations(session.account_id, Some(ReservationStatus::Completed))
            .await?)
    }
}

fn not_found(id: Uuid) -> BookingError {
    BookingError::NotFound(format!("reservation {}", id))
}
