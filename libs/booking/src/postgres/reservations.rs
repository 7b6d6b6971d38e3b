use async_trait::async_trait;
use sqlx::{Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::PgBookingStore;
use crate::{
    error::{StoreError, StoreResult},
    models::{Coordinates, NewReservation, Reservation, ReservationStatus},
    store::ReservationStore,
};

const COLUMNS: &str = "id, customer_id, customer_name, customer_phone, location_name, lat, lng, \
                       requested_date, description, photo_urls, status, created_at";

fn map_reservation(row: &PgRow) -> StoreResult<Reservation> {
    let status: String = row.get("status");
    let status = status
        .parse::<ReservationStatus>()
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;

    Ok(Reservation {
        id: row.get("id"),
        customer_id: row.get("customer_id"),
        customer_name: row.get("customer_name"),
        customer_phone: row.get("customer_phone"),
        location_name: row.get("location_name"),
        coordinates: Coordinates::new(row.get("lat"), row.get("lng")),
        requested_date: row.get("requested_date"),
        description: row.get("description"),
        photo_urls: row.get("photo_urls"),
        status,
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl ReservationStore for PgBookingStore {
    async fn insert_reservation(&self, reservation: NewReservation) -> StoreResult<Reservation> {
        info!("Inserting reservation for customer: {}", reservation.customer_id);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO reservations
                (customer_id, customer_name, customer_phone, location_name, lat, lng,
                 requested_date, description, photo_urls, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(reservation.customer_id)
        .bind(&reservation.customer_name)
        .bind(&reservation.customer_phone)
        .bind(&reservation.location_name)
        .bind(reservation.coordinates.lat)
        .bind(reservation.coordinates.lng)
        .bind(reservation.requested_date)
        .bind(&reservation.description)
        .bind(&reservation.photo_urls)
        .bind(reservation.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        map_reservation(&row)
    }

    async fn get_reservation(&self, id: Uuid) -> StoreResult<Option<Reservation>> {
        info!("Finding reservation by ID: {}", id);

        let row = sqlx::query(&format!("SELECT {} FROM reservations WHERE id = $1", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_reservation).transpose()
    }

    async fn update_reservation_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> StoreResult<Option<Reservation>> {
        info!("Updating reservation {} status to {}", id, status);

        let row = sqlx::query(&format!(
            "UPDATE reservations SET status = $2 WHERE id = $1 RETURNING {}",
            COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_reservation).transpose()
    }

    async fn delete_reservation(&self, id: Uuid) -> StoreResult<bool> {
        info!("Deleting reservation: {}", id);

        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_reservations(&self) -> StoreResult<Vec<Reservation>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM reservations ORDER BY created_at DESC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_reservation).collect()
    }

    async fn list_customer_reservations(
        &self,
        customer_id: Uuid,
        status: Option<ReservationStatus>,
    ) -> StoreResult<Vec<Reservation>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM reservations
            WHERE customer_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
            COLUMNS
        ))
        .bind(customer_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_reservation).collect()
    }
}
