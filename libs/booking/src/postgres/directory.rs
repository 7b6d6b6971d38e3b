use async_trait::async_trait;
use sqlx::{Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::PgBookingStore;
use crate::{
    error::{StoreError, StoreResult},
    models::{Coordinates, NewAccount, Role, RoleUpdate, UserAccount, WorkerProfile},
    store::DirectoryStore,
};

const ACCOUNT_COLUMNS: &str = "id, email, display_name, role, photo_url, created_at";

const WORKER_COLUMNS: &str = "account_id, display_name, phone, bio, lat, lng, address, \
                              experience_years, is_available, photo_url, max_distance_km, \
                              equipment_count, portfolio_urls, is_approved, updated_at";

fn parse_role(raw: &str) -> StoreResult<Role> {
    raw.parse::<Role>()
        .map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn map_account(row: &PgRow) -> StoreResult<UserAccount> {
    let role: String = row.get("role");
    Ok(UserAccount {
        id: row.get("id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        role: parse_role(&role)?,
        photo_url: row.get("photo_url"),
        created_at: row.get("created_at"),
    })
}

fn map_worker(row: &PgRow) -> WorkerProfile {
    WorkerProfile {
        account_id: row.get("account_id"),
        display_name: row.get("display_name"),
        phone: row.get("phone"),
        bio: row.get("bio"),
        coordinates: Coordinates::new(row.get("lat"), row.get("lng")),
        address: row.get("address"),
        experience_years: row.get("experience_years"),
        is_available: row.get("is_available"),
        photo_url: row.get("photo_url"),
        max_distance_km: row.get("max_distance_km"),
        equipment_count: row.get("equipment_count"),
        portfolio_urls: row.get("portfolio_urls"),
        is_approved: row.get("is_approved"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl DirectoryStore for PgBookingStore {
    async fn get_account(&self, id: Uuid) -> StoreResult<Option<UserAccount>> {
        info!("Finding account by ID: {}", id);

        let row = sqlx::query(&format!(
            "SELECT {} FROM user_accounts WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_account).transpose()
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        info!("Finding account by email: {}", email);

        let row = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM user_accounts
            WHERE lower(email) = lower($1)
            ORDER BY created_at
            LIMIT 1
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_account).transpose()
    }

    async fn insert_account(&self, account: NewAccount) -> StoreResult<UserAccount> {
        info!("Creating account: {}", account.id);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO user_accounts (id, email, display_name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.display_name)
        .bind(account.role.as_str())
        .fetch_one(&self.pool)
        .await?;

        map_account(&row)
    }

    async fn list_accounts(&self) -> StoreResult<Vec<UserAccount>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM user_accounts ORDER BY created_at DESC",
            ACCOUNT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_account).collect()
    }

    async fn rename_account(&self, id: Uuid, display_name: &str) -> StoreResult<bool> {
        info!("Renaming account: {}", id);

        let result = sqlx::query("UPDATE user_accounts SET display_name = $2 WHERE id = $1")
            .bind(id)
            .bind(display_name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_account_details(
        &self,
        id: Uuid,
        display_name: &str,
        email: &str,
        sync_worker_name: bool,
    ) -> StoreResult<bool> {
        info!("Updating account details: {}", id);

        let mut tx = self.pool.begin().await?;

        let result =
            sqlx::query("UPDATE user_accounts SET display_name = $2, email = $3 WHERE id = $1")
                .bind(id)
                .bind(display_name)
                .bind(email)
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        if sync_worker_name {
            sqlx::query(
                "UPDATE worker_profiles SET display_name = $2, updated_at = now() WHERE account_id = $1",
            )
            .bind(id)
            .bind(display_name)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_account(&self, id: Uuid) -> StoreResult<bool> {
        info!("Deleting account and worker profile: {}", id);

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM user_accounts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM worker_profiles WHERE account_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn set_account_photo(&self, account_id: Uuid, url: &str) -> StoreResult<bool> {
        info!("Setting avatar for account: {}", account_id);

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE user_accounts SET photo_url = $2 WHERE id = $1")
            .bind(account_id)
            .bind(url)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            "UPDATE worker_profiles SET photo_url = $2, updated_at = now() WHERE account_id = $1",
        )
        .bind(account_id)
        .bind(url)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn get_worker(&self, account_id: Uuid) -> StoreResult<Option<WorkerProfile>> {
        info!("Finding worker profile: {}", account_id);

        let row = sqlx::query(&format!(
            "SELECT {} FROM worker_profiles WHERE account_id = $1",
            WORKER_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_worker))
    }

    async fn list_workers(&self, approved_only: bool) -> StoreResult<Vec<WorkerProfile>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM worker_profiles
            WHERE is_approved OR NOT $1
            ORDER BY updated_at DESC
            "#,
            WORKER_COLUMNS
        ))
        .bind(approved_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_worker).collect())
    }

    async fn save_worker_profile(&self, profile: &WorkerProfile) -> StoreResult<WorkerProfile> {
        info!("Saving worker profile: {}", profile.account_id);

        // is_approved is only written on insert; later saves keep the stored value
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO worker_profiles
                (account_id, display_name, phone, bio, lat, lng, address, experience_years,
                 is_available, photo_url, max_distance_km, equipment_count, portfolio_urls,
                 is_approved, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (account_id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                phone = EXCLUDED.phone,
                bio = EXCLUDED.bio,
                lat = EXCLUDED.lat,
                lng = EXCLUDED.lng,
                address = EXCLUDED.address,
                experience_years = EXCLUDED.experience_years,
                is_available = EXCLUDED.is_available,
                photo_url = EXCLUDED.photo_url,
                max_distance_km = EXCLUDED.max_distance_km,
                equipment_count = EXCLUDED.equipment_count,
                portfolio_urls = EXCLUDED.portfolio_urls,
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            WORKER_COLUMNS
        ))
        .bind(profile.account_id)
        .bind(&profile.display_name)
        .bind(&profile.phone)
        .bind(&profile.bio)
        .bind(profile.coordinates.lat)
        .bind(profile.coordinates.lng)
        .bind(&profile.address)
        .bind(profile.experience_years)
        .bind(profile.is_available)
        .bind(&profile.photo_url)
        .bind(profile.max_distance_km)
        .bind(profile.equipment_count)
        .bind(&profile.portfolio_urls)
        .bind(profile.is_approved)
        .bind(profile.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_worker(&row))
    }

    async fn set_approval_and_role(
        &self,
        account_id: Uuid,
        approved: bool,
        role: Role,
    ) -> StoreResult<bool> {
        info!(
            "Writing approval={} role={} for account: {}",
            approved, role, account_id
        );

        let mut tx = self.pool.begin().await?;

        let profile = sqlx::query(
            "UPDATE worker_profiles SET is_approved = $2, updated_at = now() WHERE account_id = $1",
        )
        .bind(account_id)
        .bind(approved)
        .execute(&mut *tx)
        .await?;

        let account = sqlx::query("UPDATE user_accounts SET role = $2 WHERE id = $1")
            .bind(account_id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;

        if profile.rows_affected() == 0 || account.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn set_role(&self, account_id: Uuid, role: Role) -> StoreResult<Option<RoleUpdate>> {
        info!("Setting role {} for account: {}", role, account_id);

        let mut tx = self.pool.begin().await?;

        let previous = sqlx::query("SELECT role FROM user_accounts WHERE id = $1 FOR UPDATE")
            .bind(account_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(previous) = previous else {
            tx.rollback().await?;
            return Ok(None);
        };
        let previous: String = previous.get("role");
        let previous = parse_role(&previous)?;

        sqlx::query("UPDATE user_accounts SET role = $2 WHERE id = $1")
            .bind(account_id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;

        let synced = sqlx::query(
            "UPDATE worker_profiles SET is_approved = $2, updated_at = now() WHERE account_id = $1",
        )
        .bind(account_id)
        .bind(role == Role::Worker)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(RoleUpdate {
            previous,
            profile_synced: synced.rows_affected() > 0,
        }))
    }
}
