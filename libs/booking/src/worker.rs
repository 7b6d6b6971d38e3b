//! Worker application and approval flow
//!
//! A customer applies, an administrator approves or revokes. Approval and the
//! account role always change together through
//! [`DirectoryStore::set_approval_and_role`].

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{BookingError, BookingResult},
    feed::{ChangeEvent, ChangeFeed},
    models::{
        ApprovalState, PublicWorker, Role, WorkerProfile, WorkerProfileUpdate, WorkerRoster,
    },
    session::Session,
    store::DirectoryStore,
    upload::{PhotoUpload, PhotoUploader},
    validation::{validate_display_name, validate_phone},
};

/// The caller's own position in the application flow
#[derive(Debug, Clone, Serialize)]
pub struct WorkerStanding {
    pub state: ApprovalState,
    pub profile: Option<WorkerProfile>,
}

#[derive(Clone)]
pub struct WorkerService {
    directory: Arc<dyn DirectoryStore>,
    uploader: PhotoUploader,
    feed: ChangeFeed,
}

impl WorkerService {
    pub fn new(directory: Arc<dyn DirectoryStore>, uploader: PhotoUploader, feed: ChangeFeed) -> Self {
        Self {
            directory,
            uploader,
            feed,
        }
    }

    /// Apply to become a worker
    ///
    /// Only customers may apply. A second application while one exists
    /// refreshes the display name and leaves approval untouched. An avatar
    /// uploaded beforehand carries over to the profile.
    pub async fn apply(
        &self,
        session: &Session,
        initial_display_name: &str,
    ) -> BookingResult<WorkerProfile> {
        if session.role != Role::Customer {
            return Err(BookingError::Authorization(
                "only customers can apply as workers".to_string(),
            ));
        }
        info!("Worker application from account: {}", session.account_id);

        let display_name = match initial_display_name.trim() {
            "" => session.display_name.trim(),
            name => name,
        };
        validate_display_name(display_name)?;

        let profile = match self.directory.get_worker(session.account_id).await? {
            Some(mut existing) => {
                existing.display_name = display_name.to_string();
                existing.updated_at = Utc::now();
                existing
            }
            None => {
                let photo_url = self
                    .directory
                    .get_account(session.account_id)
                    .await?
                    .and_then(|account| account.photo_url);
                WorkerProfile::application(session.account_id, display_name.to_string(), photo_url)
            }
        };

        let saved = self.directory.save_worker_profile(&profile).await?;
        self.publish_worker(&saved);
        Ok(saved)
    }

    pub async fn standing(&self, session: &Session) -> BookingResult<WorkerStanding> {
        let profile = self.directory.get_worker(session.account_id).await?;
        Ok(WorkerStanding {
            state: ApprovalState::of(profile.as_ref()),
            profile,
        })
    }

    /// Merge the caller's edits and append new portfolio photos
    pub async fn update_profile(
        &self,
        session: &Session,
        update: WorkerProfileUpdate,
        new_portfolio_photos: Vec<PhotoUpload>,
    ) -> BookingResult<WorkerProfile> {
        info!("Updating worker profile: {}", session.account_id);

        let mut profile = self.own_profile(session).await?;

        if let Some(name) = &update.display_name {
            validate_display_name(name)?;
        }
        if let Some(coordinates) = &update.coordinates {
            if !coordinates.is_valid() {
                return Err(BookingError::Validation("좌표가 올바르지 않습니다.".to_string()));
            }
        }
        profile.merge(update);
        if profile.phone.trim().is_empty() || profile.address.trim().is_empty() {
            return Err(BookingError::Validation(
                "연락처와 주소는 필수입니다.".to_string(),
            ));
        }
        validate_phone(&profile.phone)?;

        let room = self
            .uploader
            .limits()
            .max_portfolio_photos
            .saturating_sub(profile.portfolio_urls.len());
        self.uploader.validate(&new_portfolio_photos, room)?;

        let prefix = format!("portfolios/{}", session.account_id);
        let stored = self.uploader.upload_all(&prefix, new_portfolio_photos).await?;
        profile
            .portfolio_urls
            .extend(stored.iter().map(|b| b.url.clone()));

        let saved = match self.directory.save_worker_profile(&profile).await {
            Ok(saved) => saved,
            Err(e) => {
                self.uploader.discard(&stored).await;
                return Err(e.into());
            }
        };

        self.publish_worker(&saved);
        Ok(saved)
    }

    /// Drop the first portfolio entry equal to `url`
    pub async fn remove_portfolio_photo(
        &self,
        session: &Session,
        url: &str,
    ) -> BookingResult<WorkerProfile> {
        info!("Removing portfolio photo for worker: {}", session.account_id);

        let mut profile = self.own_profile(session).await?;
        if !profile.remove_portfolio_url(url) {
            return Err(BookingError::NotFound(format!("portfolio photo {}", url)));
        }

        let saved = self.directory.save_worker_profile(&profile).await?;
        self.publish_worker(&saved);
        Ok(saved)
    }

    /// Upload a new avatar
    ///
    /// The URL is kept on the account and, when one exists, on the worker
    /// profile. The upload is removed if neither can be written.
    pub async fn set_profile_photo(
        &self,
        session: &Session,
        photo: PhotoUpload,
    ) -> BookingResult<String> {
        info!("Uploading profile photo for account: {}", session.account_id);

        let path = format!(
            "profiles/{}/avatar_{}",
            session.account_id,
            Utc::now().timestamp_millis()
        );
        let blob = self.uploader.upload_one(path, photo).await?;

        match self
            .directory
            .set_account_photo(session.account_id, &blob.url)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                self.uploader.discard(std::slice::from_ref(&blob)).await;
                return Err(BookingError::NotFound(format!(
                    "account {}",
                    session.account_id
                )));
            }
            Err(e) => {
                self.uploader.discard(std::slice::from_ref(&blob)).await;
                return Err(e.into());
            }
        }

        if let Some(profile) = self.directory.get_worker(session.account_id).await? {
            self.publish_worker(&profile);
        }

        Ok(blob.url)
    }

    /// Approve an applicant and grant the WORKER role in one batch
    pub async fn approve(&self, session: &Session, worker_id: Uuid) -> BookingResult<WorkerProfile> {
        session.require_admin("approving a worker")?;
        info!("Approving worker: {}", worker_id);
        self.write_approval(worker_id, true, Role::Worker).await
    }

    /// Withdraw approval and return the account to CUSTOMER in one batch
    pub async fn revoke(&self, session: &Session, worker_id: Uuid) -> BookingResult<WorkerProfile> {
        session.require_admin("revoking a worker")?;
        info!("Revoking worker: {}", worker_id);
        self.write_approval(worker_id, false, Role::Customer).await
    }

    /// Change an account's role; a worker profile's approval follows the role
    pub async fn set_role(&self, session: &Session, user_id: Uuid, role: Role) -> BookingResult<()> {
        session.require_admin("changing a role")?;
        if user_id == session.account_id {
            return Err(BookingError::Authorization(
                "administrators cannot change their own role".to_string(),
            ));
        }
        info!("Setting role of {} to {}", user_id, role);

        let update = self
            .directory
            .set_role(user_id, role)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("account {}", user_id)))?;

        if role == Role::Worker && !update.profile_synced {
            warn!(
                "Account {} promoted to WORKER without a worker profile; it will not be listed",
                user_id
            );
        }

        if let Some(account) = self.directory.get_account(user_id).await? {
            self.feed.publish(ChangeEvent::AccountChanged { account });
        }
        if update.profile_synced {
            if let Some(worker) = self.directory.get_worker(user_id).await? {
                self.publish_worker(&worker);
            }
        }
        Ok(())
    }

    /// Approved workers for the public map, phone numbers masked
    pub async fn list_public(&self) -> BookingResult<Vec<PublicWorker>> {
        let workers = self.directory.list_workers(true).await?;
        Ok(workers.iter().map(PublicWorker::from).collect())
    }

    /// Pending applicants and approved workers. Administrators only.
    pub async fn roster(&self, session: &Session) -> BookingResult<WorkerRoster> {
        session.require_admin("listing worker applications")?;

        let (approved, pending) = self
            .directory
            .list_workers(false)
            .await?
            .into_iter()
            .partition(|w| w.is_approved);
        Ok(WorkerRoster { pending, approved })
    }

    async fn own_profile(&self, session: &Session) -> BookingResult<WorkerProfile> {
        self.directory
            .get_worker(session.account_id)
            .await?
            .ok_or_else(|| {
                BookingError::NotFound(format!("worker profile {}", session.account_id))
            })
    }

    async fn write_approval(
        &self,
        worker_id: Uuid,
        approved: bool,
        role: Role,
    ) -> BookingResult<WorkerProfile> {
        if !self
            .directory
            .set_approval_and_role(worker_id, approved, role)
            .await?
        {
            return Err(BookingError::NotFound(format!("worker {}", worker_id)));
        }

        let worker = self
            .directory
            .get_worker(worker_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("worker {}", worker_id)))?;

        self.publish_worker(&worker);
        if let Some(account) = self.directory.get_account(worker_id).await? {
            self.feed.publish(ChangeEvent::AccountChanged { account });
        }
        Ok(worker)
    }

    fn publish_worker(&self, worker: &WorkerProfile) {
        self.feed.publish(ChangeEvent::WorkerChanged {
            worker: worker.clone(),
        });
    }
}
