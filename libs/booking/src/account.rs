//! Account records and administration

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{BookingError, BookingResult},
    feed::{ChangeEvent, ChangeFeed},
    models::{IdentityProfile, NewAccount, Role, UserAccount},
    session::Session,
    store::DirectoryStore,
    validation::{validate_display_name, validate_email},
};

/// Email that is granted ADMIN when its account is first provisioned
#[derive(Debug, Clone, Default)]
pub struct AdminBootstrap {
    email: Option<String>,
}

impl AdminBootstrap {
    pub fn new(email: Option<String>) -> Self {
        let email = email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        Self { email }
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn matches(&self, email: &str) -> bool {
        self.email
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case(email.trim()))
    }
}

#[derive(Clone)]
pub struct AccountService {
    directory: Arc<dyn DirectoryStore>,
    bootstrap: AdminBootstrap,
    feed: ChangeFeed,
}

impl AccountService {
    pub fn new(directory: Arc<dyn DirectoryStore>, bootstrap: AdminBootstrap, feed: ChangeFeed) -> Self {
        Self {
            directory,
            bootstrap,
            feed,
        }
    }

    /// Load the account for a signed-in identity, creating it on first sign-in
    ///
    /// New accounts are CUSTOMER unless the email is the bootstrap admin.
    /// An existing account's role is never recomputed here.
    pub async fn ensure_account(&self, identity: &IdentityProfile) -> BookingResult<UserAccount> {
        if let Some(account) = self.directory.get_account(identity.id).await? {
            return Ok(account);
        }

        let role = if self.bootstrap.matches(&identity.email) {
            Role::Admin
        } else {
            Role::Customer
        };
        info!("Provisioning {} account for: {}", role, identity.id);

        let account = self
            .directory
            .insert_account(NewAccount {
                id: identity.id,
                email: identity.email.clone(),
                display_name: identity.display_name.clone(),
                role,
            })
            .await?;

        self.feed.publish(ChangeEvent::AccountChanged {
            account: account.clone(),
        });
        Ok(account)
    }

    /// Promote an existing bootstrap-admin account at startup
    ///
    /// Returns the promoted account, or `None` when no bootstrap email is
    /// configured or no account uses it yet.
    pub async fn seed_admin(&self) -> BookingResult<Option<UserAccount>> {
        let Some(email) = self.bootstrap.email() else {
            return Ok(None);
        };

        let Some(account) = self.directory.find_account_by_email(email).await? else {
            info!("Bootstrap admin {} has not signed up yet", email);
            return Ok(None);
        };

        if account.role == Role::Admin {
            return Ok(Some(account));
        }

        info!("Promoting bootstrap admin: {}", account.id);
        self.directory.set_role(account.id, Role::Admin).await?;
        let promoted = self
            .directory
            .get_account(account.id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("account {}", account.id)))?;
        self.feed.publish(ChangeEvent::AccountChanged {
            account: promoted.clone(),
        });
        Ok(Some(promoted))
    }

    /// Resolve the caller context for an authenticated account id
    pub async fn session_for(&self, account_id: Uuid) -> BookingResult<Session> {
        let account = self
            .directory
            .get_account(account_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("account {}", account_id)))?;
        Ok(Session::from_account(&account))
    }

    pub async fn list(&self, session: &Session) -> BookingResult<Vec<UserAccount>> {
        session.require_admin("listing accounts")?;
        Ok(self.directory.list_accounts().await?)
    }

    /// Administrator edit of name and email
    ///
    /// For WORKER accounts the worker profile name is rewritten in the same batch.
    pub async fn update_details(
        &self,
        session: &Session,
        user_id: Uuid,
        display_name: &str,
        email: &str,
    ) -> BookingResult<UserAccount> {
        session.require_admin("editing an account")?;

        let display_name = display_name.trim();
        let email = email.trim();
        validate_display_name(display_name)?;
        validate_email(email)?;
        info!("Updating account details: {}", user_id);

        let account = self
            .directory
            .get_account(user_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("account {}", user_id)))?;

        let sync_worker_name = account.role == Role::Worker;
        if !self
            .directory
            .update_account_details(user_id, display_name, email, sync_worker_name)
            .await?
        {
            return Err(BookingError::NotFound(format!("account {}", user_id)));
        }

        self.reload_and_publish(user_id).await
    }

    /// Remove an account and its worker profile. Administrators cannot remove themselves.
    pub async fn delete(&self, session: &Session, user_id: Uuid) -> BookingResult<()> {
        session.require_admin("deleting an account")?;
        if user_id == session.account_id {
            return Err(BookingError::Authorization(
                "administrators cannot delete their own account".to_string(),
            ));
        }
        info!("Deleting account: {}", user_id);

        if !self.directory.delete_account(user_id).await? {
            return Err(BookingError::NotFound(format!("account {}", user_id)));
        }

        self.feed.publish(ChangeEvent::AccountDeleted { id: user_id });
        Ok(())
    }

    /// Change the caller's own display name
    pub async fn rename_self(&self, session: &Session, display_name: &str) -> BookingResult<UserAccount> {
        let display_name = display_name.trim();
        validate_display_name(display_name)?;
        info!("Renaming account: {}", session.account_id);

        if !self
            .directory
            .rename_account(session.account_id, display_name)
            .await?
        {
            return Err(BookingError::NotFound(format!(
                "account {}",
                session.account_id
            )));
        }

        self.reload_and_publish(session.account_id).await
    }

    async fn reload_and_publish(&self, id: Uuid) -> BookingResult<UserAccount> {
        let account = self
            .directory
            .get_account(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("account {}", id)))?;
        self.feed.publish(ChangeEvent::AccountChanged {
            account: account.clone(),
        });
        Ok(account)
    }
}
