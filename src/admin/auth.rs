// region:    --- Imports
use super::model::{Record, User, USERS};
use crate::database::DatabaseManager;
use crate::error::{AdminError, BackendError};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Identity Provider
/// Session principal handed out by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub uid: String,
    pub email: Option<String>,
}

/// External identity provider. Sessions live entirely on its side.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;
}
// endregion: --- Identity Provider

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
}

// region:    --- Commands
/// Signs in and checks the `isAdmin` flag of the matching user document.
/// Non-admin sessions are signed out again before access is denied.
pub async fn login(
    db_manager: &DatabaseManager,
    identity: &dyn IdentityProvider,
    email: &str,
    password: &str,
) -> Result<AdminUser, AdminError> {
    let principal = db_manager
        .retry(|| identity.sign_in(email, password))
        .await
        .map_err(|e| db_manager.user_error(&e))?;

    let store = db_manager.store();
    let doc = db_manager
        .retry(|| store.get(USERS, &principal.uid))
        .await
        .map_err(|e| db_manager.user_error(&e))?
        .ok_or_else(|| AdminError::NotFound("User not found".to_string()))?;
    let user = User::from_document(&doc).map_err(|e| db_manager.user_error(&e))?;

    if !user.is_admin {
        warn!("{:<12} --> non-admin login attempt by {}", "Auth", principal.uid);
        if let Err(e) = identity.sign_out().await {
            warn!("{:<12} --> sign out after denied login failed: {}", "Auth", e);
        }
        return Err(AdminError::AccessDenied);
    }

    info!("{:<12} --> admin {} signed in", "Auth", principal.uid);
    Ok(AdminUser {
        id: principal.uid,
        email: principal.email.unwrap_or_default(),
        name: user.name,
        is_admin: true,
    })
}

pub async fn logout(
    db_manager: &DatabaseManager,
    identity: &dyn IdentityProvider,
) -> Result<(), AdminError> {
    identity
        .sign_out()
        .await
        .map_err(|e| db_manager.user_error(&e))
}
// endregion: --- Commands
