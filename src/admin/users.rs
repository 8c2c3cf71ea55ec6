// region:    --- Imports
use super::model::{User, USERS};
use crate::database::DatabaseManager;
use crate::date::Timestamp;
use crate::error::AdminError;
use crate::query::handlers::list_newest_first;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{error, info};

// endregion: --- Imports

/// User counts split into mutually exclusive buckets.
///
/// A banned user counts as `banned` even when also an admin, so
/// `total == admins + banned + regular` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct UserStats {
    pub total: usize,
    pub admins: usize,
    pub banned: usize,
    pub regular: usize,
}

impl UserStats {
    pub fn from_users(users: &[User]) -> Self {
        let mut stats = Self {
            total: users.len(),
            ..Self::default()
        };
        for user in users {
            if user.is_banned {
                stats.banned += 1;
            } else if user.is_admin {
                stats.admins += 1;
            } else {
                stats.regular += 1;
            }
        }
        stats
    }
}

// region:    --- Queries
pub async fn get_users(db_manager: &DatabaseManager) -> Result<Vec<User>, AdminError> {
    list_newest_first(db_manager, None).await.map_err(|e| {
        error!("{:<12} --> failed to load users: {}", "Query", e);
        db_manager.user_error(&e)
    })
}

pub async fn get_user_stats(db_manager: &DatabaseManager) -> Result<UserStats, AdminError> {
    let users = get_users(db_manager).await?;
    Ok(UserStats::from_users(&users))
}
// endregion: --- Queries

// region:    --- Commands
pub async fn ban_user(db_manager: &DatabaseManager, user_id: &str) -> Result<(), AdminError> {
    info!("{:<12} --> ban user {}", "Command", user_id);
    let mut fields = Map::new();
    fields.insert("isBanned".to_string(), json!(true));
    fields.insert("bannedAt".to_string(), Timestamp::now().to_value());
    update_user(db_manager, user_id, fields).await
}

pub async fn unban_user(db_manager: &DatabaseManager, user_id: &str) -> Result<(), AdminError> {
    info!("{:<12} --> unban user {}", "Command", user_id);
    let mut fields = Map::new();
    fields.insert("isBanned".to_string(), json!(false));
    fields.insert("bannedAt".to_string(), Value::Null);
    update_user(db_manager, user_id, fields).await
}

pub async fn make_admin(db_manager: &DatabaseManager, user_id: &str) -> Result<(), AdminError> {
    info!("{:<12} --> grant admin to {}", "Command", user_id);
    set_admin(db_manager, user_id, true).await
}

pub async fn remove_admin(db_manager: &DatabaseManager, user_id: &str) -> Result<(), AdminError> {
    info!("{:<12} --> revoke admin from {}", "Command", user_id);
    set_admin(db_manager, user_id, false).await
}

async fn set_admin(
    db_manager: &DatabaseManager,
    user_id: &str,
    is_admin: bool,
) -> Result<(), AdminError> {
    let mut fields = Map::new();
    fields.insert("isAdmin".to_string(), json!(is_admin));
    update_user(db_manager, user_id, fields).await
}

async fn update_user(
    db_manager: &DatabaseManager,
    user_id: &str,
    fields: Map<String, Value>,
) -> Result<(), AdminError> {
    let store = db_manager.store();
    db_manager
        .retry(|| store.update(USERS, user_id, fields.clone()))
        .await
        .map_err(|e| db_manager.user_error(&e))
}
// endregion: --- Commands

// endregion: --- Tests
