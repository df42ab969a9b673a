//! Admin membership.
//!
//! An account is an admin when its email appears, verbatim, in `admins`.

use crate::{
    core::collection::Collection,
    errors::{Error, Result},
    store::{DocumentStore, Fields},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

/// Shared demo admin account with restricted rights.
pub const TEST_ADMIN_EMAIL: &str = "test@admin.com";

const ADMINS: &str = Collection::Admins.as_str();

/// An admin record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    /// Store-assigned id
    #[serde(default)]
    pub id: String,
    /// Admin email
    pub email: String,
}

/// Every admin record.
pub async fn list_admins<S: DocumentStore>(store: &S) -> Result<Vec<Admin>> {
    store
        .list_all(ADMINS)
        .await?
        .iter()
        .map(|doc| doc.decode())
        .collect()
}

/// Whether `email` belongs to an admin. Matching is exact and case-sensitive.
pub async fn is_admin<S: DocumentStore>(store: &S, email: &str) -> Result<bool> {
    if email.is_empty() {
        return Ok(false);
    }
    let admin = store
        .list_all(ADMINS)
        .await?
        .iter()
        .any(|doc| doc.fields.get("email").and_then(Value::as_str) == Some(email));
    debug!("Admin check for {}: {}", email, admin);
    Ok(admin)
}

/// Grants admin rights to `email` on behalf of `actor_email`.
///
/// The demo admin may not add admins, and an email that is already an admin
/// is rejected instead of being stored twice.
pub async fn make_admin<S: DocumentStore>(store: &S, actor_email: &str, email: &str) -> Result<String> {
    if actor_email == TEST_ADMIN_EMAIL {
        return Err(Error::PermissionDenied {
            message: "As a test admin, You haven't permission to add a new admin".to_string(),
        });
    }
    let email = email.trim();
    if email.is_empty() {
        return Err(Error::validation("Email is required"));
    }
    if is_admin(store, email).await? {
        return Err(Error::validation(format!("{email} is already an admin")));
    }

    let mut fields = Fields::new();
    fields.insert("email".to_string(), Value::String(email.to_string()));
    fields.insert("createdAt".to_string(), json!(Utc::now()));
    let id = store.insert(ADMINS, fields).await?;
    info!("{} added {} as admin", actor_email, email);
    Ok(id)
}
