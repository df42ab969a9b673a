//! Per-visitor session context.
//!
//! A [`Session`] bundles the signed-in user, whether that user is an admin,
//! and the site settings. It is built once from the store and then passed
//! around explicitly; refreshing it produces a new value instead of mutating
//! shared state.

use crate::{
    core::{
        admin::is_admin,
        settings::{SiteSettings, load_site_settings},
    },
    store::DocumentStore,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// A signed-in account, as decoded by the authentication layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display name
    pub name: String,
    /// Account email
    pub email: String,
    /// Avatar URL
    #[serde(default)]
    pub img: Option<String>,
}

/// Immutable session context
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    user: Option<User>,
    admin: bool,
    settings: SiteSettings,
}

impl Session {
    /// Builds a session for `user`.
    ///
    /// Neither a settings failure nor an admin-check failure prevents the
    /// session from loading: the former falls back to default settings, the
    /// latter to a non-admin session.
    pub async fn load<S: DocumentStore>(store: &S, user: Option<User>) -> Self {
        let settings = match load_site_settings(store).await {
            Ok(settings) => settings,
            Err(e) => {
                error!("Failed to load site settings: {}", e);
                SiteSettings::default()
            }
        };

        let admin = match &user {
            Some(user) => is_admin(store, &user.email).await.unwrap_or_else(|e| {
                error!("Admin check failed for {}: {}", user.email, e);
                false
            }),
            None => false,
        };

        info!(
            "Session loaded for {} (admin: {})",
            user.as_ref().map_or("anonymous", |u| u.email.as_str()),
            admin
        );
        Self {
            user,
            admin,
            settings,
        }
    }

    /// Returns a copy of this session with freshly loaded settings.
    pub async fn refresh_settings<S: DocumentStore>(&self, store: &S) -> Self {
        match load_site_settings(store).await {
            Ok(settings) => Self {
                settings,
                ..self.clone()
            },
            Err(e) => {
                error!("Failed to refresh site settings: {}", e);
                self.clone()
            }
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Whether the signed-in user is an admin.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.admin
    }

    /// Site settings as of load time.
    #[must_use]
    pub const fn settings(&self) -> &SiteSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::{SITE_NAME, save_text_setting};
    use crate::errors::Result;
    use crate::store::MemoryStore;
    use crate::test_utils::{seeded_memory_store, test_user};

    #[tokio::test]
    async fn test_admin_session() {
        let store = seeded_memory_store().await;
        let session = Session::load(&store, Some(test_user("admin@example.com"))).await;

        assert!(session.is_admin());
        assert_eq!(session.settings().display_name(), "Easy Consulting");
    }

    #[tokio::test]
    async fn test_anonymous_and_regular_sessions() {
        let store = seeded_memory_store().await;

        let anonymous = Session::load(&store, None).await;
        assert!(!anonymous.is_admin());
        assert!(anonymous.user().is_none());

        let regular = Session::load(&store, Some(test_user("client@example.com"))).await;
        assert!(!regular.is_admin());
    }

    #[tokio::test]
    async fn test_store_failures_degrade_gracefully() {
        let store = MemoryStore::new();
        store.fail_collection("settings", "offline").await;
        store.fail_collection("admins", "offline").await;

        let session = Session::load(&store, Some(test_user("admin@example.com"))).await;
        assert!(!session.is_admin());
        assert_eq!(session.settings(), &SiteSettings::default());
    }

    #[tokio::test]
    async fn test_refresh_returns_new_value() -> Result<()> {
        let store = MemoryStore::new();
        let before = Session::load(&store, None).await;

        save_text_setting(&store, SITE_NAME, "Acme").await?;
        let after = before.refresh_settings(&store).await;

        assert_eq!(before.settings().display_name(), "Easy Consulting");
        assert_eq!(after.settings().display_name(), "Acme");
        Ok(())
    }
}
