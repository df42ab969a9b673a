//! Site branding settings.
//!
//! Each setting is one document in `settings` keyed by its name and shaped
//! `{ value, type }`. Older documents may lack `value`, and some deployments
//! keep everything nested in a single `site` document; loading flattens all of
//! these into one [`SiteSettings`] value.
//!
//! Only non-empty strings count during flattening and legacy fallback. A
//! `logoUrl` holding a number, a boolean or an object is ignored rather than
//! copied into `siteLogo`, and the typed getters never return it.

use crate::{
    core::collection::SETTINGS,
    errors::{Error, Result},
    store::{Document, DocumentStore, Fields},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Name shown when none has been configured.
pub const DEFAULT_SITE_NAME: &str = "Easy Consulting";

/// Setting key for the site name.
pub const SITE_NAME: &str = "siteName";
/// Setting key for the logo.
pub const SITE_LOGO: &str = "siteLogo";
/// Setting key for the favicon.
pub const FAVICON: &str = "favicon";

/// How a setting's value should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingKind {
    /// Plain text
    Text,
    /// Image data URL
    Image,
}

/// Normalized, read-only view of every setting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteSettings {
    values: BTreeMap<String, Value>,
}

fn non_empty(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

impl SiteSettings {
    /// Builds settings from the raw documents of the `settings` collection.
    #[must_use]
    pub fn from_documents(docs: &[Document]) -> Self {
        let raw: BTreeMap<String, Value> = docs
            .iter()
            .map(|doc| {
                let value = doc
                    .fields
                    .get("value")
                    .cloned()
                    .unwrap_or_else(|| Value::Object(doc.fields.clone()));
                (doc.id.clone(), value)
            })
            .collect();
        Self::normalize(raw)
    }

    fn normalize(raw: BTreeMap<String, Value>) -> Self {
        let mut values = raw.clone();
        let mut set = |key: &str, value: &str| {
            values.insert(key.to_string(), Value::String(value.to_string()));
        };

        if let Some(Value::Object(site)) = raw.get("site") {
            for (from, to) in [
                ("logoUrl", SITE_LOGO),
                ("siteLogo", SITE_LOGO),
                ("siteTitle", SITE_NAME),
                ("siteName", SITE_NAME),
                ("favicon", FAVICON),
            ] {
                if let Some(v) = non_empty(site.get(from)) {
                    set(to, v);
                }
            }
        }

        if non_empty(values.get(SITE_LOGO)).is_none() {
            if let Some(v) = non_empty(raw.get("logoUrl")).or_else(|| non_empty(raw.get("logo"))) {
                values.insert(SITE_LOGO.to_string(), Value::String(v.to_string()));
            }
        }
        if non_empty(values.get(SITE_NAME)).is_none() {
            if let Some(v) = non_empty(raw.get("siteTitle")).or_else(|| non_empty(raw.get("title"))) {
                values.insert(SITE_NAME.to_string(), Value::String(v.to_string()));
            }
        }

        debug!("Normalized {} settings", values.len());
        Self { values }
    }

    /// Configured site name, if any.
    #[must_use]
    pub fn site_name(&self) -> Option<&str> {
        non_empty(self.values.get(SITE_NAME))
    }

    /// Site name to display, falling back to [`DEFAULT_SITE_NAME`].
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.site_name().unwrap_or(DEFAULT_SITE_NAME)
    }

    /// Logo URL or data URL.
    #[must_use]
    pub fn site_logo(&self) -> Option<&str> {
        non_empty(self.values.get(SITE_LOGO))
    }

    /// Favicon URL or data URL.
    #[must_use]
    pub fn favicon(&self) -> Option<&str> {
        non_empty(self.values.get(FAVICON))
    }

    /// Any setting by key, after normalization.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// All settings, after normalization.
    #[must_use]
    pub const fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }
}

/// Reads and normalizes every setting.
pub async fn load_site_settings<S: DocumentStore>(store: &S) -> Result<SiteSettings> {
    let docs = store.list_all(SETTINGS).await?;
    Ok(SiteSettings::from_documents(&docs))
}

async fn save_setting<S: DocumentStore>(store: &S, key: &str, value: &str, kind: SettingKind) -> Result<()> {
    if key.trim().is_empty() {
        return Err(Error::validation("Setting key cannot be empty"));
    }
    let mut fields = Fields::new();
    fields.insert("value".to_string(), Value::String(value.to_string()));
    fields.insert("type".to_string(), serde_json::to_value(kind)?);
    store.upsert(SETTINGS, key, fields).await?;
    info!("Saved {:?} setting '{}'", kind, key);
    Ok(())
}

/// Stores a text setting, replacing any previous value.
pub async fn save_text_setting<S: DocumentStore>(store: &S, key: &str, text: &str) -> Result<()> {
    save_setting(store, key, text, SettingKind::Text).await
}

/// Encodes raw image bytes as a `data:` URL.
#[must_use]
pub fn image_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// An uploaded image file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// MIME type, e.g. `image/png`
    pub mime: String,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Stores an image setting as a data URL and returns that URL.
pub async fn save_image_setting<S: DocumentStore>(store: &S, key: &str, image: &ImageUpload) -> Result<String> {
    if !image.mime.starts_with("image/") {
        return Err(Error::validation(format!("Not an image: {}", image.mime)));
    }
    let url = image_data_url(&image.mime, &image.bytes);
    save_setting(store, key, &url, SettingKind::Image).await?;
    Ok(url)
}

/// Changes requested from the settings form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    /// New site name
    pub site_name: Option<String>,
    /// New logo
    pub logo: Option<ImageUpload>,
    /// New favicon
    pub favicon: Option<ImageUpload>,
}

/// Writes the parts of `update` that differ from `current`.
///
/// Returns `None` when there was nothing to save, otherwise the settings as
/// re-read from the store.
pub async fn apply_settings_update<S: DocumentStore>(
    store: &S,
    current: &SiteSettings,
    update: SettingsUpdate,
) -> Result<Option<SiteSettings>> {
    let mut changed = false;

    if let Some(name) = update.site_name {
        if name != current.site_name().unwrap_or_default() {
            save_text_setting(store, SITE_NAME, &name).await?;
            changed = true;
        }
    }
    if let Some(logo) = update.logo {
        save_image_setting(store, SITE_LOGO, &logo).await?;
        changed = true;
    }
    if let Some(favicon) = update.favicon {
        save_image_setting(store, FAVICON, &favicon).await?;
        changed = true;
    }

    if !changed {
        debug!("No settings changes to save");
        return Ok(None);
    }
    load_site_settings(store).await.map(Some)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::store::{MemoryStore, to_fields};
    use serde_json::json;

    fn doc(id: &str, fields: Value) -> Document {
        Document {
            id: id.to_string(),
            fields: to_fields(&fields).unwrap(),
        }
    }

    fn png() -> ImageUpload {
        ImageUpload {
            mime: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[test]
    fn test_value_field_preferred() {
        let settings = SiteSettings::from_documents(&[
            doc("siteName", json!({ "value": "Acme", "type": "text" })),
            doc("theme", json!({ "primary": "blue" })),
        ]);
        assert_eq!(settings.site_name(), Some("Acme"));
        assert_eq!(settings.get("theme"), Some(&json!({ "primary": "blue" })));
    }

    #[test]
    fn test_nested_site_document_flattened() {
        let settings = SiteSettings::from_documents(&[doc(
            "site",
            json!({ "siteTitle": "Old", "siteName": "New", "logoUrl": "l.png", "favicon": "f.ico" }),
        )]);
        assert_eq!(settings.site_name(), Some("New"));
        assert_eq!(settings.site_logo(), Some("l.png"));
        assert_eq!(settings.favicon(), Some("f.ico"));
    }

    #[test]
    fn test_legacy_keys_fill_gaps() {
        let settings = SiteSettings::from_documents(&[
            doc("logo", json!({ "value": "legacy.png" })),
            doc("title", json!({ "value": "Legacy Name" })),
        ]);
        assert_eq!(settings.site_logo(), Some("legacy.png"));
        assert_eq!(settings.display_name(), "Legacy Name");

        let explicit = SiteSettings::from_documents(&[
            doc("siteLogo", json!({ "value": "new.png" })),
            doc("logo", json!({ "value": "legacy.png" })),
        ]);
        assert_eq!(explicit.site_logo(), Some("new.png"));
    }

    #[test]
    fn test_non_string_values_ignored() {
        let settings = SiteSettings::from_documents(&[
            doc("site", json!({ "logoUrl": 42, "siteName": true })),
            doc("logo", json!({ "value": { "url": "x.png" } })),
            doc("title", json!({ "value": "" })),
        ]);
        assert!(settings.site_logo().is_none());
        assert!(settings.site_name().is_none());
        assert_eq!(settings.display_name(), DEFAULT_SITE_NAME);
        // raw values stay readable through `get`
        assert_eq!(settings.get("logo"), Some(&json!({ "url": "x.png" })));
    }

    #[test]
    fn test_defaults() {
        let settings = SiteSettings::default();
        assert_eq!(settings.display_name(), DEFAULT_SITE_NAME);
        assert!(settings.site_logo().is_none());
    }

    #[test]
    fn test_image_data_url() {
        assert_eq!(image_data_url("image/png", b"hi"), "data:image/png;base64,aGk=");
    }

    #[tokio::test]
    async fn test_save_and_load() -> Result<()> {
        let store = MemoryStore::new();
        save_text_setting(&store, SITE_NAME, "Acme").await?;
        let url = save_image_setting(&store, FAVICON, &png()).await?;

        let stored = store.get(SETTINGS, FAVICON).await?.unwrap();
        assert_eq!(stored.fields["type"], "image");

        let settings = load_site_settings(&store).await?;
        assert_eq!(settings.site_name(), Some("Acme"));
        assert_eq!(settings.favicon(), Some(url.as_str()));
        Ok(())
    }

    #[tokio::test]
    async fn test_non_image_upload_rejected() {
        let store = MemoryStore::new();
        let upload = ImageUpload {
            mime: "text/plain".to_string(),
            bytes: vec![1],
        };
        let result = save_image_setting(&store, SITE_LOGO, &upload).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[tokio::test]
    async fn test_apply_update_only_writes_changes() -> Result<()> {
        let store = MemoryStore::new();
        save_text_setting(&store, SITE_NAME, "Acme").await?;
        let current = load_site_settings(&store).await?;

        let nothing = apply_settings_update(
            &store,
            &current,
            SettingsUpdate {
                site_name: Some("Acme".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert!(nothing.is_none());

        let refreshed = apply_settings_update(
            &store,
            &current,
            SettingsUpdate {
                site_name: Some("Acme Consulting".to_string()),
                logo: Some(png()),
                favicon: None,
            },
        )
        .await?
        .unwrap();
        assert_eq!(refreshed.site_name(), Some("Acme Consulting"));
        assert!(refreshed.site_logo().unwrap().starts_with("data:image/png;base64,"));
        // the previous value is untouched
        assert_eq!(current.site_name(), Some("Acme"));
        Ok(())
    }
}
