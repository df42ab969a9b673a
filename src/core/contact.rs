//! Contact form submissions.

use crate::{
    core::collection::CONTACTS,
    errors::{Error, Result},
    store::{DocumentStore, to_fields},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// What a visitor typed into the contact form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInput {
    /// Visitor name
    pub name: String,
    /// Reply address
    pub email: String,
    /// Subject line
    pub subject: String,
    /// Message body
    pub message: String,
}

/// A stored contact message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    /// Store-assigned id
    #[serde(default, skip_serializing)]
    pub id: String,
    /// Visitor name
    pub name: String,
    /// Reply address
    pub email: String,
    /// Subject line
    pub subject: String,
    /// Message body
    pub message: String,
    /// Submission time
    pub submitted_at: DateTime<Utc>,
}

/// Stores a contact message and returns its id.
pub async fn submit_contact<S: DocumentStore>(store: &S, input: ContactInput) -> Result<String> {
    if input.name.trim().is_empty() || input.message.trim().is_empty() {
        return Err(Error::validation("Name and message are required"));
    }
    if !input.email.contains('@') {
        return Err(Error::validation(format!(
            "Invalid email address: {}",
            input.email
        )));
    }

    let message = ContactMessage {
        id: String::new(),
        name: input.name,
        email: input.email,
        subject: input.subject,
        message: input.message,
        submitted_at: Utc::now(),
    };
    let id = store.insert(CONTACTS, to_fields(&message)?).await?;
    info!("Contact message {} received from {}", id, message.email);
    Ok(id)
}

/// Every contact message, oldest first.
pub async fn list_contacts<S: DocumentStore>(store: &S) -> Result<Vec<ContactMessage>> {
    store
        .list_all(CONTACTS)
        .await?
        .iter()
        .map(|doc| doc.decode())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn input(email: &str) -> ContactInput {
        ContactInput {
            name: "Bob".to_string(),
            email: email.to_string(),
            subject: "Quote".to_string(),
            message: "How much for a website?".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_contact() -> Result<()> {
        let store = MemoryStore::new();
        let id = submit_contact(&store, input("bob@example.com")).await?;

        let messages = list_contacts(&store).await?;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, id);
        assert_eq!(messages[0].subject, "Quote");
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_contact_validation() {
        let store = MemoryStore::new();
        let bad_email = submit_contact(&store, input("bob")).await;
        assert!(matches!(bad_email, Err(Error::Validation { .. })));

        let mut empty = input("bob@example.com");
        empty.message = "  ".to_string();
        assert!(submit_contact(&store, empty).await.is_err());
        assert_eq!(store.operation_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = MemoryStore::new();
        store.fail_collection(CONTACTS, "offline").await;
        let result = submit_contact(&store, input("bob@example.com")).await;
        assert!(matches!(result, Err(Error::Store { message }) if message == "offline"));
    }
}
