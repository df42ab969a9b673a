//! Customer reviews.
//!
//! Reviews are written and edited by signed-in users; there is no delete path.

use crate::{
    core::{collection::Collection, session::User},
    errors::{Error, Result},
    store::{DocumentStore, to_fields},
};
use serde::{Deserialize, Serialize};
use tracing::info;

const REVIEWS: &str = Collection::Reviews.as_str();

/// A customer review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Store-assigned id
    #[serde(default, skip_serializing)]
    pub id: String,
    /// Reviewer's display name
    pub name: String,
    /// Reviewer's company or address line
    pub address: String,
    /// Review text
    pub description: String,
    /// Reviewer's account email
    #[serde(default)]
    pub email: String,
    /// Reviewer's avatar URL
    #[serde(default)]
    pub img: Option<String>,
}

/// Fields a user fills in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewInput {
    /// Display name
    pub name: String,
    /// Company or address line
    pub address: String,
    /// Review text
    pub description: String,
}

/// What [`update_review`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewUpdate {
    /// The submitted text matched what was stored
    Unchanged(Review),
    /// At least one field changed
    Updated(Review),
}

fn validate(input: &ReviewInput) -> Result<()> {
    for (field, value) in [
        ("name", &input.name),
        ("address", &input.address),
        ("description", &input.description),
    ] {
        if value.trim().is_empty() {
            return Err(Error::validation(format!("Review {field} is required")));
        }
    }
    Ok(())
}

/// Creates a review attributed to `user`.
pub async fn submit_review<S: DocumentStore>(store: &S, user: &User, input: ReviewInput) -> Result<Review> {
    validate(&input)?;
    let mut review = Review {
        id: String::new(),
        name: input.name,
        address: input.address,
        description: input.description,
        email: user.email.clone(),
        img: user.img.clone(),
    };
    review.id = store.insert(REVIEWS, to_fields(&review)?).await?;
    info!("Review {} submitted by {}", review.id, review.email);
    Ok(review)
}

/// One review by id.
pub async fn get_review<S: DocumentStore>(store: &S, id: &str) -> Result<Review> {
    store
        .get(REVIEWS, id)
        .await?
        .ok_or_else(|| Error::DocumentNotFound {
            collection: REVIEWS.to_string(),
            id: id.to_string(),
        })?
        .decode()
}

/// Every review.
pub async fn list_reviews<S: DocumentStore>(store: &S) -> Result<Vec<Review>> {
    store
        .list_all(REVIEWS)
        .await?
        .iter()
        .map(|doc| doc.decode())
        .collect()
}

/// Rewrites a review's text.
///
/// The stored email and avatar are kept when present and otherwise taken
/// from `user`. The write happens even when nothing changed; the result only
/// reports whether it did.
pub async fn update_review<S: DocumentStore>(
    store: &S,
    id: &str,
    user: &User,
    input: ReviewInput,
) -> Result<ReviewUpdate> {
    validate(&input)?;
    let current = get_review(store, id).await?;
    let unchanged = current.name == input.name
        && current.address == input.address
        && current.description == input.description;

    let review = Review {
        id: current.id,
        name: input.name,
        address: input.address,
        description: input.description,
        email: if current.email.is_empty() {
            user.email.clone()
        } else {
            current.email
        },
        img: current.img.or_else(|| user.img.clone()),
    };
    store.update(REVIEWS, id, to_fields(&review)?).await?;

    if unchanged {
        Ok(ReviewUpdate::Unchanged(review))
    } else {
        info!("Review {} updated", id);
        Ok(ReviewUpdate::Updated(review))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_utils::test_user;

    fn input(description: &str) -> ReviewInput {
        ReviewInput {
            name: "Ann".to_string(),
            address: "Acme Ltd".to_string(),
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_review_uses_account_details() -> Result<()> {
        let store = MemoryStore::new();
        let user = test_user("ann@example.com");

        let review = submit_review(&store, &user, input("Great work")).await?;
        assert_eq!(review.email, "ann@example.com");
        assert_eq!(review.img, user.img);
        assert_eq!(get_review(&store, &review.id).await?, review);
        assert_eq!(list_reviews(&store).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_review_requires_fields() {
        let store = MemoryStore::new();
        let result = submit_review(&store, &test_user("a@b.c"), input(" ")).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[tokio::test]
    async fn test_update_review_reports_changes() -> Result<()> {
        let store = MemoryStore::new();
        let user = test_user("ann@example.com");
        let review = submit_review(&store, &user, input("Great work")).await?;

        let same = update_review(&store, &review.id, &user, input("Great work")).await?;
        assert!(matches!(same, ReviewUpdate::Unchanged(_)));

        let changed = update_review(&store, &review.id, &user, input("Even better")).await?;
        let ReviewUpdate::Updated(updated) = changed else {
            panic!("expected an update");
        };
        assert_eq!(updated.description, "Even better");
        assert_eq!(get_review(&store, &review.id).await?.description, "Even better");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_keeps_original_author() -> Result<()> {
        let store = MemoryStore::new();
        let author = test_user("ann@example.com");
        let review = submit_review(&store, &author, input("Great work")).await?;

        let editor = test_user("editor@example.com");
        update_review(&store, &review.id, &editor, input("Edited")).await?;
        assert_eq!(get_review(&store, &review.id).await?.email, "ann@example.com");
        Ok(())
    }
}
