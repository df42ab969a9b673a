//! Services catalogue business logic.
//!
//! Admin-side create, edit and delete of service offerings plus the public
//! listing. The shared demo admin account may not touch the main services.

use crate::{
    core::{admin::TEST_ADMIN_EMAIL, collection::Collection},
    errors::{Error, Result},
    store::{DocumentStore, to_fields},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// How many services, in listing order, count as main services.
pub const MAIN_SERVICE_COUNT: usize = 6;

const SERVICES: &str = Collection::Services.as_str();

/// A service offering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Store-assigned id
    #[serde(default, skip_serializing)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Price in dollars
    pub price: f64,
    /// Marketing description
    #[serde(default)]
    pub description: String,
    /// Image URL
    #[serde(default)]
    pub img: String,
    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last edit time
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields for a new service
#[derive(Debug, Clone, PartialEq)]
pub struct NewService {
    /// Display name
    pub name: String,
    /// Price in dollars
    pub price: f64,
    /// Marketing description
    pub description: String,
    /// Image URL
    pub img: String,
}

/// Partial edit of a service; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceUpdate {
    /// New name
    pub name: Option<String>,
    /// New price
    pub price: Option<f64>,
    /// New description
    pub description: Option<String>,
    /// New image URL
    pub img: Option<String>,
}

fn validate(name: &str, price: f64) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("Service name cannot be empty"));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(Error::validation(format!("Invalid service price: {price}")));
    }
    Ok(())
}

/// All services in listing order.
pub async fn list_services<S: DocumentStore>(store: &S) -> Result<Vec<Service>> {
    store
        .list_all(SERVICES)
        .await?
        .iter()
        .map(|doc| doc.decode())
        .collect()
}

/// One service by id.
pub async fn get_service<S: DocumentStore>(store: &S, id: &str) -> Result<Service> {
    store
        .get(SERVICES, id)
        .await?
        .ok_or_else(|| Error::DocumentNotFound {
            collection: SERVICES.to_string(),
            id: id.to_string(),
        })?
        .decode()
}

/// Creates a service after validating its name and price.
pub async fn create_service<S: DocumentStore>(store: &S, input: NewService) -> Result<Service> {
    validate(&input.name, input.price)?;

    let now = Utc::now();
    let mut service = Service {
        id: String::new(),
        name: input.name.trim().to_string(),
        price: input.price,
        description: input.description,
        img: input.img,
        created_at: Some(now),
        updated_at: Some(now),
    };
    service.id = store.insert(SERVICES, to_fields(&service)?).await?;
    info!("Created service '{}' ({})", service.name, service.id);
    Ok(service)
}

/// Refuses changes by the demo admin to any of the main services.
pub async fn ensure_can_modify<S: DocumentStore>(store: &S, actor_email: &str, id: &str) -> Result<()> {
    if actor_email != TEST_ADMIN_EMAIL {
        return Ok(());
    }
    let services = store.list_all(SERVICES).await?;
    if services
        .iter()
        .take(MAIN_SERVICE_COUNT)
        .any(|doc| doc.id == id)
    {
        return Err(Error::PermissionDenied {
            message: "As a test admin, you can't edit or delete the main six services. \
                      You can only edit or delete your added services"
                .to_string(),
        });
    }
    Ok(())
}

/// Applies a partial edit and bumps `updatedAt`.
pub async fn update_service<S: DocumentStore>(
    store: &S,
    actor_email: &str,
    id: &str,
    update: ServiceUpdate,
) -> Result<Service> {
    ensure_can_modify(store, actor_email, id).await?;
    let mut service = get_service(store, id).await?;

    if let Some(name) = update.name {
        service.name = name.trim().to_string();
    }
    if let Some(price) = update.price {
        service.price = price;
    }
    if let Some(description) = update.description {
        service.description = description;
    }
    if let Some(img) = update.img {
        service.img = img;
    }
    validate(&service.name, service.price)?;
    service.updated_at = Some(Utc::now());

    store.update(SERVICES, id, to_fields(&service)?).await?;
    info!("Updated service '{}' ({})", service.name, id);
    Ok(service)
}

/// Deletes a service.
pub async fn delete_service<S: DocumentStore>(store: &S, actor_email: &str, id: &str) -> Result<()> {
    ensure_can_modify(store, actor_email, id).await?;
    store.delete(SERVICES, id).await?;
    info!("Deleted service {}", id);
    Ok(())
}
