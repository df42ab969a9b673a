//! Bookings.

use crate::{
    core::{collection::Collection, service::Service},
    errors::{Error, Result},
    store::{DocumentStore, Fields, to_fields},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::info;

const ORDERS: &str = Collection::Orders.as_str();

/// Where an order is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Booked, not started
    Pending,
    /// Work in progress
    #[serde(rename = "On going")]
    OnGoing,
    /// Delivered
    Done,
}

impl OrderStatus {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::OnGoing => "On going",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Pending" => Ok(Self::Pending),
            "On going" => Ok(Self::OnGoing),
            "Done" => Ok(Self::Done),
            other => Err(Error::validation(format!("Unknown order status: {other}"))),
        }
    }
}

/// A booking of one service by one customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Store-assigned id
    #[serde(default, skip_serializing)]
    pub id: String,
    /// Customer email
    pub email: String,
    /// Booked service id
    pub service_id: String,
    /// Service name at booking time
    pub service_name: String,
    /// Service price at booking time
    pub price: f64,
    /// Lifecycle status
    pub status: OrderStatus,
    /// Booking time
    pub created_at: DateTime<Utc>,
}

/// Books `service` for the customer `email`.
pub async fn place_order<S: DocumentStore>(store: &S, email: &str, service: &Service) -> Result<Order> {
    if email.trim().is_empty() {
        return Err(Error::validation("An email is required to place an order"));
    }

    let mut order = Order {
        id: String::new(),
        email: email.trim().to_string(),
        service_id: service.id.clone(),
        service_name: service.name.clone(),
        price: service.price,
        status: OrderStatus::Pending,
        created_at: Utc::now(),
    };
    order.id = store.insert(ORDERS, to_fields(&order)?).await?;
    info!("Order {} placed for '{}' by {}", order.id, order.service_name, order.email);
    Ok(order)
}

/// Every order.
pub async fn list_orders<S: DocumentStore>(store: &S) -> Result<Vec<Order>> {
    store
        .list_all(ORDERS)
        .await?
        .iter()
        .map(|doc| doc.decode())
        .collect()
}

/// Orders placed by one customer.
pub async fn orders_for_email<S: DocumentStore>(store: &S, email: &str) -> Result<Vec<Order>> {
    Ok(list_orders(store)
        .await?
        .into_iter()
        .filter(|order| order.email == email)
        .collect())
}

/// Moves an order to `status`.
pub async fn update_order_status<S: DocumentStore>(
    store: &S,
    id: &str,
    status: OrderStatus,
) -> Result<()> {
    let mut fields = Fields::new();
    fields.insert("status".to_string(), Value::String(status.to_string()));
    store.update(ORDERS, id, fields).await?;
    info!("Order {} is now {}", id, status);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::service::list_services;
    use crate::test_utils::seeded_memory_store;

    #[tokio::test]
    async fn test_place_and_list_orders() -> Result<()> {
        let store = seeded_memory_store().await;
        let service = list_services(&store).await?.remove(1);

        let order = place_order(&store, "client@example.com", &service).await?;
        place_order(&store, "other@example.com", &service).await?;

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.service_name, "Web Development");
        assert_eq!(order.price, 800.0);
        assert_eq!(list_orders(&store).await?.len(), 2);

        let mine = orders_for_email(&store, "client@example.com").await?;
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, order.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_status() -> Result<()> {
        let store = seeded_memory_store().await;
        let service = list_services(&store).await?.remove(0);
        let order = place_order(&store, "client@example.com", &service).await?;

        update_order_status(&store, &order.id, OrderStatus::OnGoing).await?;
        let stored = store.get("orders", &order.id).await?.unwrap();
        assert_eq!(stored.fields["status"], "On going");

        let missing = update_order_status(&store, "missing", OrderStatus::Done).await;
        assert!(matches!(missing, Err(Error::DocumentNotFound { .. })));
        Ok(())
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("On going".parse::<OrderStatus>().ok(), Some(OrderStatus::OnGoing));
        assert_eq!(OrderStatus::Done.to_string(), "Done");
        assert!("Cancelled".parse::<OrderStatus>().is_err());
    }
}
