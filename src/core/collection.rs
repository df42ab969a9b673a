//! Known collection names.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Collection holding site settings, one document per key.
pub const SETTINGS: &str = "settings";
/// Collection holding contact form submissions.
pub const CONTACTS: &str = "contacts";

/// The four collections managed by the initializer and the stats reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Service offerings
    Services,
    /// Bookings
    Orders,
    /// Customer reviews
    Reviews,
    /// Admin emails
    Admins,
}

impl Collection {
    /// All managed collections, in initialization order.
    pub const ALL: [Self; 4] = [Self::Services, Self::Orders, Self::Reviews, Self::Admins];

    /// Store-level collection name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Services => "services",
            Self::Orders => "orders",
            Self::Reviews => "reviews",
            Self::Admins => "admins",
        }
    }

    /// Capitalized name used in user-facing messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Services => "Services",
            Self::Orders => "Orders",
            Self::Reviews => "Reviews",
            Self::Admins => "Admins",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == name)
            .ok_or_else(|| Error::UnknownCollection {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_names() {
        for collection in Collection::ALL {
            assert_eq!(collection.as_str().parse::<Collection>().ok(), Some(collection));
        }
    }

    #[test]
    fn test_parse_is_exact() {
        assert!(matches!(
            "widgets".parse::<Collection>(),
            Err(Error::UnknownCollection { name }) if name == "widgets"
        ));
        assert!("Services".parse::<Collection>().is_err());
        assert!(" services".parse::<Collection>().is_err());
    }
}
