//! Seed data catalog.
//!
//! The initial services and admin emails written into empty collections. The
//! built-in catalog can be replaced by a TOML file with the same shape:
//!
//! ```toml
//! [[services]]
//! name = "Web Design"
//! price = 500.0
//! description = "Professional web design services"
//! img = "https://example.com/web-design.png"
//!
//! [[admins]]
//! email = "admin@example.com"
//! ```

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// A service offering to seed into `services`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSeed {
    /// Display name
    pub name: String,
    /// Price in dollars
    pub price: f64,
    /// Short marketing description
    pub description: String,
    /// Image URL
    pub img: String,
}

/// An admin email to seed into `admins`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSeed {
    /// Email address granted admin rights
    pub email: String,
}

/// The complete seed catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedCatalog {
    /// Services written when `services` is empty
    #[serde(default)]
    pub services: Vec<ServiceSeed>,
    /// Admins written when `admins` is empty
    #[serde(default)]
    pub admins: Vec<AdminSeed>,
}

fn service(name: &str, price: f64, description: &str, label: &str) -> ServiceSeed {
    ServiceSeed {
        name: name.to_string(),
        price,
        description: description.to_string(),
        img: format!("https://via.placeholder.com/300x200?text={label}"),
    }
}

impl Default for SeedCatalog {
    fn default() -> Self {
        Self {
            services: vec![
                service(
                    "Web Design",
                    500.0,
                    "Professional web design services to create stunning websites",
                    "Web+Design",
                ),
                service(
                    "Web Development",
                    800.0,
                    "Full-stack web development with modern technologies",
                    "Web+Development",
                ),
                service(
                    "Digital Marketing",
                    400.0,
                    "Comprehensive digital marketing strategies and execution",
                    "Digital+Marketing",
                ),
                service(
                    "Graphic Design",
                    300.0,
                    "Creative graphic design for brands and marketing materials",
                    "Graphic+Design",
                ),
                service(
                    "Strategy & Research",
                    600.0,
                    "In-depth business strategy and market research",
                    "Strategy+Research",
                ),
            ],
            admins: vec![AdminSeed {
                email: "admin@example.com".to_string(),
            }],
        }
    }
}

/// Loads a seed catalog from a TOML file.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_seed_catalog<P: AsRef<Path>>(path: P) -> Result<SeedCatalog> {
    let path = path.as_ref();
    debug!("Loading seed catalog from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read seed file {}: {e}", path.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed file {}: {e}", path.display()),
    })
}

/// Returns the catalog at `path` when given, the built-in one otherwise.
pub fn resolve_seed_catalog(path: Option<&Path>) -> Result<SeedCatalog> {
    path.map_or_else(|| Ok(SeedCatalog::default()), load_seed_catalog)
}
