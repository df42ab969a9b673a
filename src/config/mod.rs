/// Application settings loaded from the environment
pub mod app;

/// Database connection and table creation
pub mod database;

/// Seed data catalog, optionally loaded from a TOML file
pub mod seed;

pub use app::AppConfig;
pub use seed::{AdminSeed, SeedCatalog, ServiceSeed};
