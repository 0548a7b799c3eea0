pub mod app_config;
pub mod config;
pub mod entities;
pub mod gateway;
pub mod geo;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use entities::{EntityKey, EntityKind, Listing, NearbyEntity, RawNearbyRecord};
pub use gateway::{BackendGateway, GatewayError, LocationError, LocationEvent, NearbyQuery};
pub use geo::{Coordinate, GeoError, SearchRadius};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
