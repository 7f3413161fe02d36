pub mod app_config;
pub mod batch;
pub mod config;
pub mod policy;
pub mod stock;

pub use app_config::{AppConfig, Environment};
pub use batch::{BatchItem, BatchRequest, BatchResponse, BatchResult};
pub use config::{load_app_config, load_app_config_from_env};
pub use policy::AvailabilityPolicy;
pub use stock::{
    is_supported_brand, ErrorKind, ExtractionSource, IdentifierKind, StockCheckResponse,
    StockQuery, VariantAvailability, Verdict, SUPPORTED_BRAND,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
