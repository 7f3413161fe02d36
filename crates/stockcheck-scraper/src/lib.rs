pub mod checker;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod resolver;
pub mod site;

pub use checker::StockChecker;
pub use error::{FetchError, StructuredStateError};
pub use extract::{extract_availability, Extraction};
pub use fetch::{FetchConfig, FetchedPage, Fetcher, ProxyConfig};
pub use resolver::{find_product_id, resolve_product_id};
pub use site::{normalize_identifier, SiteConfig};
