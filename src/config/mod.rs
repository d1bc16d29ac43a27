//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MonitorConfig (validated, immutable)
//!     → ConnectivitySettings / HttpProbe
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; an empty file is a valid config
//! - Defaults match the reference timing constants
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{BackendConfig, ConnectivityConfig, LogFormat, MonitorConfig, ObservabilityConfig, WatchConfig};
pub use validation::{validate_config, ValidationError};
