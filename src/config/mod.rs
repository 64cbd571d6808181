//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or defaults
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → command-line overrides (main.rs)
//!     → ResplenConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    FillerPolicy, ListenerConfig, LogFormat, ObservabilityConfig, RequestConfig, ResplenConfig,
    ResponseConfig, ShutdownConfig, DEFAULT_MAX_LENGTH,
};
pub use validation::{validate_config, ValidationError};
