//! Database library providing the MongoDB connector and shared retry utilities
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB client construction, connection checks, health
//! - `config` - `core_config::FromEnv` for [`mongodb::MongoConfig`]
//! - `all` - All features
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, connect_from_config_with_retry};
//! use database::common::RetryConfig;
//! use core_config::FromEnv;
//!
//! let config = MongoConfig::from_env()?;
//! let client = connect_from_config_with_retry(&config, Some(RetryConfig::new().with_max_retries(5))).await?;
//! let db = client.database(config.database());
//! ```

// Always available modules
pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

// Re-exports for convenience
pub use common::{DatabaseError, DatabaseResult};
