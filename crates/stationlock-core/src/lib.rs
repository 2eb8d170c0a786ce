//! # stationlock-core
//!
//! Core crate for stationlock. Contains the configuration schema, typed
//! station and identity values, the capability traits implemented by the
//! engine, and the unified error system.
//!
//! This crate has **no** internal dependencies on other stationlock crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
