//! # hotload-core
//!
//! Core crate for Hotload. Contains configuration schemas, the host-defined
//! runtime options enumeration and the unified error system.
//!
//! This crate has **no** internal dependencies on other Hotload crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
