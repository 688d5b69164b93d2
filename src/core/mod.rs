//! # Core Module
//!
//! Configuration and the error taxonomy shared by the store, wizard and scheduler.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.7.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Add domain error types, drop response chunking
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{DeliveryError, IntervalError, SinError, StoreError};
