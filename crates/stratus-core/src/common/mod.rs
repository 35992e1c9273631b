//! Shared types and error definitions used across the stratus collector.
//!
//! The `common` module defines the abstractions shared between the REST
//! client, the enumeration stages, and the output sink.
//!
//! ## Submodules
//!
//! - [`error`] - Centralized collector error type used throughout
//!   enumeration and output handling.
//! - [`types`] - Curated resource models and the tagged envelope union.
//!
//! These definitions are not tied to any specific layer and are imported
//! throughout the collector for error propagation and result encoding.

pub mod error;
pub mod types;

pub use error::*;
pub use types::*;
