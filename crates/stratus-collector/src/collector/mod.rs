//! Collector internals wired together by `main.rs`.
//!
//! ## Submodules
//!
//! - [`client`] - Streaming access to the ARM REST API behind the
//!   [`client::DirectoryClient`] seam.
//! - [`config`] - CLI argument parsing and validated runtime
//!   configuration.
//! - [`sink`] - The envelope sink that turns the pipeline output into
//!   JSON lines.
//! - [`stages`] - The enumeration stages composed out of
//!   `stratus-pipeline` primitives.
//! - [`telemetry`] - Tracing-based structured logging initialization.

pub mod client;
pub mod config;
pub mod sink;
pub mod stages;
pub mod telemetry;
