//! Error types for the stratus collector.
//!
//! This module defines the central `Error` enum, which captures every
//! reportable failure in the collection pipeline. Enumeration stages treat
//! these as data: a failed listing is logged and skipped rather than
//! propagated, so a single unreadable resource never aborts a run.
//!
//! ## Error Cases
//! - `Http`: The API answered with a non-success status code.
//! - `Transport`: The request never produced a response (DNS, connect,
//!   TLS, timeout).
//! - `Decode`: A payload could not be converted to or from the expected
//!   JSON shape.
//! - `Io`: Writing serialized envelopes to the output failed.

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the stratus collector.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The API rejected or failed the request with a status code.
    #[error("http status {status} from {context}")]
    Http { status: u16, context: String },

    /// The request never reached the API or the response never arrived.
    #[error("transport error: {context}")]
    Transport { context: String },

    /// A payload did not match the expected JSON shape.
    #[error("decode error: {context}")]
    Decode { context: String },

    /// The output writer failed.
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}
