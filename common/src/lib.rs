//! Shared leaf types for Passguard.
//!
//! This crate contains small types every other crate depends on. It has
//! no knowledge of the native module, the codec or the bridge.
//!
//! ## Architecture
//!
//! - **common** (this crate): Error locations and secret wrappers
//! - **bridge-core**: Codec, native gateway, dispatcher and bridge channels
//! - **passguard**: Process shell wiring everything together

pub mod error;
pub mod redacted_secret;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use redacted_secret::RedactedSecret;

#[cfg(test)]
mod tests;
