//! Owner of the single native entry point.
//!
//! The gateway resolves the platform library lazily on first use, binds the
//! `entrypoint` symbol once, and serializes every call into it. Nothing else
//! in the crate touches the library handle.

pub mod library;
mod native;

pub use library::{LibraryPlatform, library_path};
pub use native::{LibrarySource, NativeGateway, RawEntrypoint};
