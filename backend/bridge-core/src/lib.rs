pub mod bridge;
pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod gateway;

#[cfg(test)]
mod tests;

/// Base name of the native module, without platform prefix or extension.
pub const NATIVE_LIBRARY_NAME: &str = "passguard_api";
/// The single symbol exported by the native module.
pub const NATIVE_ENTRYPOINT_SYMBOL: &str = "entrypoint";
/// Suffix appended to a request channel name to form its reply channel.
pub const RESPONSE_CHANNEL_SUFFIX: &str = "-response";
pub const BRIDGE_HOSTNAME: &str = "127.0.0.1";
pub const BRIDGE_BASE_URL: &str = const_format::concatcp!("ws://", BRIDGE_HOSTNAME);
