pub mod bridge;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod gateway;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Codec(#[from] codec::CodecError),

    #[error(transparent)]
    Gateway(#[from] gateway::GatewayError),

    #[error(transparent)]
    Dispatch(#[from] dispatch::DispatchError),

    #[error(transparent)]
    Bridge(#[from] bridge::BridgeError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}
