mod bridge;
mod codec;
mod config;
mod dispatcher;
mod error;
mod gateway;
mod stub_native;
