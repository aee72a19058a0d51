//! Async front end driving the same exchanges over [embedded_io_async] transports
mod http;
mod wifi;

pub use wifi::Adapter;
