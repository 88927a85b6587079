mod client;
mod config;

pub use client::{Inbound, NetworkClient};
pub use config::ClientConfig;
