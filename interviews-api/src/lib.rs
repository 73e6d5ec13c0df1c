pub mod application_service;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod port;
pub mod presentation;
pub mod server;

pub use config::{ServerConfig, StoreKind};
pub use server::Server;
