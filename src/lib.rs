pub mod config;
pub mod directory;
pub mod domain;
pub mod error;
pub mod geocoding;
pub mod maps;
pub mod observability;
pub mod server;

pub use config::Config;
pub use error::{AppError, Result};
