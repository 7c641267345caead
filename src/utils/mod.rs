pub mod config;
pub mod credentials;
pub mod logger;
pub mod subloader_toml;

pub use config::*;
pub use credentials::{get_password, get_user};
pub use logger::setup_logging;
