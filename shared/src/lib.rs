pub mod config;
pub mod error;
pub mod logging;

pub use config::Settings;
pub use error::CoreError;
