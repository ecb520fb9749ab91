pub mod cli;
pub mod commands;
pub mod converters;
pub mod error;
pub mod loader;
pub mod models;
pub mod telemetry;
pub mod transform;

pub use error::{Pm2InsomniaError, Result};
