pub mod config;

pub use config::{ColorChoice, Config};
