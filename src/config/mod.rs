// src/config/mod.rs
pub mod monitor;

pub use monitor::{MonitorConfig, NotifyConfig, SourcesConfig, ENV_CONFIG_PATH};
