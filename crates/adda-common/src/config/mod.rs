//! Configuration structs

mod app_config;

pub use app_config::{
    ApiConfig, AppSettings, ClientConfig, ConfigError, EngagementSettings, Environment,
};
