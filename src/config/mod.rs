//! 配置模块

mod app_config;

pub use app_config::{get_config, update_config, AppConfig};
