//! 客户端模块：统一入口、构建器、重试策略与健康检查。
//!
//! Client module: the unified entry point, its builder, retry policy and health checks.

mod builder;
mod core;
mod health;
pub(crate) mod policy;

pub use builder::VoiceClientBuilder;
pub use self::core::{Service, VoiceClient};
pub use health::HealthStatus;
