//! # Infrastructure Common
//!
//! 这个 crate 提供了作用域依赖注入容器的公共类型和工具。
//!
//! ## 核心内容
//!
//! - [`DependencyError`] - 依赖解析错误
//! - [`TypeInfo`] - 类型元数据，用于诊断输出
//! - [`ContainerConfig`] - 容器配置
//! - [`LoggingConfig`] - 日志初始化配置
//!
//! ## 设计原则
//!
//! - 基于 Rust 类型系统的编译时安全
//! - 异步优先的设计理念
//! - 错误信息中包含完整的依赖调用链

pub mod configuration;
pub mod errors;
pub mod logging;
pub mod metadata;

pub use configuration::*;
pub use errors::*;
pub use logging::*;
pub use metadata::*;
