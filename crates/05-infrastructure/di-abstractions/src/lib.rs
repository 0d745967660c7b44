//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义依赖键、描述符以及作用域注册和依赖解析的核心接口。
//!
//! ## 核心接口
//!
//! - [`DependencyKey`] - 依赖键（字符串、符号、普通值、类、工厂）
//! - [`DependencyDescriptor`] - 依赖描述符
//! - [`Injectable`] - 可注入类型
//! - [`ScopeRegistry`] - 作用域注册表接口
//! - [`DependencyResolver`] - 依赖解析器接口

pub mod descriptor;
pub mod key;
pub mod registry;
pub mod resolver;

pub use descriptor::*;
pub use key::*;
pub use registry::*;
pub use resolver::*;
