//! # 依赖注入具体实现
//!
//! 提供作用域注册表、依赖解析器和基于 task-local 的作用域上下文。
//!
//! ```rust,no_run
//! use di_abstractions::{DependencyKey, Injectable};
//! use di_impl::{get, resolve, run_in_new_scope};
//! use infrastructure_common::{DependencyError, DependencyResult};
//! use once_cell::sync::Lazy;
//!
//! struct Config {
//!     url: String,
//! }
//!
//! static CONFIG: Lazy<DependencyKey> = Lazy::new(|| {
//!     DependencyKey::labeled_value("config", Config { url: "https://example.com".into() })
//! });
//!
//! struct Api;
//!
//! impl Injectable for Api {
//!     fn depends_on() -> Vec<DependencyKey> {
//!         vec![CONFIG.clone()]
//!     }
//!
//!     fn construct() -> DependencyResult<Self> {
//!         Ok(Api)
//!     }
//! }
//!
//! impl Api {
//!     fn url(&self) -> DependencyResult<String> {
//!         Ok(get::<Config>(&CONFIG)?.url.clone())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> DependencyResult<()> {
//!     run_in_new_scope(|| async {
//!         let api = resolve::<Api>(&DependencyKey::class::<Api>()).await?;
//!         println!("{}", api.url()?);
//!         Ok::<(), DependencyError>(())
//!     })
//!     .await
//! }
//! ```

pub mod accessors;
pub mod context;
pub mod registry;
pub mod resolver;

pub use accessors::*;
pub use context::*;
pub use registry::{ScopeInfo, ScopeRegistryImpl};
pub use resolver::DependencyResolverImpl;
