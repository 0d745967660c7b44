//! 作用域上下文
//!
//! 使用 task-local 存储让当前作用域对回调内的所有同步和异步调用隐式可见，
//! 包括跨越 `.await` 的调用。作用域只在回调的动态范围内生效，
//! 退出后自动恢复外层作用域，`tokio::spawn` 出去的任务不会继承当前作用域。

use crate::registry::ScopeRegistryImpl;
use infrastructure_common::{ContainerConfig, DependencyError, DependencyResult};
use std::future::Future;
use std::sync::Arc;

tokio::task_local! {
    /// 当前任务的作用域
    static CURRENT_SCOPE: Arc<ScopeRegistryImpl>;
}

/// 获取当前作用域
pub fn current_scope() -> DependencyResult<Arc<ScopeRegistryImpl>> {
    try_current_scope().ok_or(DependencyError::NoActiveScope)
}

/// 获取当前作用域（如果有）
pub fn try_current_scope() -> Option<Arc<ScopeRegistryImpl>> {
    CURRENT_SCOPE.try_with(Arc::clone).ok()
}

/// 在新作用域中执行回调
///
/// 新作用域的父作用域为当前作用域；不在任何作用域中时创建使用默认配置的根作用域。
pub async fn run_in_new_scope<F, Fut, T>(callback: F) -> T
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    enter(new_scope(None), callback).await
}

/// 在新作用域中执行回调，不在任何作用域中时使用指定配置创建根作用域
///
/// 已有外层作用域时配置从父作用域继承，`config` 被忽略。
pub async fn run_in_new_scope_with_config<F, Fut, T>(config: ContainerConfig, callback: F) -> T
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    enter(new_scope(Some(config)), callback).await
}

/// 在新作用域中同步执行回调
pub fn run_in_new_scope_sync<F, T>(callback: F) -> T
where
    F: FnOnce() -> T,
{
    CURRENT_SCOPE.sync_scope(new_scope(None), callback)
}

/// 将已有的作用域注册表设为当前作用域并执行回调
pub async fn enter<F, Fut, T>(scope: Arc<ScopeRegistryImpl>, callback: F) -> T
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    CURRENT_SCOPE.scope(scope, async move { callback().await }).await
}

fn new_scope(config: Option<ContainerConfig>) -> Arc<ScopeRegistryImpl> {
    match try_current_scope() {
        Some(parent) => ScopeRegistryImpl::child_of(&parent),
        None => ScopeRegistryImpl::root(config.unwrap_or_default()),
    }
}
