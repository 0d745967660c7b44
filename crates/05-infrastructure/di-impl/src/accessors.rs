//! 当前作用域上的依赖访问函数
//!
//! 所有函数在作用域之外调用时返回 `NoActiveScope`。

use crate::context::current_scope;
use crate::resolver::DependencyResolverImpl;
use di_abstractions::{downcast_instance, DependencyKey, DependencyResolver, Instance};
use infrastructure_common::DependencyResult;
use std::sync::Arc;

/// 从当前作用域获取依赖，不存在时返回 `NotFound`
pub fn get<T: Send + Sync + 'static>(key: &DependencyKey) -> DependencyResult<Arc<T>> {
    current_scope()?.get(key)
}

/// 从当前作用域获取类型擦除的依赖
pub fn get_instance(key: &DependencyKey) -> DependencyResult<Instance> {
    current_scope()?.get_instance(key)
}

/// 从当前作用域获取依赖，不存在或类型不匹配时返回 `None`
pub fn try_get<T: Send + Sync + 'static>(key: &DependencyKey) -> Option<Arc<T>> {
    get(key).ok()
}

/// 向当前作用域写入依赖值
pub fn set<T: Send + Sync + 'static>(key: impl Into<DependencyKey>, value: T) -> DependencyResult<()> {
    current_scope()?.set(key, value)
}

/// 在当前作用域强制覆盖依赖值
pub fn mock<T: Send + Sync + 'static>(key: impl Into<DependencyKey>, value: T) -> DependencyResult<()> {
    current_scope()?.mock(key, value);
    Ok(())
}

/// 在当前作用域解析依赖
pub async fn resolve<T: Send + Sync + 'static>(key: &DependencyKey) -> DependencyResult<Arc<T>> {
    let instance = resolve_instance(key).await?;
    downcast_instance(key, instance)
}

/// 在当前作用域解析类型擦除的依赖
pub async fn resolve_instance(key: &DependencyKey) -> DependencyResult<Instance> {
    let scope = current_scope()?;
    DependencyResolverImpl::for_scope(&scope).resolve(key).await
}

/// 在当前作用域按顺序解析多个依赖
pub async fn resolve_all(keys: &[DependencyKey]) -> DependencyResult<Vec<Instance>> {
    let scope = current_scope()?;
    DependencyResolverImpl::for_scope(&scope).resolve_all(keys).await
}
