//! 作用域注册表抽象接口

use crate::key::{DependencyKey, Instance};
use infrastructure_common::DependencyResult;

/// 作用域注册表 trait
///
/// 每个作用域一个注册表。查找会沿父作用域链向上进行，写入永远只发生在本作用域。
pub trait ScopeRegistry: Send + Sync {
    /// 查找依赖
    ///
    /// 顺序：本地覆盖值 → 父作用域覆盖值 → 本地已解析值 → 委托父作用域查找。
    fn lookup(&self, key: &DependencyKey) -> Option<Instance>;

    /// 写入已解析值，同一作用域内重复写入返回 `AlreadyRegistered`
    fn define(&self, key: DependencyKey, value: Instance) -> DependencyResult<()>;

    /// 写入覆盖值，后写入者生效
    fn override_value(&self, key: DependencyKey, value: Instance);

    /// 本地覆盖值
    fn overridden(&self, key: &DependencyKey) -> Option<Instance>;

    /// 标记为正在构造
    fn mark_in_flight(&self, key: &DependencyKey);

    /// 清除正在构造标记
    fn clear_in_flight(&self, key: &DependencyKey);

    /// 是否正在本作用域内构造
    fn is_in_flight(&self, key: &DependencyKey) -> bool;
}
