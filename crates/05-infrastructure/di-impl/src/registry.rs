//! 作用域注册表实现

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use di_abstractions::{downcast_instance, DependencyKey, Instance, ScopeRegistry};
use infrastructure_common::{ContainerConfig, DependencyError, DependencyResult};
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;
use uuid::Uuid;

/// 作用域诊断信息
#[derive(Debug, Clone)]
pub struct ScopeInfo {
    /// 作用域标识
    pub id: Uuid,
    /// 嵌套深度，根作用域为 0
    pub depth: usize,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl ScopeInfo {
    fn new(depth: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            depth,
            created_at: Utc::now(),
        }
    }
}

/// 作用域注册表实现
///
/// 只持有父作用域的弱引用，父作用域的存活由调用结构保证。
pub struct ScopeRegistryImpl {
    info: ScopeInfo,
    config: Arc<ContainerConfig>,
    parent: Option<Weak<ScopeRegistryImpl>>,
    /// 已解析值，只写一次
    resolved: DashMap<DependencyKey, Instance>,
    /// 正在构造标记，只翻转不删除
    in_flight: DashMap<DependencyKey, bool>,
    /// 强制覆盖值
    overrides: DashMap<DependencyKey, Instance>,
}

impl ScopeRegistryImpl {
    /// 创建根作用域
    pub fn root(config: ContainerConfig) -> Arc<Self> {
        let registry = Self::new(ScopeInfo::new(0), Arc::new(config), None);
        debug!("创建根作用域: {}", registry.info.id);
        Arc::new(registry)
    }

    /// 创建子作用域，继承父作用域的配置
    pub fn child_of(parent: &Arc<Self>) -> Arc<Self> {
        let registry = Self::new(
            ScopeInfo::new(parent.info.depth + 1),
            Arc::clone(&parent.config),
            Some(Arc::downgrade(parent)),
        );
        debug!(
            "创建子作用域: {} (父作用域: {}, 深度: {})",
            registry.info.id, parent.info.id, registry.info.depth
        );
        Arc::new(registry)
    }

    fn new(info: ScopeInfo, config: Arc<ContainerConfig>, parent: Option<Weak<Self>>) -> Self {
        Self {
            info,
            config,
            parent,
            resolved: DashMap::new(),
            in_flight: DashMap::new(),
            overrides: DashMap::new(),
        }
    }

    /// 诊断信息
    pub fn info(&self) -> &ScopeInfo {
        &self.info
    }

    /// 生效的容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 父作用域（已释放时返回 `None`）
    pub fn parent(&self) -> Option<Arc<Self>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// 本作用域内已解析的依赖键
    pub fn resolved_keys(&self) -> Vec<DependencyKey> {
        self.resolved.iter().map(|entry| entry.key().clone()).collect()
    }

    /// 获取依赖，不存在时返回 `NotFound`
    pub fn get_instance(&self, key: &DependencyKey) -> DependencyResult<Instance> {
        self.lookup(key)
            .ok_or_else(|| DependencyError::not_found(key.to_string()))
    }

    /// 获取指定类型的依赖
    pub fn get<T: Send + Sync + 'static>(&self, key: &DependencyKey) -> DependencyResult<Arc<T>> {
        let instance = self.get_instance(key)?;
        downcast_instance(key, instance)
    }

    /// 写入依赖值
    pub fn set<T: Send + Sync + 'static>(
        &self,
        key: impl Into<DependencyKey>,
        value: T,
    ) -> DependencyResult<()> {
        self.define(key.into(), Arc::new(value))
    }

    /// 强制覆盖依赖值，对所有子作用域可见
    pub fn mock<T: Send + Sync + 'static>(&self, key: impl Into<DependencyKey>, value: T) {
        self.override_value(key.into(), Arc::new(value));
    }
}

impl ScopeRegistry for ScopeRegistryImpl {
    fn lookup(&self, key: &DependencyKey) -> Option<Instance> {
        if let Some(value) = self.overridden(key) {
            return Some(value);
        }

        let parent = self.parent();
        if let Some(value) = parent.as_ref().and_then(|parent| parent.overridden(key)) {
            return Some(value);
        }

        if let Some(value) = self.resolved.get(key).map(|entry| Arc::clone(entry.value())) {
            return Some(value);
        }

        parent.and_then(|parent| parent.lookup(key))
    }

    fn define(&self, key: DependencyKey, value: Instance) -> DependencyResult<()> {
        match self.resolved.entry(key) {
            Entry::Occupied(entry) => Err(DependencyError::already_registered(
                entry.key().to_string(),
            )),
            Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(())
            }
        }
    }

    fn override_value(&self, key: DependencyKey, value: Instance) {
        debug!("作用域 {} 覆盖依赖: {}", self.info.id, key);
        self.overrides.insert(key, value);
    }

    fn overridden(&self, key: &DependencyKey) -> Option<Instance> {
        self.overrides.get(key).map(|entry| Arc::clone(entry.value()))
    }

    fn mark_in_flight(&self, key: &DependencyKey) {
        self.in_flight.insert(key.clone(), true);
    }

    fn clear_in_flight(&self, key: &DependencyKey) {
        if let Some(mut flag) = self.in_flight.get_mut(key) {
            *flag = false;
        }
    }

    fn is_in_flight(&self, key: &DependencyKey) -> bool {
        self.in_flight.get(key).map_or(false, |flag| *flag)
    }
}

impl fmt::Debug for ScopeRegistryImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeRegistryImpl")
            .field("info", &self.info)
            .field("config", &self.config)
            .field("has_parent", &self.parent.is_some())
            .field("resolved", &self.resolved.len())
            .field("overrides", &self.overrides.len())
            .finish()
    }
}
