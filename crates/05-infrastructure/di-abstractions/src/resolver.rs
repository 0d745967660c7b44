//! 依赖解析器抽象接口
//!
//! 提供依赖解析和实例构造的能力

use crate::key::{render_call_tree, DependencyKey, Instance};
use async_trait::async_trait;
use infrastructure_common::{ContainerConfig, DependencyResult};

/// 依赖解析器 trait
#[async_trait]
pub trait DependencyResolver: Send + Sync {
    /// 解析依赖，同一作用域内重复解析返回同一个实例
    async fn resolve(&self, key: &DependencyKey) -> DependencyResult<Instance>;

    /// 按顺序解析多个依赖
    async fn resolve_all(&self, keys: &[DependencyKey]) -> DependencyResult<Vec<Instance>> {
        let mut instances = Vec::with_capacity(keys.len());
        for key in keys {
            instances.push(self.resolve(key).await?);
        }
        Ok(instances)
    }
}

/// 解析上下文
#[derive(Debug, Clone)]
pub struct ResolveContext {
    /// 当前递归路径上的依赖键，用于诊断输出
    pub call_tree: Vec<DependencyKey>,
    /// 解析选项
    pub options: ResolveOptions,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new(options: ResolveOptions) -> Self {
        Self {
            call_tree: Vec::new(),
            options,
        }
    }

    /// 进入下一层依赖
    pub fn descend(&self, key: &DependencyKey) -> Self {
        let mut call_tree = Vec::with_capacity(self.call_tree.len() + 1);
        call_tree.extend(self.call_tree.iter().cloned());
        call_tree.push(key.clone());
        Self {
            call_tree,
            options: self.options.clone(),
        }
    }

    /// 当前深度
    pub fn depth(&self) -> usize {
        self.call_tree.len()
    }

    /// 渲染以 `key` 结尾的调用链
    pub fn render_with(&self, key: &DependencyKey) -> String {
        render_call_tree(self.call_tree.iter().chain(std::iter::once(key)))
    }
}

/// 解析选项
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// 最大递归深度
    pub max_depth: usize,
    /// 是否输出每个解析步骤的调试日志
    pub log_steps: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self::from(&ContainerConfig::default())
    }
}

impl From<&ContainerConfig> for ResolveOptions {
    fn from(config: &ContainerConfig) -> Self {
        Self {
            max_depth: config.max_resolution_depth,
            log_steps: config.log_resolution_steps,
        }
    }
}
