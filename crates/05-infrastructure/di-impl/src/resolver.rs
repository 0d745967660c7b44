//! 依赖解析器实现
//!
//! 深度优先递归解析依赖图，按声明顺序依次解析每个依赖，
//! 通过本作用域的正在构造标记检测循环依赖，并将结果写入作用域注册表。

use crate::context::{enter, try_current_scope};
use crate::registry::ScopeRegistryImpl;
use async_trait::async_trait;
use di_abstractions::{
    DependencyKey, DependencyResolver, Instance, ResolveContext, ResolveOptions, ScopeRegistry,
};
use futures::future::{BoxFuture, FutureExt};
use infrastructure_common::{DependencyError, DependencyResult};
use std::sync::Arc;
use tracing::{debug, warn};

/// 依赖解析器实现
///
/// 通过 [`for_scope`](Self::for_scope) 创建的解析器在构造依赖期间会把绑定的作用域设为当前作用域，
/// 使类和工厂内部的 `get` 读取的是被解析的作用域。
#[derive(Clone)]
pub struct DependencyResolverImpl {
    registry: Arc<dyn ScopeRegistry>,
    scope: Option<Arc<ScopeRegistryImpl>>,
    options: ResolveOptions,
}

impl DependencyResolverImpl {
    /// 创建新的依赖解析器
    ///
    /// 不绑定当前作用域，构造依赖时使用调用方所在的作用域。
    pub fn new(registry: Arc<dyn ScopeRegistry>, options: ResolveOptions) -> Self {
        Self {
            registry,
            scope: None,
            options,
        }
    }

    /// 为作用域创建解析器，使用作用域的配置
    pub fn for_scope(scope: &Arc<ScopeRegistryImpl>) -> Self {
        Self {
            registry: Arc::clone(scope) as Arc<dyn ScopeRegistry>,
            scope: Some(Arc::clone(scope)),
            options: ResolveOptions::from(scope.config()),
        }
    }

    /// 需要切换为当前作用域的绑定作用域，已经是当前作用域时返回 `None`
    fn scope_to_enter(&self) -> Option<Arc<ScopeRegistryImpl>> {
        let scope = self.scope.as_ref()?;
        match try_current_scope() {
            Some(current) if current.info().id == scope.info().id => None,
            _ => Some(Arc::clone(scope)),
        }
    }

    /// 解析选项
    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    fn resolve_with<'a>(
        &'a self,
        key: &'a DependencyKey,
        context: ResolveContext,
    ) -> BoxFuture<'a, DependencyResult<Instance>> {
        async move {
            if let Some(existing) = self.registry.lookup(key) {
                if context.options.log_steps {
                    debug!("依赖已存在: {}", key);
                }
                return Ok(existing);
            }

            if self.registry.is_in_flight(key) {
                let call_tree = context.render_with(key);
                warn!("检测到循环依赖: {}", call_tree);
                return Err(DependencyError::CircularDependency { call_tree });
            }

            if context.depth() >= context.options.max_depth {
                return Err(DependencyError::MaxDepthExceeded {
                    max_depth: context.options.max_depth,
                    call_tree: context.render_with(key),
                });
            }

            self.registry.mark_in_flight(key);

            if let Some(descriptor) = key.descriptor() {
                let nested = context.descend(key);
                for dependency in &descriptor.depends_on {
                    self.resolve_with(dependency, nested.clone()).await?;
                }
            }

            if context.options.log_steps {
                debug!("构造依赖: {} ({:?})", key, key.kind());
            }

            let product = match key {
                DependencyKey::Class(class) => Some(class.instantiate()?),
                DependencyKey::Factory(factory) => factory.invoke().await?,
                _ => key.own_value(),
            };

            let Some(product) = product else {
                let call_tree = context.render_with(key);
                warn!("依赖 {} 解析结果为空: {}", key, call_tree);
                return Err(DependencyError::UnresolvedUndefined {
                    name: key.to_string(),
                    call_tree,
                });
            };

            self.registry.define(key.clone(), Arc::clone(&product))?;
            self.registry.clear_in_flight(key);
            Ok(product)
        }
        .boxed()
    }
}

#[async_trait]
impl DependencyResolver for DependencyResolverImpl {
    async fn resolve(&self, key: &DependencyKey) -> DependencyResult<Instance> {
        debug!("开始解析依赖: {}", key);
        let context = ResolveContext::new(self.options.clone());
        let result = match self.scope_to_enter() {
            Some(scope) => enter(scope, || self.resolve_with(key, context)).await,
            None => self.resolve_with(key, context).await,
        };
        match &result {
            Ok(_) => debug!("依赖解析完成: {}", key),
            Err(e) => warn!("依赖解析失败: {}, 原因: {}", key, e),
        }
        result
    }
}

impl std::fmt::Debug for DependencyResolverImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyResolverImpl")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::{downcast_instance, Injectable};
    use infrastructure_common::ContainerConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Left;
    struct Right;

    impl Injectable for Left {
        fn depends_on() -> Vec<DependencyKey> {
            vec![DependencyKey::class::<Right>()]
        }

        fn construct() -> DependencyResult<Self> {
            Ok(Self)
        }
    }

    impl Injectable for Right {
        fn depends_on() -> Vec<DependencyKey> {
            vec![DependencyKey::class::<Left>()]
        }

        fn construct() -> DependencyResult<Self> {
            Ok(Self)
        }
    }

    fn resolver() -> (Arc<ScopeRegistryImpl>, DependencyResolverImpl) {
        let scope = ScopeRegistryImpl::root(ContainerConfig::default());
        let resolver = DependencyResolverImpl::for_scope(&scope);
        (scope, resolver)
    }

    #[test]
    fn test_cycle_detected_with_call_tree() {
        let (scope, resolver) = resolver();
        let key = DependencyKey::class::<Left>();

        let error = tokio_test::block_on(resolver.resolve(&key)).unwrap_err();

        assert_eq!(error.call_tree(), Some("Left -> Right -> Left"));
        assert!(error.is_circular());
        assert!(scope.resolved_keys().is_empty());
        // 失败后不回滚正在构造标记
        assert!(scope.is_in_flight(&key));
    }

    #[test]
    fn test_dependencies_resolved_in_declaration_order() {
        let (scope, resolver) = resolver();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let make = |name: &'static str| {
            let order = Arc::clone(&order);
            DependencyKey::sync_factory(name, [], move || {
                order.lock().unwrap().push(name);
                Some(name)
            })
        };
        let first = make("first");
        let second = make("second");
        let third = make("third");
        let root = DependencyKey::sync_factory("root", [first, second, third], || Some(()));

        tokio_test::block_on(resolver.resolve(&root)).unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
        assert_eq!(scope.resolved_keys().len(), 4);
    }

    #[test]
    fn test_max_depth_exceeded() {
        let scope = ScopeRegistryImpl::root(ContainerConfig {
            max_resolution_depth: 2,
            ..ContainerConfig::default()
        });
        let resolver = DependencyResolverImpl::for_scope(&scope);

        let c = DependencyKey::sync_factory("C", [], || Some(3_u8));
        let b = DependencyKey::sync_factory("B", [c], || Some(2_u8));
        let a = DependencyKey::sync_factory("A", [b], || Some(1_u8));

        let error = tokio_test::block_on(resolver.resolve(&a)).unwrap_err();
        assert!(matches!(
            error,
            DependencyError::MaxDepthExceeded { max_depth: 2, .. }
        ));
        assert_eq!(error.call_tree(), Some("A -> B -> C"));
    }

    #[test]
    fn test_resolve_all_memoizes_shared_dependency() {
        let (_scope, resolver) = resolver();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let shared = DependencyKey::sync_factory("shared", [], move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(String::from("shared"))
        });
        let a = DependencyKey::sync_factory("a", [shared.clone()], || Some(1_u8));
        let b = DependencyKey::sync_factory("b", [shared.clone()], || Some(2_u8));

        let instances = tokio_test::block_on(resolver.resolve_all(&[a, b, shared.clone()])).unwrap();

        assert_eq!(instances.len(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let value = downcast_instance::<String>(&shared, Arc::clone(&instances[2])).unwrap();
        assert_eq!(value.as_str(), "shared");
    }
}
