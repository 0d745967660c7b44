//! Centralized end-to-end tests for the scoped container
use async_trait::async_trait;
use di_abstractions::{
    DependencyKey, DependencyResolver, Injectable, Instance, ResolveOptions, ScopeRegistry,
};
use di_impl::{
    current_scope, enter, get, mock, resolve, run_in_new_scope, run_in_new_scope_sync,
    run_in_new_scope_with_config, DependencyResolverImpl, ScopeRegistryImpl,
};
use infrastructure_common::{ContainerConfig, DependencyError, DependencyResult};
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex};

/// 应用配置
#[derive(Debug, Clone)]
struct AppConfig {
    endpoint: String,
}

static CONFIG: Lazy<DependencyKey> = Lazy::new(|| {
    DependencyKey::labeled_value(
        "CONFIG",
        AppConfig {
            endpoint: "https://example.com".to_string(),
        },
    )
});

/// 依赖配置的 API 客户端
struct Api;

impl Api {
    /// 每次调用时从当前作用域读取配置
    fn get_url(&self) -> DependencyResult<String> {
        Ok(get::<AppConfig>(&CONFIG)?.endpoint.clone())
    }
}

impl Injectable for Api {
    fn depends_on() -> Vec<DependencyKey> {
        vec![CONFIG.clone()]
    }

    fn construct() -> DependencyResult<Self> {
        Ok(Self)
    }
}

struct Repository {
    api: Arc<Api>,
}

impl Injectable for Repository {
    fn depends_on() -> Vec<DependencyKey> {
        vec![DependencyKey::class::<Api>()]
    }

    fn construct() -> DependencyResult<Self> {
        Ok(Self {
            api: get(&DependencyKey::class::<Api>())?,
        })
    }
}

#[tokio::test]
async fn test_api_uses_configured_endpoint() {
    let endpoint = run_in_new_scope(|| async {
        let api = resolve::<Api>(&DependencyKey::class::<Api>()).await?;
        api.get_url()
    })
    .await
    .unwrap();

    assert_eq!(endpoint, "https://example.com");
}

#[tokio::test]
async fn test_nested_mock_changes_api_url() {
    let (outer_url, inner_url, reused) = run_in_new_scope(|| async {
        let outer = resolve::<Api>(&DependencyKey::class::<Api>()).await?;

        let (inner, inner_url) = run_in_new_scope(|| async {
            mock(
                &*CONFIG,
                AppConfig {
                    endpoint: "MOCKED".to_string(),
                },
            )?;
            let inner = resolve::<Api>(&DependencyKey::class::<Api>()).await?;
            let url = inner.get_url()?;
            Ok::<_, DependencyError>((inner, url))
        })
        .await?;

        // 外层已解析的 Api 被子作用域复用，外层仍读取原配置
        let reused = Arc::ptr_eq(&outer, &inner);
        Ok::<_, DependencyError>((outer.get_url()?, inner_url, reused))
    })
    .await
    .unwrap();

    assert_eq!(outer_url, "https://example.com");
    assert_eq!(inner_url, "MOCKED");
    assert!(reused);
}

#[tokio::test]
async fn test_mock_before_first_resolution() {
    let endpoint = run_in_new_scope(|| async {
        run_in_new_scope(|| async {
            mock(
                &*CONFIG,
                AppConfig {
                    endpoint: "MOCKED".to_string(),
                },
            )?;
            let api = resolve::<Api>(&DependencyKey::class::<Api>()).await?;
            let repository = resolve::<Repository>(&DependencyKey::class::<Repository>()).await?;
            assert!(Arc::ptr_eq(&api, &repository.api));
            api.get_url()
        })
        .await
    })
    .await
    .unwrap();

    assert_eq!(endpoint, "MOCKED");
}

#[tokio::test]
async fn test_reentering_existing_scope() -> anyhow::Result<()> {
    let scope = ScopeRegistryImpl::root(ContainerConfig::default());

    let first = enter(Arc::clone(&scope), || {
        async { resolve::<Api>(&DependencyKey::class::<Api>()).await }
    })
    .await?;
    let second = enter(Arc::clone(&scope), || {
        async { resolve::<Api>(&DependencyKey::class::<Api>()).await }
    })
    .await?;

    assert!(Arc::ptr_eq(&first, &second));
    assert!(scope.lookup(&CONFIG).is_some());
    Ok(())
}

#[tokio::test]
async fn test_configured_depth_limit() {
    let config = ContainerConfig {
        max_resolution_depth: 1,
        ..ContainerConfig::default()
    };

    let error = run_in_new_scope_with_config(config, || async {
        resolve::<Repository>(&DependencyKey::class::<Repository>()).await
    })
    .await
    .err()
    .unwrap();

    match error {
        DependencyError::MaxDepthExceeded {
            max_depth,
            call_tree,
        } => {
            assert_eq!(max_depth, 1);
            assert_eq!(call_tree, "Repository -> Api");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_sync_scope_accessors() {
    let value = run_in_new_scope_sync(|| {
        di_impl::set("retries", 3_u32)?;
        get::<u32>(&DependencyKey::name("retries"))
    })
    .unwrap();

    assert_eq!(*value, 3);
}

/// 记录解析顺序的解析器
struct RecordingResolver {
    inner: DependencyResolverImpl,
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl DependencyResolver for RecordingResolver {
    async fn resolve(&self, key: &DependencyKey) -> DependencyResult<Instance> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(key.to_string());
        }
        self.inner.resolve(key).await
    }
}

#[tokio::test]
async fn test_custom_resolver_wraps_default() -> anyhow::Result<()> {
    let scope = ScopeRegistryImpl::root(ContainerConfig::default());
    let registry: Arc<dyn ScopeRegistry> = scope.clone();
    let resolver = RecordingResolver {
        inner: DependencyResolverImpl::new(registry, ResolveOptions::default()),
        seen: Mutex::new(Vec::new()),
    };

    let keys = vec![DependencyKey::name("first"), CONFIG.clone()];
    let instances = enter(Arc::clone(&scope), || resolver.resolve_all(&keys)).await?;

    assert_eq!(instances.len(), 2);
    assert_eq!(
        instances[0].downcast_ref::<String>().map(String::as_str),
        Some("first")
    );
    assert_eq!(
        resolver.seen.lock().map(|seen| seen.clone()).unwrap_or_default(),
        vec!["first".to_string(), "CONFIG".to_string()]
    );
    assert!(current_scope().is_err());
    Ok(())
}
