//! # 作用域容器示例
//!
//! 演示值依赖、类依赖、嵌套作用域中的 mock 以及循环依赖诊断

use anyhow::Context;
use clap::Parser;
use di_abstractions::{DependencyKey, Injectable};
use di_impl::{
    current_scope, get, mock, resolve, run_in_new_scope, run_in_new_scope_with_config,
};
use infrastructure_common::{init_logging, ContainerConfig, DependencyResult, LoggingConfig};
use once_cell::sync::Lazy;
use tracing::{info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "scope-demo")]
#[command(about = "作用域依赖注入容器示例")]
struct Args {
    /// 容器配置文件路径，缺省时读取 config/di 和 DI_ 环境变量
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别
    #[arg(long, default_value = "debug")]
    log_level: String,

    /// 输出 JSON 格式日志
    #[arg(long)]
    json: bool,
}

/// 服务配置
#[derive(Debug)]
struct ServiceConfig {
    url: String,
}

static CONFIG: Lazy<DependencyKey> = Lazy::new(|| {
    DependencyKey::labeled_value(
        "config",
        ServiceConfig {
            url: "https://example.com".to_string(),
        },
    )
});

/// 读取配置的 API
struct Api;

impl Api {
    /// 调用时从当前作用域读取配置
    fn url(&self) -> DependencyResult<String> {
        Ok(get::<ServiceConfig>(&CONFIG)?.url.clone())
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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut logging = if args.json {
        LoggingConfig::production()
    } else {
        LoggingConfig::development()
    };
    logging.level = args
        .log_level
        .parse()
        .with_context(|| format!("无效的日志级别: {}", args.log_level))?;
    init_logging(&logging)?;

    let config = load_config(args.config.as_deref());
    info!(
        "容器配置: 最大解析深度 {}, 记录解析步骤 {}",
        config.max_resolution_depth, config.log_resolution_steps
    );

    // 每个演示使用独立的根作用域
    run_in_new_scope_with_config(config.clone(), demonstrate_resolution).await?;
    run_in_new_scope_with_config(config.clone(), demonstrate_mock).await?;
    run_in_new_scope_with_config(config, demonstrate_cycle).await;

    info!("示例运行完成");
    Ok(())
}

fn load_config(path: Option<&str>) -> ContainerConfig {
    let loaded = match path {
        Some(path) => ContainerConfig::from_file(path),
        None => ContainerConfig::load(),
    };
    loaded.unwrap_or_else(|e| {
        warn!("加载容器配置失败，使用默认配置: {}", e);
        ContainerConfig::default()
    })
}

async fn demonstrate_resolution() -> anyhow::Result<()> {
    let api = resolve::<Api>(&DependencyKey::class::<Api>()).await?;
    info!("Api 地址: {}", api.url()?);

    let scope = current_scope()?;
    info!(
        "作用域 {} 已解析 {} 个依赖",
        scope.info().id,
        scope.resolved_keys().len()
    );
    Ok(())
}

async fn demonstrate_mock() -> anyhow::Result<()> {
    let api = resolve::<Api>(&DependencyKey::class::<Api>()).await?;

    let url = run_in_new_scope(|| async {
        mock(
            &*CONFIG,
            ServiceConfig {
                url: "MOCKED".to_string(),
            },
        )?;
        // 复用外层已解析的 Api，读取的是本作用域的配置
        let nested = resolve::<Api>(&DependencyKey::class::<Api>()).await?;
        let url = nested.url()?;
        Ok::<_, anyhow::Error>(url)
    })
    .await?;

    info!("外层 Api 地址: {}, 嵌套作用域中的 Api 地址: {}", api.url()?, url);
    Ok(())
}

async fn demonstrate_cycle() {
    match resolve::<Left>(&DependencyKey::class::<Left>()).await {
        Ok(_) => warn!("预期的循环依赖没有被检测到"),
        Err(e) => info!("循环依赖诊断: {}", e),
    }
}
