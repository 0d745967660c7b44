//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

/// 依赖注入错误类型
///
/// 所有错误对解析调用都是终结性的，容器内部不做任何恢复。
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("依赖已注册: {name}")]
    AlreadyRegistered { name: String },

    #[error("检测到循环依赖, 调用链: {call_tree}")]
    CircularDependency { call_tree: String },

    #[error("依赖 {name} 解析结果为空, 调用链: {call_tree}")]
    UnresolvedUndefined { name: String, call_tree: String },

    #[error("依赖未找到: {name}")]
    NotFound { name: String },

    #[error("当前上下文中没有活动的作用域")]
    NoActiveScope,

    #[error("依赖类型不匹配: {name}, 期望类型 {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },

    #[error("解析深度超过上限 {max_depth}, 调用链: {call_tree}")]
    MaxDepthExceeded { max_depth: usize, call_tree: String },
}

impl DependencyError {
    /// 创建未找到错误
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// 创建重复注册错误
    pub fn already_registered(name: impl Into<String>) -> Self {
        Self::AlreadyRegistered { name: name.into() }
    }

    /// 是否为循环依赖错误
    pub fn is_circular(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }

    /// 错误携带的调用链（如果有）
    pub fn call_tree(&self) -> Option<&str> {
        match self {
            Self::CircularDependency { call_tree }
            | Self::UnresolvedUndefined { call_tree, .. }
            | Self::MaxDepthExceeded { call_tree, .. } => Some(call_tree),
            _ => None,
        }
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_tree_accessor() {
        let error = DependencyError::CircularDependency {
            call_tree: "A -> B -> A".to_string(),
        };
        assert!(error.is_circular());
        assert_eq!(error.call_tree(), Some("A -> B -> A"));
        assert!(error.to_string().contains("A -> B -> A"));

        let error = DependencyError::not_found("config");
        assert_eq!(error.call_tree(), None);
        assert_eq!(error.to_string(), "依赖未找到: config");
    }

    #[test]
    fn test_infrastructure_error_conversion() {
        let error: InfrastructureError = DependencyError::NoActiveScope.into();
        assert!(matches!(
            error,
            InfrastructureError::DependencyError {
                source: DependencyError::NoActiveScope
            }
        ));
    }
}
