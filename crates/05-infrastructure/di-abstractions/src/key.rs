//! 依赖键
//!
//! 依赖键是作用域内绑定值的不透明标识。字符串键按值比较，
//! 其余变体按创建时分配的标识（`Uuid` 或 `TypeId`）比较。

use crate::descriptor::{ClassKey, FactoryKey};
use infrastructure_common::{DependencyError, DependencyResult};
use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::sync::Arc;
use uuid::Uuid;

/// 类型擦除后的依赖实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 调用链分隔符
pub const CALL_TREE_SEPARATOR: &str = " -> ";

/// 依赖键
#[derive(Clone)]
pub enum DependencyKey {
    /// 字符串键，解析结果为键本身（`String`）
    Name(Arc<str>),
    /// 唯一符号键，解析结果为符号本身
    Symbol(Symbol),
    /// 普通值键，解析结果为包装的值
    Value(ValueKey),
    /// 类键，通过 [`Injectable`](crate::Injectable) 构造
    Class(ClassKey),
    /// 工厂键，调用无参工厂函数构造
    Factory(FactoryKey),
}

impl DependencyKey {
    /// 创建字符串键
    pub fn name(name: impl Into<Arc<str>>) -> Self {
        Self::Name(name.into())
    }

    /// 创建新的唯一符号键
    pub fn symbol(description: impl Into<Arc<str>>) -> Self {
        Self::Symbol(Symbol::new(description))
    }

    /// 创建普通值键，使用值的类型名作为标签
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        let label = infrastructure_common::TypeInfo::of::<T>().short_name();
        Self::labeled_value(label, value)
    }

    /// 创建带标签的普通值键
    pub fn labeled_value<T: Send + Sync + 'static>(label: impl Into<Arc<str>>, value: T) -> Self {
        Self::Value(ValueKey {
            id: Uuid::new_v4(),
            label: label.into(),
            value: Arc::new(value),
        })
    }

    /// 键本身作为解析结果的值（仅适用于没有构造过程的键）
    pub fn own_value(&self) -> Option<Instance> {
        match self {
            Self::Name(name) => Some(Arc::new(name.to_string())),
            Self::Symbol(symbol) => Some(Arc::new(symbol.clone())),
            Self::Value(value) => Some(Arc::clone(&value.value)),
            Self::Class(_) | Self::Factory(_) => None,
        }
    }

    fn identity(&self) -> Identity<'_> {
        match self {
            Self::Name(name) => Identity::Name(name),
            Self::Symbol(symbol) => Identity::Id(symbol.id),
            Self::Value(value) => Identity::Id(value.id),
            Self::Class(class) => Identity::Type(class.type_info().id),
            Self::Factory(factory) => Identity::Id(factory.id()),
        }
    }
}

#[derive(PartialEq, Eq, Hash)]
enum Identity<'a> {
    Name(&'a str),
    Id(Uuid),
    Type(std::any::TypeId),
}

impl PartialEq for DependencyKey {
    fn eq(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other) && self.identity() == other.identity()
    }
}

impl Eq for DependencyKey {}

impl Hash for DependencyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        self.identity().hash(state);
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Symbol(symbol) => write!(f, "{}", symbol),
            Self::Value(value) => f.write_str(&value.label),
            Self::Class(class) => f.write_str(class.type_info().short_name()),
            Self::Factory(factory) => f.write_str(factory.name()),
        }
    }
}

impl fmt::Debug for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Name(_) => "Name",
            Self::Symbol(_) => "Symbol",
            Self::Value(_) => "Value",
            Self::Class(_) => "Class",
            Self::Factory(_) => "Factory",
        };
        f.debug_tuple(kind).field(&self.to_string()).finish()
    }
}

impl From<&'static str> for DependencyKey {
    fn from(name: &'static str) -> Self {
        Self::Name(Arc::from(name))
    }
}

impl From<String> for DependencyKey {
    fn from(name: String) -> Self {
        Self::Name(Arc::from(name))
    }
}

impl From<Symbol> for DependencyKey {
    fn from(symbol: Symbol) -> Self {
        Self::Symbol(symbol)
    }
}

impl From<&DependencyKey> for DependencyKey {
    fn from(key: &DependencyKey) -> Self {
        key.clone()
    }
}

/// 唯一符号
#[derive(Debug, Clone)]
pub struct Symbol {
    id: Uuid,
    description: Arc<str>,
}

impl Symbol {
    /// 创建新符号，每次调用都得到不同的标识
    pub fn new(description: impl Into<Arc<str>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
        }
    }

    /// 符号描述
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description)
    }
}

/// 普通值键
#[derive(Clone)]
pub struct ValueKey {
    id: Uuid,
    label: Arc<str>,
    value: Instance,
}

impl ValueKey {
    /// 值标签
    pub fn label(&self) -> &str {
        &self.label
    }

    /// 包装的值
    pub fn value(&self) -> &Instance {
        &self.value
    }
}

/// 渲染调用链，例如 `A -> B -> A`
pub fn render_call_tree<'a, I>(keys: I) -> String
where
    I: IntoIterator<Item = &'a DependencyKey>,
{
    keys.into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(CALL_TREE_SEPARATOR)
}

/// 将类型擦除的实例转换为具体类型
pub fn downcast_instance<T>(key: &DependencyKey, instance: Instance) -> DependencyResult<Arc<T>>
where
    T: Send + Sync + 'static,
{
    instance
        .downcast::<T>()
        .map_err(|_| DependencyError::TypeMismatch {
            name: key.to_string(),
            expected: std::any::type_name::<T>(),
        })
}
