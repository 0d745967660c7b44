//! 依赖描述符
//!
//! 描述符说明一个依赖键如何被构造（类、工厂或普通值）以及构造前需要先解析的依赖。

use crate::key::{DependencyKey, Instance};
use futures::future::{BoxFuture, FutureExt};
use infrastructure_common::{DependencyResult, TypeInfo};
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

/// 依赖构造类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    /// 类，无参构造
    Class,
    /// 工厂，无参调用，可同步或异步
    Factory,
    /// 普通值，解析结果为自身
    Value,
}

/// 依赖描述符
#[derive(Debug, Clone)]
pub struct DependencyDescriptor {
    /// 构造类型
    pub kind: DependencyKind,
    /// 构造前需要按顺序解析的依赖
    pub depends_on: Vec<DependencyKey>,
}

/// 可注入类型 trait
///
/// 构造函数不接收参数，实现者应通过当前作用域自行获取依赖。
pub trait Injectable: Send + Sync + Sized + 'static {
    /// 构造前需要解析的依赖，按顺序解析
    fn depends_on() -> Vec<DependencyKey> {
        Vec::new()
    }

    /// 创建实例
    fn construct() -> DependencyResult<Self>;
}

/// 工厂返回值
///
/// `None` 表示工厂没有产出任何值，解析会以 `UnresolvedUndefined` 失败。
pub trait FactoryOutput: Send + 'static {
    /// 转换为类型擦除的解析结果
    fn into_product(self) -> DependencyResult<Option<Instance>>;
}

impl<T: Send + Sync + 'static> FactoryOutput for Option<T> {
    fn into_product(self) -> DependencyResult<Option<Instance>> {
        Ok(self.map(|value| Arc::new(value) as Instance))
    }
}

impl<T: Send + Sync + 'static> FactoryOutput for DependencyResult<Option<T>> {
    fn into_product(self) -> DependencyResult<Option<Instance>> {
        self.map(|value| value.map(|value| Arc::new(value) as Instance))
    }
}

/// 工厂调用返回的 future
pub type FactoryFuture = BoxFuture<'static, DependencyResult<Option<Instance>>>;

type FactoryFn = Arc<dyn Fn() -> FactoryFuture + Send + Sync>;

/// 类键
///
/// 依赖列表在解析时才计算，因此互相引用的类型可以被表达（并被检测为循环依赖）。
#[derive(Clone)]
pub struct ClassKey {
    type_info: TypeInfo,
    depends_on: fn() -> Vec<DependencyKey>,
    construct: fn() -> DependencyResult<Instance>,
}

impl ClassKey {
    /// 为可注入类型创建类键
    pub fn of<T: Injectable>() -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            depends_on: T::depends_on,
            construct: construct_erased::<T>,
        }
    }

    /// 类型信息
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// 依赖列表
    pub fn depends_on(&self) -> Vec<DependencyKey> {
        (self.depends_on)()
    }

    /// 无参构造实例
    pub fn instantiate(&self) -> DependencyResult<Instance> {
        (self.construct)()
    }
}

fn construct_erased<T: Injectable>() -> DependencyResult<Instance> {
    T::construct().map(|value| Arc::new(value) as Instance)
}

/// 工厂键
#[derive(Clone)]
pub struct FactoryKey {
    id: Uuid,
    name: Arc<str>,
    depends_on: Arc<[DependencyKey]>,
    invoke: FactoryFn,
}

impl FactoryKey {
    /// 唯一标识
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 工厂名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 依赖列表
    pub fn depends_on(&self) -> &[DependencyKey] {
        &self.depends_on
    }

    /// 调用工厂
    pub fn invoke(&self) -> FactoryFuture {
        (self.invoke)()
    }
}

impl DependencyKey {
    /// 创建类键
    pub fn class<T: Injectable>() -> Self {
        Self::Class(ClassKey::of::<T>())
    }

    /// 创建异步工厂键
    pub fn factory<F, Fut, O>(
        name: impl Into<Arc<str>>,
        depends_on: impl IntoIterator<Item = DependencyKey>,
        factory: F,
    ) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = O> + Send + 'static,
        O: FactoryOutput,
    {
        let invoke: FactoryFn = Arc::new(move || {
            let pending = factory();
            async move { pending.await.into_product() }.boxed()
        });
        Self::new_factory(name.into(), depends_on, invoke)
    }

    /// 创建同步工厂键
    pub fn sync_factory<F, O>(
        name: impl Into<Arc<str>>,
        depends_on: impl IntoIterator<Item = DependencyKey>,
        factory: F,
    ) -> Self
    where
        F: Fn() -> O + Send + Sync + 'static,
        O: FactoryOutput,
    {
        let invoke: FactoryFn =
            Arc::new(move || futures::future::ready(factory().into_product()).boxed());
        Self::new_factory(name.into(), depends_on, invoke)
    }

    fn new_factory(
        name: Arc<str>,
        depends_on: impl IntoIterator<Item = DependencyKey>,
        invoke: FactoryFn,
    ) -> Self {
        Self::Factory(FactoryKey {
            id: Uuid::new_v4(),
            name,
            depends_on: depends_on.into_iter().collect(),
            invoke,
        })
    }

    /// 查询描述符，字符串键和符号键没有描述符
    pub fn descriptor(&self) -> Option<DependencyDescriptor> {
        match self {
            Self::Class(class) => Some(DependencyDescriptor {
                kind: DependencyKind::Class,
                depends_on: class.depends_on(),
            }),
            Self::Factory(factory) => Some(DependencyDescriptor {
                kind: DependencyKind::Factory,
                depends_on: factory.depends_on().to_vec(),
            }),
            Self::Value(_) => Some(DependencyDescriptor {
                kind: DependencyKind::Value,
                depends_on: Vec::new(),
            }),
            Self::Name(_) | Self::Symbol(_) => None,
        }
    }

    /// 构造类型
    pub fn kind(&self) -> Option<DependencyKind> {
        self.descriptor().map(|descriptor| descriptor.kind)
    }
}
