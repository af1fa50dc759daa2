//! Provider 定义
//!
//! 一个 provider 由名称、种类（值 / 工厂 / 类）和有序的依赖名称列表组成。

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 已解析的实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 工厂函数类型
pub type FactoryFn = Arc<dyn Fn(&Dependencies) -> Instance + Send + Sync>;

/// 可注入组件 trait
///
/// 作为 class provider 注册的类型通过依赖集合构造自身。
pub trait Injectable: Send + Sync + 'static {
    /// 使用依赖集合构建实例
    fn inject(deps: &Dependencies) -> Self
    where
        Self: Sized;
}

/// Provider 种类
#[derive(Clone)]
pub enum ProviderKind {
    /// 直接值，原样返回
    Value(Instance),
    /// 工厂，首次解析时调用一次
    Factory(FactoryFn),
    /// 类，首次解析时通过 [`Injectable::inject`] 构造一次
    Class {
        type_name: &'static str,
        construct: FactoryFn,
    },
}

impl ProviderKind {
    /// 种类名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Value(_) => "useValue",
            Self::Factory(_) => "useFactory",
            Self::Class { .. } => "useClass",
        }
    }
}

impl PartialEq for ProviderKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => Arc::ptr_eq(a, b),
            (Self::Factory(a), Self::Factory(b)) => Arc::ptr_eq(a, b),
            (Self::Class { type_name: a, .. }, Self::Class { type_name: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(_) => f.write_str("Value(<instance>)"),
            Self::Factory(_) => f.write_str("Factory(<function>)"),
            Self::Class { type_name, .. } => write!(f, "Class({})", type_name),
        }
    }
}

/// Provider 定义
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDefinition {
    /// 名称，在同一注册表内唯一
    pub name: String,
    /// 种类及载荷
    pub kind: ProviderKind,
    /// 依赖名称，按声明顺序解析
    pub deps: Vec<String>,
}

impl ProviderDefinition {
    /// 创建值 provider
    pub fn value<T>(name: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self::from_instance(name, Arc::new(value))
    }

    /// 使用已有的共享实例创建值 provider，解析结果与传入实例指向同一对象
    pub fn from_instance(name: impl Into<String>, instance: Instance) -> Self {
        Self {
            name: name.into(),
            kind: ProviderKind::Value(instance),
            deps: Vec::new(),
        }
    }

    /// 创建工厂 provider
    pub fn factory<T, F>(name: impl Into<String>, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Dependencies) -> T + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: ProviderKind::Factory(Arc::new(move |deps| Arc::new(factory(deps)) as Instance)),
            deps: Vec::new(),
        }
    }

    /// 创建类 provider
    pub fn class<T>(name: impl Into<String>) -> Self
    where
        T: Injectable,
    {
        Self {
            name: name.into(),
            kind: ProviderKind::Class {
                type_name: std::any::type_name::<T>(),
                construct: Arc::new(|deps| Arc::new(T::inject(deps)) as Instance),
            },
            deps: Vec::new(),
        }
    }

    /// 设置依赖列表
    pub fn with_deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deps = deps.into_iter().map(Into::into).collect();
        self
    }

    /// 种类名称
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

/// 注入给工厂和类的依赖集合
///
/// 每个声明的依赖都有一项；未注册的依赖值为 `None`。
#[derive(Clone, Default)]
pub struct Dependencies {
    entries: Vec<(String, Option<Instance>)>,
}

impl Dependencies {
    /// 创建空依赖集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入依赖项
    pub fn insert(&mut self, name: impl Into<String>, instance: Option<Instance>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = instance,
            None => self.entries.push((name, instance)),
        }
    }

    /// 获取未类型化的依赖实例
    pub fn get_any(&self, name: &str) -> Option<&Instance> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, instance)| instance.as_ref())
    }

    /// 获取类型化的依赖实例，缺失或类型不符时返回 `None`
    pub fn get<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.get_any(name)
            .and_then(|instance| instance.clone().downcast::<T>().ok())
    }

    /// 依赖是否被声明
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// 依赖是否已解析为实例
    pub fn is_resolved(&self, name: &str) -> bool {
        self.get_any(name).is_some()
    }

    /// 按声明顺序返回依赖名称
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// 声明的依赖数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否没有声明依赖
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|(name, instance)| (name, instance.is_some())),
            )
            .finish()
    }
}
