//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义 provider 注册和依赖解析的核心接口。
//!
//! ## 核心接口
//!
//! - [`ProviderDefinition`] - 值 / 工厂 / 类 provider 定义
//! - [`ProviderRegistry`] - provider 注册表接口
//! - [`ResolveContext`] - 解析链与循环依赖检测
//! - [`ContainerBuilder`] - 容器构建器接口

pub mod container;
pub mod provider;
pub mod registry;
pub mod resolver;

pub use container::*;
pub use provider::*;
pub use registry::*;
pub use resolver::*;
