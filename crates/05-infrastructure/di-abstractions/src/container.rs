//! 容器配置与构建器抽象

use crate::provider::ProviderDefinition;
use crate::registry::ProviderRegistry;
use crate::resolver::ResolveOptions;
use appkit_common::DependencyError;
use serde::{Deserialize, Serialize};

/// 容器构建器 trait
pub trait ContainerBuilder: Sized {
    /// 关联的容器类型
    type Container: ProviderRegistry;

    /// 设置容器配置
    fn with_config(self, config: ContainerConfig) -> Self;

    /// 添加 provider 定义
    fn register_provider(self, definition: ProviderDefinition) -> Self;

    /// 批量添加 provider 定义
    fn register_providers<I>(self, definitions: I) -> Self
    where
        I: IntoIterator<Item = ProviderDefinition>,
    {
        definitions
            .into_iter()
            .fold(self, |builder, definition| builder.register_provider(definition))
    }

    /// 构建容器
    fn build(self) -> Result<Self::Container, DependencyError>;
}

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 是否启用循环依赖检测
    pub enable_circular_dependency_detection: bool,
    /// 最大解析深度
    pub max_resolution_depth: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            enable_circular_dependency_detection: true,
            max_resolution_depth: 100,
        }
    }
}

impl ContainerConfig {
    /// 转换为解析选项
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            detect_cycles: self.enable_circular_dependency_detection,
            max_depth: self.max_resolution_depth,
        }
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerStats {
    /// 已注册 provider 数量
    pub registered_providers: usize,
    /// 已解析 provider 数量
    pub resolved_providers: usize,
}
