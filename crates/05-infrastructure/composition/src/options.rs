//! 应用选项
//!
//! 可序列化的选项（`name`、`regions` 及自定义键）存放在 [`ConfigSection`] 中，
//! provider 定义、生命周期钩子和容器配置单独保存。

use appkit_common::{ConfigError, ConfigResult, ConfigSection, LifecycleHook, LifecycleHooks};
use di_abstractions::{ContainerConfig, ProviderDefinition};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// 名称选项键
pub const NAME_KEY: &str = "name";
/// 区域选项键
pub const REGIONS_KEY: &str = "regions";

/// 应用选项
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    values: ConfigSection,
    providers: Vec<ProviderDefinition>,
    hooks: LifecycleHooks,
    container: Option<ContainerConfig>,
}

impl AppOptions {
    /// 创建空选项
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建只带名称的选项
    pub fn named(name: impl Into<String>) -> Self {
        Self::new().with_name(name)
    }

    /// 从 JSON 对象创建选项（不含回调和 provider）
    pub fn from_json(value: serde_json::Value) -> ConfigResult<Self> {
        Ok(Self {
            values: ConfigSection::from_json(value)?,
            ..Self::default()
        })
    }

    /// 设置名称
    pub fn with_name(self, name: impl Into<String>) -> Self {
        let name: String = name.into();
        self.with_option(NAME_KEY, name)
    }

    /// 设置区域列表
    pub fn with_regions<I, S>(self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let regions: Vec<String> = regions.into_iter().map(Into::into).collect();
        self.with_option(REGIONS_KEY, regions)
    }

    /// 设置任意选项
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    /// 添加 provider 定义
    pub fn with_provider(mut self, definition: ProviderDefinition) -> Self {
        self.providers.push(definition);
        self
    }

    /// 批量添加 provider 定义
    pub fn with_providers<I>(mut self, definitions: I) -> Self
    where
        I: IntoIterator<Item = ProviderDefinition>,
    {
        self.providers.extend(definitions);
        self
    }

    /// 设置容器配置
    pub fn with_container_config(mut self, config: ContainerConfig) -> Self {
        self.container = Some(config);
        self
    }

    /// 设置生命周期钩子
    pub fn with_hook<F>(mut self, hook: LifecycleHook, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.hooks.set(hook, Arc::new(callback));
        self
    }

    /// 设置 `initialize` 钩子
    pub fn on_initialize<F>(self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.with_hook(LifecycleHook::Initialize, callback)
    }

    /// 设置 `before_mount` 钩子
    pub fn on_before_mount<F>(self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.with_hook(LifecycleHook::BeforeMount, callback)
    }

    /// 设置 `after_mount` 钩子
    pub fn on_after_mount<F>(self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.with_hook(LifecycleHook::AfterMount, callback)
    }

    /// 设置 `before_unmount` 钩子
    pub fn on_before_unmount<F>(self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.with_hook(LifecycleHook::BeforeUnmount, callback)
    }

    /// 名称
    pub fn name(&self) -> Option<&str> {
        self.values.get_str(NAME_KEY)
    }

    /// 区域列表，未设置时为空
    pub fn regions(&self) -> ConfigResult<Vec<String>> {
        if !self.values.contains(REGIONS_KEY) {
            return Ok(Vec::new());
        }
        let mut regions: Vec<String> = self.values.get_as(REGIONS_KEY)?;
        let mut seen = std::collections::HashSet::new();
        regions.retain(|region| seen.insert(region.clone()));
        Ok(regions)
    }

    /// 获取选项值
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// 获取并转换选项值
    pub fn get_as<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: DeserializeOwned,
    {
        self.values.get_as(key)
    }

    /// 所有可序列化的选项值
    pub fn values(&self) -> &ConfigSection {
        &self.values
    }

    /// provider 定义
    pub fn providers(&self) -> &[ProviderDefinition] {
        &self.providers
    }

    /// 生命周期钩子
    pub fn hooks(&self) -> &LifecycleHooks {
        &self.hooks
    }

    /// 容器配置，未设置时为默认配置
    pub fn container_config(&self) -> ContainerConfig {
        self.container.clone().unwrap_or_default()
    }

    /// 以 `overrides` 覆盖当前选项
    ///
    /// 值按键覆盖，钩子按类型覆盖；`overrides` 提供了 provider 时整体替换。
    pub fn merged_with(&self, overrides: &AppOptions) -> AppOptions {
        AppOptions {
            values: self.values.merged_with(&overrides.values),
            providers: if overrides.providers.is_empty() {
                self.providers.clone()
            } else {
                overrides.providers.clone()
            },
            hooks: self.hooks.merged_with(&overrides.hooks),
            container: overrides.container.clone().or_else(|| self.container.clone()),
        }
    }
}
