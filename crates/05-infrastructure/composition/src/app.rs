//! 应用实例
//!
//! [`App`] 是组合的基本单元：拥有自己的 provider 容器和 widget 注册表，
//! 本身也可以作为 widget 嵌套在另一个应用中。[`AppClass`] 保存一组默认选项，
//! 用于按需创建应用实例。

use crate::options::AppOptions;
use crate::reactive::Observable;
use crate::widgets::{WidgetRegistry, WidgetSnapshot};
use appkit_common::{AppResult, ConfigError, LifecycleHook};
use di_abstractions::{ContainerBuilder, Instance, ProviderDefinition, ProviderRegistry};
use di_impl::ProviderContainer;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// 应用实例
pub struct App {
    id: Uuid,
    name: String,
    options: AppOptions,
    container: ProviderContainer,
    widgets: WidgetRegistry,
}

impl App {
    /// 创建应用实例
    ///
    /// 名称缺失时立即失败；容器构建完成后同步调用 `initialize` 钩子。
    pub fn new(options: AppOptions) -> AppResult<Self> {
        let name = options
            .name()
            .filter(|name| !name.trim().is_empty())
            .ok_or(ConfigError::MissingName)?
            .to_string();

        let container = ProviderContainer::builder()
            .with_config(options.container_config())
            .register_providers(options.providers().iter().cloned())
            .build()?;

        let app = Self {
            id: Uuid::new_v4(),
            name,
            options,
            container,
            widgets: WidgetRegistry::new(),
        };
        info!(
            "创建应用: {} ({}), provider 数量: {}",
            app.name,
            app.id,
            app.container.providers().len()
        );

        app.options.hooks().invoke(LifecycleHook::Initialize);
        Ok(app)
    }

    /// 实例 ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 应用名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 获取选项值
    pub fn option(&self, key: &str) -> Option<&serde_json::Value> {
        self.options.get(key)
    }

    /// 获取并转换选项值
    pub fn option_as<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: DeserializeOwned,
    {
        self.options.get_as(key)
    }

    /// 全部选项
    pub fn options(&self) -> &AppOptions {
        &self.options
    }

    /// 解析 provider
    pub fn get(&self, name: &str) -> AppResult<Instance> {
        Ok(self.container.get(name)?)
    }

    /// 解析 provider 并转换为具体类型
    pub fn get_as<T>(&self, name: &str) -> AppResult<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        Ok(self.container.get_as::<T>(name)?)
    }

    /// 获取 provider 定义（不触发解析）
    pub fn provider(&self, name: &str) -> Option<&ProviderDefinition> {
        self.container.provider(name)
    }

    /// 获取所有 provider 定义
    pub fn providers(&self) -> &[ProviderDefinition] {
        self.container.providers()
    }

    /// 获取 provider 容器
    pub fn container(&self) -> &ProviderContainer {
        &self.container
    }

    /// 挂载之前，由渲染层调用
    pub fn before_mount(&self) {
        self.options.hooks().invoke(LifecycleHook::BeforeMount);
    }

    /// 挂载之后，由渲染层调用
    pub fn after_mount(&self) {
        self.options.hooks().invoke(LifecycleHook::AfterMount);
    }

    /// 卸载之前，由渲染层调用
    pub fn before_unmount(&self) {
        self.options.hooks().invoke(LifecycleHook::BeforeUnmount);
    }

    /// 注册 widget
    pub fn register_widget(&self, class: &AppClass, overrides: AppOptions) -> AppResult<Arc<App>> {
        self.widgets.register(class, overrides)
    }

    /// 是否已注册指定 widget
    pub fn has_widget_instance(&self, name: &str) -> bool {
        self.widgets.contains(name)
    }

    /// 获取已注册的 widget 实例
    pub fn widget_instance(&self, name: &str) -> Option<Arc<App>> {
        self.widgets.instance(name)
    }

    /// 以已注册 widget 的类和选项创建一个新的、不注册的实例
    pub fn instantiate_widget(&self, name: &str) -> AppResult<App> {
        self.widgets.instantiate(name)
    }

    /// 按注册顺序返回 widget 名称
    pub fn widget_names(&self) -> Vec<String> {
        self.widgets.names()
    }

    /// widget 注册表
    pub fn widget_registry(&self) -> &WidgetRegistry {
        &self.widgets
    }

    /// 已注册 widget 的快照流，可按区域过滤
    pub fn widgets(&self, region: Option<&str>) -> Observable<Vec<WidgetSnapshot>> {
        self.widgets.observe(region)
    }

    /// 指定 widget 可用时发出一次并结束
    pub fn widget_once_available(&self, name: &str) -> Observable<Arc<App>> {
        self.widgets.once_available(name)
    }

    /// 等待指定 widget 注册
    pub async fn wait_for_widget(&self, name: &str) -> Option<Arc<App>> {
        self.widget_once_available(name).first_value().await
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("providers", &self.container.providers().len())
            .field("widgets", &self.widgets.names())
            .finish()
    }
}

/// 应用类：带默认选项的应用构造器
#[derive(Debug, Clone)]
pub struct AppClass {
    defaults: Arc<AppOptions>,
}

impl AppClass {
    /// 以默认选项创建应用类
    pub fn new(defaults: AppOptions) -> Self {
        Self {
            defaults: Arc::new(defaults),
        }
    }

    /// 默认选项
    pub fn defaults(&self) -> &AppOptions {
        &self.defaults
    }

    /// 默认名称
    pub fn name(&self) -> Option<&str> {
        self.defaults.name()
    }

    /// 以 `overrides` 覆盖默认选项后创建实例
    pub fn instantiate(&self, overrides: AppOptions) -> AppResult<App> {
        App::new(self.defaults.merged_with(&overrides))
    }
}

/// 创建应用类
pub fn create_app(options: AppOptions) -> AppClass {
    AppClass::new(options)
}
