//! # 依赖注入具体实现
//!
//! 提供惰性解析、按名称缓存的 provider 容器及其构建器。
//!
//! 解析规则：
//!
//! - 值 provider 原样返回载荷
//! - 工厂 / 类 provider 在首次解析时以依赖集合调用一次，此后返回缓存实例
//! - 声明了但未注册的依赖注入为 `None`；直接解析未注册的名称则返回错误

use appkit_common::DependencyError;
use di_abstractions::{
    ContainerBuilder, ContainerConfig, ContainerStats, Dependencies, Instance, ProviderDefinition,
    ProviderKind, ProviderRegistry, ResolveContext,
};
use parking_lot::{Mutex, ReentrantMutex};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Provider 容器
///
/// provider 定义在构造完成后保持不变，解析出的实例惰性缓存。
pub struct ProviderContainer {
    /// 容器配置
    config: ContainerConfig,
    /// 按注册顺序保存的 provider 定义
    definitions: Vec<ProviderDefinition>,
    /// 名称到定义下标的索引
    index: HashMap<String, usize>,
    /// 已解析实例缓存
    instances: Mutex<HashMap<String, Instance>>,
    /// 解析链，同一时刻只有一个线程在解析
    resolution: ReentrantMutex<RefCell<ResolveContext>>,
}

impl ProviderContainer {
    /// 创建新的容器
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// 使用指定配置创建容器
    pub fn with_config(config: ContainerConfig) -> Self {
        let context = ResolveContext::new(config.resolve_options());
        Self {
            config,
            definitions: Vec::new(),
            index: HashMap::new(),
            instances: Mutex::new(HashMap::new()),
            resolution: ReentrantMutex::new(RefCell::new(context)),
        }
    }

    /// 创建构建器
    pub fn builder() -> ProviderContainerBuilder {
        ProviderContainerBuilder::new()
    }

    /// 获取容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    fn cached(&self, name: &str) -> Option<Instance> {
        self.instances.lock().get(name).cloned()
    }

    fn definition(&self, name: &str) -> Option<&ProviderDefinition> {
        self.index.get(name).map(|&i| &self.definitions[i])
    }

    fn resolve(
        &self,
        definition: &ProviderDefinition,
        context: &RefCell<ResolveContext>,
    ) -> Result<Instance, DependencyError> {
        if let Some(instance) = self.cached(&definition.name) {
            return Ok(instance);
        }

        let guard = ChainGuard::enter(context, &definition.name)?;
        let instance = self.instantiate(definition, context)?;
        drop(guard);

        debug!("解析 provider: {} ({})", definition.name, definition.kind_name());
        self.instances
            .lock()
            .insert(definition.name.clone(), instance.clone());
        Ok(instance)
    }

    fn instantiate(
        &self,
        definition: &ProviderDefinition,
        context: &RefCell<ResolveContext>,
    ) -> Result<Instance, DependencyError> {
        match &definition.kind {
            ProviderKind::Value(value) => Ok(value.clone()),
            ProviderKind::Factory(factory) => {
                let deps = self.resolve_dependencies(definition, context)?;
                Ok(factory(&deps))
            }
            ProviderKind::Class { construct, .. } => {
                let deps = self.resolve_dependencies(definition, context)?;
                Ok(construct(&deps))
            }
        }
    }

    fn resolve_dependencies(
        &self,
        definition: &ProviderDefinition,
        context: &RefCell<ResolveContext>,
    ) -> Result<Dependencies, DependencyError> {
        let mut deps = Dependencies::new();
        for name in &definition.deps {
            match self.definition(name) {
                Some(dependency) => {
                    let instance = self.resolve(dependency, context)?;
                    deps.insert(name.clone(), Some(instance));
                }
                None => {
                    warn!("provider {} 的依赖 {} 未注册，注入空值", definition.name, name);
                    deps.insert(name.clone(), None);
                }
            }
        }
        Ok(deps)
    }
}

impl Default for ProviderContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProviderContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderContainer")
            .field("config", &self.config)
            .field("definitions", &self.definitions)
            .field("resolved", &self.instances.lock().len())
            .finish()
    }
}

impl ProviderRegistry for ProviderContainer {
    fn register(&mut self, definition: ProviderDefinition) -> Result<(), DependencyError> {
        if definition.name.trim().is_empty() {
            return Err(DependencyError::InvalidProvider {
                message: format!("provider 名称不能为空 ({})", definition.kind_name()),
            });
        }
        if self.index.contains_key(&definition.name) {
            return Err(DependencyError::RegistrationError {
                name: definition.name,
                message: "名称已被注册".to_string(),
            });
        }

        debug!(
            "注册 provider: {} ({}), 依赖: {:?}",
            definition.name,
            definition.kind_name(),
            definition.deps
        );
        self.index
            .insert(definition.name.clone(), self.definitions.len());
        self.definitions.push(definition);
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Instance, DependencyError> {
        if let Some(instance) = self.cached(name) {
            return Ok(instance);
        }

        let definition = self
            .definition(name)
            .ok_or_else(|| DependencyError::not_found(name))?;

        let context = self.resolution.lock();
        self.resolve(definition, &context)
    }

    fn has_provider(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn provider(&self, name: &str) -> Option<&ProviderDefinition> {
        self.definition(name)
    }

    fn providers(&self) -> &[ProviderDefinition] {
        &self.definitions
    }

    fn is_resolved(&self, name: &str) -> bool {
        self.instances.lock().contains_key(name)
    }

    fn stats(&self) -> ContainerStats {
        ContainerStats {
            registered_providers: self.definitions.len(),
            resolved_providers: self.instances.lock().len(),
        }
    }
}

/// 解析链守卫，离开作用域时（包括工厂 panic 时）弹出当前名称
struct ChainGuard<'a> {
    context: &'a RefCell<ResolveContext>,
}

impl<'a> ChainGuard<'a> {
    fn enter(context: &'a RefCell<ResolveContext>, name: &str) -> Result<Self, DependencyError> {
        context.borrow_mut().push_name(name)?;
        Ok(Self { context })
    }
}

impl Drop for ChainGuard<'_> {
    fn drop(&mut self) {
        self.context.borrow_mut().pop_name();
    }
}

/// 容器构建器实现
#[derive(Debug, Default)]
pub struct ProviderContainerBuilder {
    config: ContainerConfig,
    definitions: Vec<ProviderDefinition>,
}

impl ProviderContainerBuilder {
    /// 创建构建器
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContainerBuilder for ProviderContainerBuilder {
    type Container = ProviderContainer;

    fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    fn register_provider(mut self, definition: ProviderDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    fn build(self) -> Result<Self::Container, DependencyError> {
        let mut container = ProviderContainer::with_config(self.config);
        for definition in self.definitions {
            container.register(definition)?;
        }

        debug!("构建容器完成，注册了 {} 个 provider", container.definitions.len());
        Ok(container)
    }
}
