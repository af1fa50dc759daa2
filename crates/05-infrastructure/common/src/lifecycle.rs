//! 应用生命周期钩子

use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 生命周期钩子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleHook {
    /// 构造期间同步调用
    Initialize,
    /// 挂载之前
    BeforeMount,
    /// 挂载之后
    AfterMount,
    /// 卸载之前
    BeforeUnmount,
}

impl LifecycleHook {
    /// 选项中的键名
    pub fn option_key(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::BeforeMount => "beforeMount",
            Self::AfterMount => "afterMount",
            Self::BeforeUnmount => "beforeUnmount",
        }
    }
}

/// 无参数的钩子回调
pub type HookFn = Arc<dyn Fn() + Send + Sync>;

/// 生命周期钩子集合
///
/// 每个钩子在每次显式调用时执行一次，本层不做幂等保护。
#[derive(Clone, Default)]
pub struct LifecycleHooks {
    pub initialize: Option<HookFn>,
    pub before_mount: Option<HookFn>,
    pub after_mount: Option<HookFn>,
    pub before_unmount: Option<HookFn>,
}

impl LifecycleHooks {
    /// 创建空的钩子集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置钩子
    pub fn set(&mut self, hook: LifecycleHook, callback: HookFn) {
        *self.slot_mut(hook) = Some(callback);
    }

    /// 获取钩子
    pub fn get(&self, hook: LifecycleHook) -> Option<&HookFn> {
        match hook {
            LifecycleHook::Initialize => self.initialize.as_ref(),
            LifecycleHook::BeforeMount => self.before_mount.as_ref(),
            LifecycleHook::AfterMount => self.after_mount.as_ref(),
            LifecycleHook::BeforeUnmount => self.before_unmount.as_ref(),
        }
    }

    /// 是否配置了钩子
    pub fn has(&self, hook: LifecycleHook) -> bool {
        self.get(hook).is_some()
    }

    /// 调用钩子，未配置时返回 `false`
    pub fn invoke(&self, hook: LifecycleHook) -> bool {
        match self.get(hook) {
            Some(callback) => {
                debug!("调用生命周期钩子: {}", hook.option_key());
                callback();
                true
            }
            None => false,
        }
    }

    /// 以 `overrides` 中已配置的钩子覆盖当前集合
    pub fn merged_with(&self, overrides: &LifecycleHooks) -> LifecycleHooks {
        LifecycleHooks {
            initialize: overrides.initialize.clone().or_else(|| self.initialize.clone()),
            before_mount: overrides.before_mount.clone().or_else(|| self.before_mount.clone()),
            after_mount: overrides.after_mount.clone().or_else(|| self.after_mount.clone()),
            before_unmount: overrides
                .before_unmount
                .clone()
                .or_else(|| self.before_unmount.clone()),
        }
    }

    fn slot_mut(&mut self, hook: LifecycleHook) -> &mut Option<HookFn> {
        match hook {
            LifecycleHook::Initialize => &mut self.initialize,
            LifecycleHook::BeforeMount => &mut self.before_mount,
            LifecycleHook::AfterMount => &mut self.after_mount,
            LifecycleHook::BeforeUnmount => &mut self.before_unmount,
        }
    }
}

impl fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("initialize", &self.initialize.is_some())
            .field("before_mount", &self.before_mount.is_some())
            .field("after_mount", &self.after_mount.is_some())
            .field("before_unmount", &self.before_unmount.is_some())
            .finish()
    }
}
