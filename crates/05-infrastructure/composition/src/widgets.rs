//! Widget 注册表
//!
//! 保存 widget 名称到 {应用类, 区域, 实例} 的映射，并在每次注册后把完整快照
//! 推送到响应主题中。

use crate::app::{App, AppClass};
use crate::options::AppOptions;
use crate::reactive::{Observable, Subject};
use appkit_common::{AppResult, ConfigError, WidgetError};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Widget 注册信息
#[derive(Debug, Clone)]
pub struct WidgetEntry {
    /// 名称
    pub name: String,
    /// 所属区域
    pub regions: Vec<String>,
    /// 应用类
    pub class: AppClass,
    /// 注册时传入的覆盖选项
    pub overrides: AppOptions,
    /// 已注册的实例
    pub instance: Arc<App>,
    /// 注册时间
    pub registered_at: DateTime<Utc>,
}

impl WidgetEntry {
    fn snapshot(&self) -> WidgetSnapshot {
        WidgetSnapshot {
            name: self.name.clone(),
            regions: self.regions.clone(),
            instance: self.instance.clone(),
        }
    }
}

/// 快照中的单个 widget
#[derive(Clone)]
pub struct WidgetSnapshot {
    /// 名称
    pub name: String,
    /// 所属区域
    pub regions: Vec<String>,
    /// 已注册的实例
    pub instance: Arc<App>,
}

impl WidgetSnapshot {
    /// 是否属于指定区域
    pub fn in_region(&self, region: &str) -> bool {
        self.regions.iter().any(|r| r == region)
    }
}

impl fmt::Debug for WidgetSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetSnapshot")
            .field("name", &self.name)
            .field("regions", &self.regions)
            .field("instance", &self.instance.id())
            .finish()
    }
}

/// Widget 注册表
pub struct WidgetRegistry {
    entries: RwLock<IndexMap<String, WidgetEntry>>,
    subject: Subject<Vec<WidgetSnapshot>>,
}

impl WidgetRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(IndexMap::new()),
            subject: Subject::new(Vec::new()),
        }
    }

    /// 注册 widget
    ///
    /// 名称重复时在实例化之前失败。注册成功后同步通知当前订阅者，
    /// 其他线程同时注册时按加锁顺序依次通知。
    pub fn register(&self, class: &AppClass, overrides: AppOptions) -> AppResult<Arc<App>> {
        let merged = class.defaults().merged_with(&overrides);
        let name = merged.name().ok_or(ConfigError::MissingName)?.to_string();
        let regions = merged.regions()?;

        if self.contains(&name) {
            return Err(WidgetError::DuplicateWidget { name }.into());
        }

        let instance = Arc::new(class.instantiate(overrides.clone())?);

        // 写入和推送在同一把发出锁内完成，保证快照按注册顺序发出
        let _emission = self.subject.hold_emission();
        let registered_at = Utc::now();
        let snapshot = {
            let mut entries = self.entries.write();
            // initialize 钩子中可能已注册同名 widget
            if entries.contains_key(&name) {
                return Err(WidgetError::DuplicateWidget { name }.into());
            }
            entries.insert(
                name.clone(),
                WidgetEntry {
                    name: name.clone(),
                    regions: regions.clone(),
                    class: class.clone(),
                    overrides,
                    instance: instance.clone(),
                    registered_at,
                },
            );
            entries.values().map(WidgetEntry::snapshot).collect::<Vec<_>>()
        };

        info!(
            "注册 widget: {}, 区域: {:?}, 时间: {}",
            name,
            regions,
            registered_at.to_rfc3339()
        );
        self.subject.next(snapshot);
        Ok(instance)
    }

    /// 是否已注册
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// 获取已注册实例
    pub fn instance(&self, name: &str) -> Option<Arc<App>> {
        self.entries.read().get(name).map(|entry| entry.instance.clone())
    }

    /// 获取注册信息
    pub fn entry(&self, name: &str) -> Option<WidgetEntry> {
        self.entries.read().get(name).cloned()
    }

    /// 以已注册 widget 的类和覆盖选项创建新的实例，新实例不会被注册
    pub fn instantiate(&self, name: &str) -> AppResult<App> {
        let (class, overrides) = self
            .entries
            .read()
            .get(name)
            .map(|entry| (entry.class.clone(), entry.overrides.clone()))
            .ok_or_else(|| WidgetError::WidgetNotFound {
                name: name.to_string(),
            })?;

        debug!("按需创建 widget 实例: {}", name);
        class.instantiate(overrides)
    }

    /// 按注册顺序返回名称
    pub fn names(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// 已注册数量
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// 当前快照
    pub fn snapshot(&self) -> Vec<WidgetSnapshot> {
        self.entries
            .read()
            .values()
            .map(WidgetEntry::snapshot)
            .collect()
    }

    /// 快照流
    ///
    /// 订阅时立即收到当前快照，之后每次注册再收到一次；指定区域时只包含该区域的 widget。
    pub fn observe(&self, region: Option<&str>) -> Observable<Vec<WidgetSnapshot>> {
        let source = self.subject.as_observable();
        match region {
            None => source,
            Some(region) => {
                let region = region.to_string();
                source.map(move |widgets| {
                    widgets
                        .into_iter()
                        .filter(|widget| widget.in_region(&region))
                        .collect()
                })
            }
        }
    }

    /// 指定 widget 可用时发出一次并结束
    pub fn once_available(&self, name: &str) -> Observable<Arc<App>> {
        let name = name.to_string();
        self.subject
            .as_observable()
            .filter_map(move |widgets| {
                widgets
                    .into_iter()
                    .find(|widget| widget.name == name)
                    .map(|widget| widget.instance)
            })
            .first()
    }

    /// 当前订阅者数量
    pub fn observer_count(&self) -> usize {
        self.subject.observer_count()
    }
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetRegistry")
            .field("widgets", &self.names())
            .field("subject", &self.subject)
            .finish()
    }
}
