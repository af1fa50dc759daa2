//! # AppKit 组合层
//!
//! 把 provider 容器、生命周期钩子和 widget 注册表组合成可嵌套的应用实例。
//!
//! ## 主要功能
//!
//! - **应用实例**: 名称必填，拥有独立的 provider 容器
//! - **Widget 注册**: 把其他应用类注册为 widget，按名称查询或按需重新实例化
//! - **响应式视图**: 订阅已注册 widget 的快照流，或等待某个 widget 可用
//!
//! ## 基本使用
//!
//! ```rust
//! use appkit_composition::{create_app, AppOptions};
//! use di_abstractions::ProviderDefinition;
//!
//! # fn main() -> Result<(), appkit_common::AppError> {
//! let root = create_app(AppOptions::named("Root")).instantiate(AppOptions::new())?;
//!
//! let widget = create_app(
//!     AppOptions::named("Clock").with_provider(ProviderDefinition::value("format", "%H:%M")),
//! );
//! root.register_widget(&widget, AppOptions::new().with_regions(["sidebar"]))?;
//!
//! let clock = root.widget_instance("Clock").expect("已注册");
//! let format = clock.get_as::<&'static str>("format")?;
//! assert_eq!(*format, "%H:%M");
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod logging;
pub mod options;
pub mod reactive;
pub mod stream;
pub mod widgets;

#[cfg(test)]
mod tests;

// 重新导出主要类型
pub use app::{create_app, App, AppClass};
pub use logging::{init_logging, LoggingConfig};
pub use options::{AppOptions, NAME_KEY, REGIONS_KEY};
pub use reactive::{Notification, Observable, Sink, Subject, Subscription};
pub use stream::{ObservableStream, SubscriptionGuard};
pub use widgets::{WidgetEntry, WidgetRegistry, WidgetSnapshot};

// 重新导出错误类型
pub use appkit_common::{AppError, AppResult};
