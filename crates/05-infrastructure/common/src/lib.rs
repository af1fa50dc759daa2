//! # AppKit Common
//!
//! 这个 crate 提供了 AppKit 各层共享的基础类型。
//!
//! ## 核心组件
//!
//! - [`ConfigSection`] - 基于 JSON 的选项配置节
//! - [`LifecycleHooks`] - 应用生命周期钩子
//! - [`DependencyError`] / [`WidgetError`] / [`AppError`] - 错误分类

pub mod configuration;
pub mod errors;
pub mod lifecycle;

pub use configuration::*;
pub use errors::*;
pub use lifecycle::*;
