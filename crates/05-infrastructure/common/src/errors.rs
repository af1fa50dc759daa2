//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Must provide `name` in options")]
    MissingName,

    #[error("配置键不存在: {key}")]
    KeyNotFound { key: String },

    #[error("配置类型转换失败: {message}")]
    TypeConversionError { message: String },

    #[error("配置序列化失败: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("Provider '{name}' 未注册")]
    ProviderNotFound { name: String },

    #[error("Provider 定义无效: {message}")]
    InvalidProvider { message: String },

    #[error("Provider 注册失败: {name}, 原因: {message}")]
    RegistrationError { name: String, message: String },

    #[error("循环依赖检测到: {dependency_chain}")]
    CircularDependency { dependency_chain: String },

    #[error("依赖解析深度超过上限 {max_depth}: {name}")]
    ResolutionDepthExceeded { name: String, max_depth: usize },

    #[error("Provider '{name}' 的实例类型不是 {expected}")]
    TypeMismatch { name: String, expected: String },
}

impl DependencyError {
    /// 创建未注册错误
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::ProviderNotFound { name: name.into() }
    }

    /// 创建类型不匹配错误
    pub fn type_mismatch<T: ?Sized>(name: impl Into<String>) -> Self {
        Self::TypeMismatch {
            name: name.into(),
            expected: std::any::type_name::<T>().to_string(),
        }
    }
}

/// Widget 注册表错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    #[error("Widget '{name}' has been already registered before")]
    DuplicateWidget { name: String },

    #[error("No widget found with name '{name}'")]
    WidgetNotFound { name: String },
}

/// 应用层错误类型
#[derive(Error, Debug)]
pub enum AppError {
    #[error("配置错误: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    Dependency {
        #[from]
        source: DependencyError,
    },

    #[error("Widget 错误: {source}")]
    Widget {
        #[from]
        source: WidgetError,
    },

    #[error("日志初始化失败: {message}")]
    LoggingInitFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type WidgetResult<T> = Result<T, WidgetError>;
pub type AppResult<T> = Result<T, AppError>;
