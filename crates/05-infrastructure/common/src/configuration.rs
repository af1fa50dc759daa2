//! 选项配置节
//!
//! 应用选项中可序列化的部分（`name`、`regions` 以及任意自定义键）
//! 统一存放在 [`ConfigSection`] 中，回调等不可序列化的部分由上层持有。

use crate::errors::ConfigError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// 配置节
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSection {
    /// 配置数据，保持插入顺序
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl ConfigSection {
    /// 创建新的配置节
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 对象创建配置节
    pub fn from_json(value: serde_json::Value) -> Result<Self, ConfigError> {
        match value {
            serde_json::Value::Object(data) => Ok(Self { data }),
            other => Err(ConfigError::TypeConversionError {
                message: format!("配置节必须是 JSON 对象, 实际为: {}", other),
            }),
        }
    }

    /// 插入配置项
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// 获取配置项
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// 是否包含配置项
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// 获取字符串配置项
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(serde_json::Value::as_str)
    }

    /// 将单个配置项绑定到具体类型
    pub fn get_as<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: DeserializeOwned,
    {
        let value = self.get(key).ok_or_else(|| ConfigError::KeyNotFound {
            key: key.to_string(),
        })?;

        serde_json::from_value(value.clone()).map_err(|e| ConfigError::TypeConversionError {
            message: format!("{}: {}", key, e),
        })
    }

    /// 绑定到具体类型
    pub fn bind<T>(&self) -> Result<T, ConfigError>
    where
        T: DeserializeOwned,
    {
        let value = serde_json::Value::Object(self.data.clone());
        serde_json::from_value(value).map_err(|e| ConfigError::SerializationError { source: e })
    }

    /// 以 `overrides` 覆盖当前配置节，覆盖方的键优先
    pub fn merged_with(&self, overrides: &ConfigSection) -> ConfigSection {
        let mut data = self.data.clone();
        for (key, value) in &overrides.data {
            data.insert(key.clone(), value.clone());
        }
        ConfigSection { data }
    }
}
