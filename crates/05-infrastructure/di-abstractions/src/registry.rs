//! Provider 注册表抽象接口

use crate::container::ContainerStats;
use crate::provider::{Instance, ProviderDefinition};
use appkit_common::DependencyError;
use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

/// Provider 注册表 trait
///
/// 提供 provider 注册、解析和内省的核心接口。解析是惰性的，每个 provider
/// 在注册表生命周期内只解析一次。
pub trait ProviderRegistry: Send + Sync {
    /// 注册 provider 定义
    fn register(&mut self, definition: ProviderDefinition) -> Result<(), DependencyError>;

    /// 解析 provider，未注册时返回 [`DependencyError::ProviderNotFound`]
    fn get(&self, name: &str) -> Result<Instance, DependencyError>;

    /// 解析并转换为具体类型
    fn get_as<T>(&self, name: &str) -> Result<Arc<T>, DependencyError>
    where
        T: Any + Send + Sync,
        Self: Sized,
    {
        self.get(name)?
            .downcast::<T>()
            .map_err(|_| DependencyError::type_mismatch::<T>(name))
    }

    /// 是否注册了指定 provider
    fn has_provider(&self, name: &str) -> bool;

    /// 获取 provider 定义
    fn provider(&self, name: &str) -> Option<&ProviderDefinition>;

    /// 按注册顺序获取所有 provider 定义
    fn providers(&self) -> &[ProviderDefinition];

    /// provider 是否已经解析过
    fn is_resolved(&self, name: &str) -> bool;

    /// 获取统计信息
    fn stats(&self) -> ContainerStats;

    /// 静态验证依赖关系中是否存在循环
    fn validate_dependencies(&self) -> Result<(), DependencyError> {
        let detector = DefaultCircularDependencyDetector;
        let graph = detector.build_dependency_graph(self.providers());
        detector.detect_circular_dependencies(&graph)
    }
}

/// 依赖图节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraphNode {
    /// provider 名称
    pub name: String,
    /// 依赖名称列表
    pub dependencies: Vec<String>,
}

/// 循环依赖检测器
pub trait CircularDependencyDetector: Send + Sync {
    /// 检测循环依赖
    fn detect_circular_dependencies(&self, graph: &[DependencyGraphNode]) -> Result<(), DependencyError>;

    /// 构建依赖图
    fn build_dependency_graph(&self, definitions: &[ProviderDefinition]) -> Vec<DependencyGraphNode>;
}

/// 默认循环依赖检测器
#[derive(Debug, Default)]
pub struct DefaultCircularDependencyDetector;

impl CircularDependencyDetector for DefaultCircularDependencyDetector {
    fn detect_circular_dependencies(&self, graph: &[DependencyGraphNode]) -> Result<(), DependencyError> {
        // 深度优先搜索，path 保存当前路径以便报告完整的依赖链
        let mut visited = HashSet::new();
        let mut path = Vec::new();

        for node in graph {
            if !visited.contains(node.name.as_str()) {
                Self::dfs_check(&node.name, graph, &mut visited, &mut path)?;
            }
        }

        Ok(())
    }

    fn build_dependency_graph(&self, definitions: &[ProviderDefinition]) -> Vec<DependencyGraphNode> {
        definitions
            .iter()
            .map(|definition| DependencyGraphNode {
                name: definition.name.clone(),
                dependencies: definition.deps.clone(),
            })
            .collect()
    }
}

impl DefaultCircularDependencyDetector {
    fn dfs_check<'a>(
        current: &'a str,
        graph: &'a [DependencyGraphNode],
        visited: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
    ) -> Result<(), DependencyError> {
        if let Some(start) = path.iter().position(|name| *name == current) {
            let mut chain: Vec<&str> = path[start..].to_vec();
            chain.push(current);
            return Err(DependencyError::CircularDependency {
                dependency_chain: chain.join(" -> "),
            });
        }

        if visited.contains(current) {
            return Ok(());
        }

        // 未注册的依赖会被注入为空值，不参与检测
        let Some(node) = graph.iter().find(|n| n.name == current) else {
            return Ok(());
        };

        path.push(current);
        for dep in &node.dependencies {
            Self::dfs_check(dep, graph, visited, path)?;
        }
        path.pop();
        visited.insert(current);

        Ok(())
    }
}
