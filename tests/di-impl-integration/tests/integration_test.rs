//! provider 容器集中集成测试
use appkit_common::DependencyError;
use di_abstractions::{
    ContainerBuilder, ContainerConfig, ContainerStats, Dependencies, Injectable, ProviderDefinition,
    ProviderRegistry,
};
use di_impl::ProviderContainer;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

/// 记录构造顺序的日志服务
#[derive(Debug)]
struct ReportService {
    formatter: Option<Arc<String>>,
}

impl Injectable for ReportService {
    fn inject(deps: &Dependencies) -> Self {
        Self {
            formatter: deps.get::<String>("formatter"),
        }
    }
}

#[test]
fn test_dependency_chain_resolves_depth_first() -> anyhow::Result<()> {
    let order = Arc::new(Mutex::new(Vec::new()));

    let container = ProviderContainer::builder()
        .register_provider(ProviderDefinition::class::<ReportService>("report").with_deps(["formatter"]))
        .register_provider(
            ProviderDefinition::factory("formatter", {
                let order = order.clone();
                move |deps: &Dependencies| {
                    order.lock().push("formatter");
                    let prefix = deps.get::<String>("prefix").map(|p| p.to_string()).unwrap_or_default();
                    format!("{}-formatted", prefix)
                }
            })
            .with_deps(["prefix"]),
        )
        .register_provider(ProviderDefinition::value("prefix", String::from("report")))
        .build()?;

    assert_eq!(
        container.stats(),
        ContainerStats {
            registered_providers: 3,
            resolved_providers: 0
        }
    );

    let report = container.get_as::<ReportService>("report")?;
    assert_eq!(report.formatter.as_deref().map(String::as_str), Some("report-formatted"));
    assert!(container.is_resolved("prefix"));
    assert!(container.is_resolved("formatter"));
    assert_eq!(*order.lock(), vec!["formatter"]);

    // 再次解析不会重新调用工厂
    let formatter = container.get_as::<String>("formatter")?;
    assert!(Arc::ptr_eq(&formatter, report.formatter.as_ref().unwrap()));
    assert_eq!(order.lock().len(), 1);
    Ok(())
}

#[test]
fn test_missing_dependency_is_injected_as_none() -> anyhow::Result<()> {
    let container = ProviderContainer::builder()
        .register_provider(ProviderDefinition::class::<ReportService>("report").with_deps(["formatter"]))
        .build()?;

    let report = container.get_as::<ReportService>("report")?;
    assert!(report.formatter.is_none());
    Ok(())
}

#[test]
fn test_definitions_are_unchanged_by_resolution() -> anyhow::Result<()> {
    let definition = ProviderDefinition::factory("answer", |_: &Dependencies| 42_u32).with_deps(["unused"]);
    let container = ProviderContainer::builder()
        .register_provider(definition.clone())
        .build()?;

    assert_eq!(container.provider("answer"), Some(&definition));
    let _ = container.get("answer")?;
    assert_eq!(container.provider("answer"), Some(&definition));
    assert_eq!(container.providers(), &[definition]);
    Ok(())
}

#[test]
fn test_concurrent_get_runs_factory_once() -> anyhow::Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let container = ProviderContainer::builder()
        .register_provider(ProviderDefinition::factory("expensive", {
            let calls = calls.clone();
            move |_: &Dependencies| {
                calls.fetch_add(1, Ordering::SeqCst);
                thread::sleep(std::time::Duration::from_millis(5));
                String::from("ready")
            }
        }))
        .build()?;

    let results: Vec<Arc<String>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| container.get_as::<String>("expensive")))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("线程 panic"))
            .collect::<Result<_, _>>()
    })?;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(results.iter().all(|value| Arc::ptr_eq(value, &results[0])));
    Ok(())
}

#[test]
fn test_cycles_are_reported_with_chain() -> anyhow::Result<()> {
    let container = ProviderContainer::builder()
        .register_provider(ProviderDefinition::factory("a", |_: &Dependencies| 1_u8).with_deps(["b"]))
        .register_provider(ProviderDefinition::factory("b", |_: &Dependencies| 2_u8).with_deps(["a"]))
        .build()?;

    match container.validate_dependencies() {
        Err(DependencyError::CircularDependency { dependency_chain }) => {
            assert!(dependency_chain.contains("a") && dependency_chain.contains("b"));
        }
        other => panic!("期望循环依赖错误, 实际: {:?}", other),
    }

    match container.get("a") {
        Err(DependencyError::CircularDependency { dependency_chain }) => {
            assert_eq!(dependency_chain, "a -> b -> a");
        }
        other => panic!("期望循环依赖错误, 实际: {:?}", other.map(|_| ())),
    }
    assert_eq!(container.stats().resolved_providers, 0);
    Ok(())
}

#[test]
fn test_depth_limit_applies_without_cycle_detection() -> anyhow::Result<()> {
    let container = ProviderContainer::builder()
        .with_config(ContainerConfig {
            enable_circular_dependency_detection: false,
            max_resolution_depth: 16,
        })
        .register_provider(ProviderDefinition::factory("loop", |_: &Dependencies| 0_u8).with_deps(["loop"]))
        .build()?;

    let err = container.get("loop").unwrap_err();
    assert!(matches!(err, DependencyError::ResolutionDepthExceeded { max_depth: 16, .. }));
    Ok(())
}

#[test]
fn test_registration_errors() {
    let duplicate = ProviderContainer::builder()
        .register_provider(ProviderDefinition::value("dup", 1_u8))
        .register_provider(ProviderDefinition::value("dup", 2_u8))
        .build();
    assert!(matches!(duplicate, Err(DependencyError::RegistrationError { .. })));

    let unnamed = ProviderContainer::builder()
        .register_provider(ProviderDefinition::value("", 1_u8))
        .build();
    assert!(matches!(unnamed, Err(DependencyError::InvalidProvider { .. })));
}

#[test]
fn test_type_mismatch_and_not_found() -> anyhow::Result<()> {
    let container = ProviderContainer::builder()
        .register_provider(ProviderDefinition::value("number", 7_i64))
        .build()?;

    assert!(matches!(
        container.get_as::<String>("number"),
        Err(DependencyError::TypeMismatch { .. })
    ));
    assert!(matches!(
        container.get("nothing"),
        Err(DependencyError::ProviderNotFound { .. })
    ));
    assert!(container.has_provider("number"));
    assert!(!container.has_provider("nothing"));
    Ok(())
}
