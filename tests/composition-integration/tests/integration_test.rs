//! 组合层集中集成测试
use appkit_common::{AppError, WidgetError};
use appkit_composition::{create_app, App, AppClass, AppOptions, SubscriptionGuard};
use di_abstractions::{Dependencies, ProviderDefinition};
use futures::StreamExt;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 带时钟 provider 的 widget 类
fn clock_widget() -> AppClass {
    create_app(
        AppOptions::named("Clock")
            .with_regions(["header"])
            .with_provider(ProviderDefinition::value("format", String::from("%H:%M")))
            .with_provider(
                ProviderDefinition::factory("label", |deps: &Dependencies| {
                    let format = deps.get::<String>("format").map(|f| f.to_string()).unwrap_or_default();
                    format!("clock({})", format)
                })
                .with_deps(["format"]),
            ),
    )
}

#[test]
fn test_shell_composition() -> anyhow::Result<()> {
    let shell = App::new(
        AppOptions::named("Shell")
            .with_option("theme", json!({ "dark": true }))
            .with_provider(ProviderDefinition::value("locale", String::from("zh-CN"))),
    )?;

    let clock = shell.register_widget(&clock_widget(), AppOptions::new())?;
    let clock_label = clock.get_as::<String>("label")?;
    assert_eq!(clock_label.as_str(), "clock(%H:%M)");

    // widget 的 provider 与父应用相互独立
    assert!(clock.get("locale").is_err());
    assert!(shell.get("label").is_err());
    assert_eq!(shell.get_as::<String>("locale")?.as_str(), "zh-CN");
    assert_eq!(shell.option("theme"), Some(&json!({ "dark": true })));
    Ok(())
}

#[test]
fn test_region_views_follow_registrations() -> anyhow::Result<()> {
    let shell = App::new(AppOptions::named("Shell"))?;
    let header: Arc<Mutex<Vec<Vec<String>>>> = Arc::default();
    let all: Arc<Mutex<Vec<usize>>> = Arc::default();

    let _header = SubscriptionGuard::new({
        let header = header.clone();
        shell.widgets(Some("header")).subscribe(move |widgets| {
            let names = widgets.iter().map(|w| w.name.clone()).collect();
            header.lock().unwrap().push(names);
        })
    });
    let _all = SubscriptionGuard::new({
        let all = all.clone();
        shell
            .widgets(None)
            .subscribe(move |widgets| all.lock().unwrap().push(widgets.len()))
    });

    shell.register_widget(&clock_widget(), AppOptions::new())?;
    shell.register_widget(&create_app(AppOptions::named("Body")), AppOptions::new().with_regions(["main"]))?;
    shell.register_widget(&clock_widget(), AppOptions::named("SecondClock"))?;

    assert_eq!(
        *header.lock().unwrap(),
        vec![
            vec![],
            vec!["Clock".to_string()],
            vec!["Clock".to_string()],
            vec!["Clock".to_string(), "SecondClock".to_string()],
        ]
    );
    assert_eq!(*all.lock().unwrap(), vec![0, 1, 2, 3]);
    Ok(())
}

#[test]
fn test_guard_drop_unsubscribes() -> anyhow::Result<()> {
    let shell = App::new(AppOptions::named("Shell"))?;
    let calls = Arc::new(AtomicUsize::new(0));
    {
        let calls = calls.clone();
        let _guard = SubscriptionGuard::new(shell.widgets(None).subscribe(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(shell.widget_registry().observer_count(), 1);
    }
    assert_eq!(shell.widget_registry().observer_count(), 0);

    shell.register_widget(&clock_widget(), AppOptions::new())?;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_duplicate_and_missing_widgets() -> anyhow::Result<()> {
    let shell = App::new(AppOptions::named("Shell"))?;
    shell.register_widget(&clock_widget(), AppOptions::new())?;

    match shell.register_widget(&clock_widget(), AppOptions::new()) {
        Err(AppError::Widget {
            source: WidgetError::DuplicateWidget { name },
        }) => assert_eq!(name, "Clock"),
        other => panic!("期望重复 widget 错误, 实际: {:?}", other.map(|app| app.name().to_string())),
    }

    let err = shell.instantiate_widget("Calendar").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Widget 错误: No widget found with name 'Calendar'"
    );
    Ok(())
}

#[tokio::test]
async fn test_widget_awaited_from_another_task() -> anyhow::Result<()> {
    let shell = Arc::new(App::new(AppOptions::named("Shell"))?);

    let waiter = tokio::spawn({
        let shell = shell.clone();
        async move {
            let clock = shell.wait_for_widget("Clock").await?;
            clock.get_as::<String>("label").ok()
        }
    });

    tokio::task::yield_now().await;
    shell.register_widget(&clock_widget(), AppOptions::new())?;

    let label = tokio::time::timeout(Duration::from_secs(1), waiter).await??;
    assert_eq!(label.as_deref().map(String::as_str), Some("clock(%H:%M)"));
    Ok(())
}

#[tokio::test]
async fn test_widget_stream_collects_registrations() -> anyhow::Result<()> {
    let shell = App::new(AppOptions::named("Shell"))?;
    let stream = shell.widgets(None).into_stream();

    for name in ["a", "b", "c"] {
        shell.register_widget(&create_app(AppOptions::named(name)), AppOptions::new())?;
    }

    let counts: Vec<usize> = stream.take(4).map(|widgets| widgets.len()).collect().await;
    assert_eq!(counts, vec![0, 1, 2, 3]);
    Ok(())
}
