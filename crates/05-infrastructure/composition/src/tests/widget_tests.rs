//! Widget 注册表测试

use crate::{create_app, App, AppError, AppOptions};
use appkit_common::WidgetError;
use chrono::Utc;
use di_abstractions::ProviderDefinition;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn root() -> App {
    App::new(AppOptions::named("Root")).unwrap()
}

#[test]
fn test_register_and_lookup() {
    let root = root();
    let class = create_app(AppOptions::named("Widget1"));

    assert!(!root.has_widget_instance("Widget1"));
    assert!(root.widget_instance("Widget1").is_none());

    let widget = root.register_widget(&class, AppOptions::new()).unwrap();

    assert!(root.has_widget_instance("Widget1"));
    let found = root.widget_instance("Widget1").unwrap();
    assert!(Arc::ptr_eq(&widget, &found));
    assert_eq!(found.name(), "Widget1");
}

#[test]
fn test_registered_name_comes_from_overrides() {
    let root = root();
    let class = create_app(AppOptions::named("Widget1"));

    root.register_widget(&class, AppOptions::named("WidgetOne").with_regions(["sidebar"]))
        .unwrap();

    assert!(root.has_widget_instance("WidgetOne"));
    assert!(!root.has_widget_instance("Widget1"));
    let entry = root.widget_registry().entry("WidgetOne").unwrap();
    assert_eq!(entry.regions, vec!["sidebar"]);
}

#[test]
fn test_entry_records_registration_time() {
    let root = root();
    let before = Utc::now();
    root.register_widget(&create_app(AppOptions::named("Timed")), AppOptions::new())
        .unwrap();
    let after = Utc::now();

    let entry = root.widget_registry().entry("Timed").unwrap();
    assert!(entry.registered_at >= before);
    assert!(entry.registered_at <= after);
    assert!(root.widget_registry().entry("Untimed").is_none());
}

#[test]
fn test_duplicate_widget_is_rejected() {
    let initialized = Arc::new(AtomicUsize::new(0));
    let class = {
        let initialized = initialized.clone();
        create_app(AppOptions::named("Widget1").on_initialize(move || {
            initialized.fetch_add(1, Ordering::SeqCst);
        }))
    };

    let root = root();
    root.register_widget(&class, AppOptions::new()).unwrap();
    let err = root.register_widget(&class, AppOptions::new()).unwrap_err();

    assert!(matches!(
        err,
        AppError::Widget {
            source: WidgetError::DuplicateWidget { .. }
        }
    ));
    assert!(err
        .to_string()
        .contains("Widget 'Widget1' has been already registered before"));
    // 重复注册不会创建新实例
    assert_eq!(initialized.load(Ordering::SeqCst), 1);
    assert_eq!(root.widget_names(), vec!["Widget1"]);
}

#[test]
fn test_same_name_under_different_parents() {
    let class = create_app(AppOptions::named("Widget1"));
    let first = root();
    let second = root();

    first.register_widget(&class, AppOptions::new()).unwrap();
    second.register_widget(&class, AppOptions::new()).unwrap();

    assert!(first.has_widget_instance("Widget1"));
    assert!(second.has_widget_instance("Widget1"));
}

#[test]
fn test_widget_without_name_fails() {
    let root = root();
    let err = root
        .register_widget(&create_app(AppOptions::new()), AppOptions::new())
        .unwrap_err();
    assert!(err.to_string().contains("Must provide `name` in options"));
    assert!(root.widget_registry().is_empty());
}

#[test]
fn test_instantiate_widget_creates_fresh_instance() {
    let initialized = Arc::new(AtomicUsize::new(0));
    let class = {
        let initialized = initialized.clone();
        create_app(
            AppOptions::named("Widget1")
                .with_provider(ProviderDefinition::factory("id", |_: &di_abstractions::Dependencies| {
                    uuid::Uuid::new_v4()
                }))
                .on_initialize(move || {
                    initialized.fetch_add(1, Ordering::SeqCst);
                }),
        )
    };

    let root = root();
    let registered = root
        .register_widget(&class, AppOptions::named("WidgetOne").with_option("title", "One"))
        .unwrap();
    let fresh = root.instantiate_widget("WidgetOne").unwrap();

    assert_eq!(initialized.load(Ordering::SeqCst), 2);
    assert_eq!(fresh.name(), "WidgetOne");
    assert_eq!(fresh.option_as::<String>("title").unwrap(), "One");
    assert_ne!(fresh.id(), registered.id());
    assert_ne!(
        *fresh.get_as::<uuid::Uuid>("id").unwrap(),
        *registered.get_as::<uuid::Uuid>("id").unwrap()
    );

    // 新实例不进入注册表
    assert_eq!(root.widget_names(), vec!["WidgetOne"]);
    assert!(Arc::ptr_eq(&root.widget_instance("WidgetOne").unwrap(), &registered));
}

#[test]
fn test_instantiate_unknown_widget_fails() {
    let err = root().instantiate_widget("missing").unwrap_err();
    assert!(matches!(
        err,
        AppError::Widget {
            source: WidgetError::WidgetNotFound { .. }
        }
    ));
    assert!(err.to_string().contains("'missing'"));
}

#[test]
fn test_names_keep_registration_order() {
    let root = root();
    for name in ["c", "a", "b"] {
        root.register_widget(&create_app(AppOptions::named(name)), AppOptions::new())
            .unwrap();
    }
    assert_eq!(root.widget_names(), vec!["c", "a", "b"]);
    assert_eq!(root.widget_registry().len(), 3);
}

#[test]
fn test_nested_widgets() {
    let root = root();
    let panel = root
        .register_widget(&create_app(AppOptions::named("Panel")), AppOptions::new())
        .unwrap();
    panel
        .register_widget(&create_app(AppOptions::named("Button")), AppOptions::new())
        .unwrap();

    assert!(!root.has_widget_instance("Button"));
    assert!(root
        .widget_instance("Panel")
        .unwrap()
        .has_widget_instance("Button"));
}
