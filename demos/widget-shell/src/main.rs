//! # Widget Shell 示例
//!
//! 演示应用实例、provider 解析、widget 注册和区域视图的组合使用

use appkit_composition::{create_app, init_logging, App, AppClass, AppOptions, LoggingConfig, SubscriptionGuard};
use clap::Parser;
use di_abstractions::{Dependencies, Injectable, ProviderDefinition};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "widget-shell")]
#[command(about = "AppKit widget 组合示例")]
struct Args {
    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 使用 JSON 日志
    #[arg(long)]
    json: bool,

    /// 要监听的区域
    #[arg(long, default_value = "sidebar")]
    region: String,
}

#[derive(Debug, Deserialize)]
struct Theme {
    accent: String,
}

/// 根据用户名生成问候语的服务
#[derive(Debug)]
struct Greeter {
    user: Option<Arc<String>>,
}

impl Injectable for Greeter {
    fn inject(deps: &Dependencies) -> Self {
        Self {
            user: deps.get::<String>("user"),
        }
    }
}

impl Greeter {
    fn greet(&self) -> String {
        match &self.user {
            Some(user) => format!("你好, {}", user),
            None => "你好".to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let logging = if args.json {
        LoggingConfig::production()
    } else {
        LoggingConfig::development()
    };
    init_logging(&logging.with_level(parse_log_level(&args.log_level)))?;

    info!("启动 widget shell 示例");

    let shell = Arc::new(App::new(
        AppOptions::named("Shell")
            .with_option("theme", json!({ "accent": "teal" }))
            .with_provider(ProviderDefinition::value("user", String::from("alice")))
            .with_provider(ProviderDefinition::class::<Greeter>("greeter").with_deps(["user"]))
            .on_initialize(|| info!("Shell 初始化")),
    )?);

    let theme: Theme = shell.option_as("theme")?;
    let greeter = shell.get_as::<Greeter>("greeter")?;
    info!("主题色: {}, {}", theme.accent, greeter.greet());

    let _region_view = SubscriptionGuard::new({
        let region = args.region.clone();
        shell.widgets(Some(args.region.as_str())).subscribe(move |widgets| {
            let names: Vec<&str> = widgets.iter().map(|w| w.name.as_str()).collect();
            info!("区域 {} 中的 widget: {:?}", region, names);
        })
    });

    let waiter = {
        let shell = shell.clone();
        tokio::spawn(async move {
            match shell.wait_for_widget("Clock").await {
                Some(clock) => info!("Clock 已可用: {}", clock.id()),
                None => warn!("Clock 未能注册"),
            }
        })
    };

    let clock = clock_widget();
    shell.register_widget(&clock, AppOptions::new().with_regions([args.region.as_str()]))?;
    shell.register_widget(
        &create_app(AppOptions::named("Status")),
        AppOptions::new().with_regions(["footer"]),
    )?;

    let mounted = shell.widget_instance("Clock");
    if let Some(clock) = &mounted {
        clock.before_mount();
        clock.after_mount();
        let label = clock.get_as::<String>("label")?;
        info!("时钟标签: {}", label);
    }

    if let Err(e) = shell.register_widget(&clock, AppOptions::new()) {
        warn!("重复注册被拒绝: {}", e);
    }

    let preview = shell.instantiate_widget("Clock")?;
    info!("预览实例: {} ({})", preview.name(), preview.id());

    tokio::time::timeout(Duration::from_secs(1), waiter).await??;

    if let Some(clock) = mounted {
        clock.before_unmount();
    }

    info!("已注册 widget: {:?}", shell.widget_names());
    Ok(())
}

fn clock_widget() -> AppClass {
    create_app(
        AppOptions::named("Clock")
            .with_provider(ProviderDefinition::value("format", String::from("%H:%M:%S")))
            .with_provider(
                ProviderDefinition::factory("label", |deps: &Dependencies| match deps.get::<String>("format") {
                    Some(format) => format!("clock[{}]", format),
                    None => "clock".to_string(),
                })
                .with_deps(["format"]),
            )
            .on_before_mount(|| info!("Clock 即将挂载"))
            .on_after_mount(|| info!("Clock 已挂载"))
            .on_before_unmount(|| info!("Clock 即将卸载")),
    )
}

fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
