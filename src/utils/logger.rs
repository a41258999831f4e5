use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 預設過濾條件：設定檔的 `[logging] filter` 優先，否則依 verbose 決定
pub fn filter_directive(verbose: bool, settings: &LoggingConfig) -> String {
    match settings.filter.as_deref().map(str::trim) {
        Some(filter) if !filter.is_empty() => filter.to_string(),
        _ if verbose => "halo_site=debug,info".to_string(),
        _ => "halo_site=info".to_string(),
    }
}

fn env_filter(verbose: bool, settings: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose, settings)))
}

pub fn init_cli_logger(verbose: bool, settings: &LoggingConfig) {
    tracing_subscriber::registry()
        .with(env_filter(verbose, settings))
        .with(
            fmt::layer()
                .with_target(settings.show_target)
                .with_thread_ids(false)
                .compact(),
        )
        .init();
}

/// JSON 輸出，給收集日誌的託管環境使用
pub fn init_json_logger(verbose: bool, settings: &LoggingConfig) {
    tracing_subscriber::registry()
        .with(env_filter(verbose, settings))
        .with(
            fmt::layer()
                .with_target(settings.show_target)
                .json()
                .with_current_span(false),
        )
        .init();
}
