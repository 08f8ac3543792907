// src/logging.rs
//! Настройка `tracing` для бинарника.
//!
//! Библиотека только пишет события; подписчика ставит приложение.
//! `RUST_LOG` имеет приоритет над флагом `verbose`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Фильтр по умолчанию: `info`, или `debug` для нашего крейта при `verbose`
#[must_use]
pub fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("info,landscan=debug")
        } else {
            EnvFilter::new("info")
        }
    })
}

/// Ставит глобальный подписчик. Повторный вызов ничего не делает.
pub fn init_logging(verbose: bool) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_names(true);

    // Ошибка означает, что подписчик уже установлен (например, в тестах)
    let _ = tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(fmt_layer)
        .try_init();
}
