use cfg_if::cfg_if;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// RUST_LOG, or `info` when unset or unparsable
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        /// Route tracing to the browser console
        pub fn init() {
            let wasm_layer = tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default());

            let _ = tracing_subscriber::registry()
                .with(env_filter())
                .with(wasm_layer)
                .try_init();

            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();
        }
    } else {
        use std::ffi::OsStr;
        use std::path::Path;

        use once_cell::sync::OnceCell;
        use tracing_appender::non_blocking::WorkerGuard;
        use tracing_subscriber::fmt;

        const DEFAULT_LOG_FILE: &str = "logs/sprite-loop.log";

        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        /// Log to stderr and to a daily-rolling file (RUST_LOG_FILE)
        pub fn init() {
            let log_path = std::env::var("RUST_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
            let log_path = Path::new(&log_path);
            let dir = log_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let file_name = log_path.file_name().unwrap_or(OsStr::new("sprite-loop.log"));

            let (file_writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file_name));
            let _ = FILE_GUARD.set(guard);

            let console_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true)
                .compact();
            let file_layer = fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .compact();

            let _ = tracing_subscriber::registry()
                .with(env_filter())
                .with(console_layer)
                .with(file_layer)
                .try_init();

            std::panic::set_hook(Box::new(|info| {
                let location = info
                    .location()
                    .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
                    .unwrap_or_else(|| "<unknown>".to_string());
                let payload = info.payload();
                let message = payload
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                    .unwrap_or("<non-string panic>");
                let backtrace = std::backtrace::Backtrace::force_capture();
                tracing::error!(%location, "panic: {message}\nBacktrace:\n{backtrace}");
            }));
        }
    }
}
