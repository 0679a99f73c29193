// Logging for scriptpool
//
// A thin layer over the `tracing` ecosystem. The pool emits structured events
// (pool lifecycle, scheduling decisions, invocation outcomes, faults) and
// worker threads inherit the dispatcher that was current when the pool was
// opened, so configuring logging once before `open` covers every thread.
//
// # Usage Examples
//
// ```rust
// use scriptpool::logging;
//
// // INFO level, human-readable console output
// logging::init_default();
//
// // Or pick the settings explicitly
// let config = logging::LogConfig {
//     level: tracing::Level::DEBUG,
//     json_format: false,
//     ..Default::default()
// };
// logging::init(config);
// ```
//
// Macros for the pool's own events:
//
// ```rust
// let span = scriptpool::pool_span!(pool_id, "open");
// let _guard = span.enter();
// scriptpool::log_lifecycle!(pool_id, "opened", max_contexts = 4);
// scriptpool::log_invocation!("completed", results = 3);
// ```

use std::io;
use std::sync::Once;
use tracing::{Level, Subscriber};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Configuration for scriptpool logging
///
/// ```rust
/// use scriptpool::logging::LogConfig;
/// use tracing::Level;
///
/// let config = LogConfig {
///     level: Level::DEBUG,
///     json_format: true,
///     show_file_line: false,
///     show_thread_info: true,
///     show_time: true,
///     target_filters: Some("scriptpool=debug,scriptpool::pool=trace".to_string()),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: Level,
    /// Whether to use JSON format for logs
    pub json_format: bool,
    /// Whether to include file and line information
    pub show_file_line: bool,
    /// Whether to include thread name/id; worker threads are named after the pool prefix
    pub show_thread_info: bool,
    /// Whether to include timestamps
    pub show_time: bool,
    /// Target filter expressions (format: "target=level,target2=level2,...")
    pub target_filters: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_file_line: true,
            show_thread_info: true,
            show_time: true,
            target_filters: None,
        }
    }
}

static INIT: Once = Once::new();

fn env_filter(config: &LogConfig) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env().add_directive(config.level.into());
    if let Some(filters) = &config.target_filters {
        for directive in filters.split(',') {
            match directive.trim().parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(e) => eprintln!("Ignoring invalid log filter {directive:?}: {e}"),
            }
        }
    }
    filter
}

/// Initialize the global subscriber. Only the first call takes effect.
pub fn init(config: LogConfig) {
    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(env_filter(&config));

        let subscriber: Box<dyn Subscriber + Send + Sync> = match (config.json_format, config.show_time) {
            (true, _) => Box::new(registry.with(fmt::layer().json().flatten_event(true))),
            (false, true) => Box::new(registry.with(
                fmt::layer()
                    .with_ansi(atty::is(atty::Stream::Stdout))
                    .with_file(config.show_file_line)
                    .with_line_number(config.show_file_line)
                    .with_thread_names(config.show_thread_info)
                    .with_thread_ids(config.show_thread_info),
            )),
            (false, false) => Box::new(registry.with(
                fmt::layer()
                    .without_time()
                    .with_ansi(atty::is(atty::Stream::Stdout))
                    .with_file(config.show_file_line)
                    .with_line_number(config.show_file_line)
                    .with_thread_names(config.show_thread_info)
                    .with_thread_ids(config.show_thread_info),
            )),
        };

        set_global_subscriber(subscriber);
    });
}

fn set_global_subscriber<S>(subscriber: S)
where
    S: Subscriber + Send + Sync + 'static,
{
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error setting global tracing subscriber: {}", err);
    }
}

/// Open `path` for appending, creating it if needed.
pub fn file_writer(path: &str) -> io::Result<std::fs::File> {
    std::fs::OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize logging to both the console and `log_file`.
///
/// The file is opened up front so a bad path is reported to the caller
/// instead of silently falling back.
pub fn init_with_file(config: LogConfig, log_file: &str) -> io::Result<()> {
    let file = file_writer(log_file)?;
    INIT.call_once(|| {
        let console_layer = fmt::layer()
            .with_ansi(atty::is(atty::Stream::Stdout))
            .with_file(config.show_file_line)
            .with_line_number(config.show_file_line)
            .with_thread_names(config.show_thread_info)
            .with_thread_ids(config.show_thread_info);

        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .with_file(true)
            .with_line_number(true)
            .with_thread_names(true)
            .with_thread_ids(true);

        let subscriber = tracing_subscriber::registry()
            .with(env_filter(&config))
            .with(console_layer)
            .with(file_layer);

        set_global_subscriber(subscriber);
    });
    Ok(())
}

/// INFO level, human-readable console output.
pub fn init_default() {
    init(LogConfig::default());
}

/// DEBUG everywhere, TRACE for the pool internals (context checkout, queueing).
pub fn init_development() {
    init(LogConfig {
        level: Level::DEBUG,
        json_format: false,
        show_file_line: true,
        show_thread_info: true,
        show_time: true,
        target_filters: Some("scriptpool=debug,scriptpool::pool=trace".to_string()),
    });
}

/// JSON output for log aggregation, no file/line information.
pub fn init_production() {
    init(LogConfig {
        level: Level::INFO,
        json_format: true,
        show_file_line: false,
        show_thread_info: true,
        show_time: true,
        target_filters: None,
    });
}

/// Warnings and errors only, compact; for test binaries.
pub fn init_test() {
    init(LogConfig {
        level: Level::WARN,
        json_format: false,
        show_file_line: true,
        show_thread_info: false,
        show_time: false,
        target_filters: None,
    });
}

/// Span covering a pool-level operation.
#[macro_export]
macro_rules! pool_span {
    ($pool_id:expr, $operation:expr) => {
        tracing::info_span!("pool", pool_id = %$pool_id, operation = $operation)
    };
    ($pool_id:expr, $operation:expr, $($fields:tt)*) => {
        tracing::info_span!("pool", pool_id = %$pool_id, operation = $operation, $($fields)*)
    };
}

/// Span covering one invocation on a worker.
#[macro_export]
macro_rules! invocation_span {
    ($invocation_id:expr) => {
        tracing::debug_span!("invocation", invocation_id = %$invocation_id)
    };
    ($invocation_id:expr, $($fields:tt)*) => {
        tracing::debug_span!("invocation", invocation_id = %$invocation_id, $($fields)*)
    };
}

/// Pool lifecycle transitions.
#[macro_export]
macro_rules! log_lifecycle {
    ($pool_id:expr, $event:expr) => {
        tracing::info!(pool_id = %$pool_id, event = $event);
    };
    ($pool_id:expr, $event:expr, $($fields:tt)*) => {
        tracing::info!(pool_id = %$pool_id, event = $event, $($fields)*);
    };
}

/// Outcome of a single invocation.
#[macro_export]
macro_rules! log_invocation {
    ($status:expr) => {
        tracing::debug!(status = $status);
    };
    ($status:expr, $($fields:tt)*) => {
        tracing::debug!(status = $status, $($fields)*);
    };
}

/// Errors, with the error rendered through `Display`.
#[macro_export]
macro_rules! log_error {
    ($error:expr) => {
        tracing::error!(error = %$error);
    };
    ($error:expr, $($fields:tt)*) => {
        tracing::error!(error = %$error, $($fields)*);
    };
}

/// Queueing decisions.
#[macro_export]
macro_rules! log_scheduler {
    ($pool_id:expr, $event:expr) => {
        tracing::debug!(pool_id = %$pool_id, event = $event);
    };
    ($pool_id:expr, $event:expr, $($fields:tt)*) => {
        tracing::debug!(pool_id = %$pool_id, event = $event, $($fields)*);
    };
}

/// The dispatcher current on this thread, for handing to spawned threads.
///
/// ```rust
/// use scriptpool::logging;
/// use std::thread;
///
/// let dispatcher = logging::current_subscriber();
/// thread::spawn(move || {
///     tracing::dispatcher::with_default(&dispatcher, || tracing::info!("worker thread started"));
/// })
/// .join()
/// .unwrap();
/// ```
#[inline]
pub fn current_subscriber() -> tracing::Dispatch {
    tracing::dispatcher::get_default(|d| d.clone())
}

pub use tracing::{debug, error, info, trace, warn};
