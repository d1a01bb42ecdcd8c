use {
    crate::Config,
    std::{io::IsTerminal, panic::PanicHookInfo, sync::Once},
    time::macros::format_description,
    tracing::Level,
    tracing_subscriber::{
        EnvFilter,
        Layer,
        Registry,
        fmt::{time::UtcTime, writer::MakeWriterExt as _},
        prelude::*,
        util::{SubscriberInitExt, TryInitError},
    },
};

/// Installs the global tracing subscriber and a panic hook that logs panics
/// through it. Fails if a global subscriber is already set.
pub fn initialize(config: &Config) -> Result<(), TryInitError> {
    set_tracing_subscriber(config)?;
    std::panic::set_hook(Box::new(tracing_panic_hook));
    Ok(())
}

/// Like [`initialize`], but can be called multiple times in a row. Later calls
/// are ignored.
///
/// Useful for tests.
pub fn initialize_reentrant(env_filter: &str) {
    // The subscriber is a global object so a second initialization in the same
    // process would fail.
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let config = Config::default()
            .with_env_filter(env_filter)
            .with_stderr_threshold(Level::ERROR);
        if set_tracing_subscriber(&config).is_ok() {
            std::panic::set_hook(Box::new(tracing_panic_hook));
        }
    });
}

fn set_tracing_subscriber(config: &Config) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(fmt_layer(config).with_filter(EnvFilter::new(config.env_filter())))
        .try_init()
}

fn fmt_layer(config: &Config) -> Box<dyn Layer<Registry> + Send + Sync> {
    let stderr_threshold = config.stderr_threshold.unwrap_or(Level::ERROR);
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(
            std::io::stdout
                .with_min_level(stderr_threshold)
                .or_else(std::io::stderr),
        )
        .with_timer(UtcTime::new(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        )));
    if config.use_json_format {
        layer.json().boxed()
    } else {
        layer.with_ansi(std::io::stdout().is_terminal()).boxed()
    }
}

/// Panic hook that prints roughly the same message as the default panic hook
/// but uses tracing:error instead of stderr.
fn tracing_panic_hook(panic: &PanicHookInfo) {
    let thread = std::thread::current();
    let name = thread.name().unwrap_or("<unnamed>");
    let backtrace = std::backtrace::Backtrace::force_capture();
    tracing::error!("thread '{name}' {panic}\nstack backtrace:\n{backtrace}");
}
