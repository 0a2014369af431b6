//! Process lifecycle helpers.
//!
//! Logging setup lives here so the binary and the tests configure it
//! the same way. The subscriber carries the `log` bridge, so the
//! crate's `log::*` calls land in tracing output.

/// Initialize logging with tracing_subscriber. `RUST_LOG` refines the
/// default directives. Safe to call more than once; later calls are
/// ignored.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sqlx=warn".parse().unwrap())
                .add_directive("helicon=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .compact()
        .with_target(false)
        .with_ansi(true)
        .try_init()
        .ok();
}
