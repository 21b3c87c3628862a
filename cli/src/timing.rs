//! Tracing setup for the CLI.
//!
//! Library crates log through `log`; the fmt subscriber picks those records
//! up next to the CLI's own `tracing` events. With `--timing`, every span
//! opened by an `#[instrument]`ed command is reported with its duration when
//! it closes (`FmtSpan::CLOSE`).

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Default level when `RUST_LOG` is not set.
fn default_level(verbose: bool, timing: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else if timing {
        // Span close events are emitted at INFO.
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    }
}

/// Installs the global subscriber writing to stderr.
pub fn init_tracing(verbose: bool, timing: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level(verbose, timing).into())
        .from_env_lossy();

    let span_events = if timing {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(verbose)
                .with_span_events(span_events)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
    if let Err(e) = installed {
        log::debug!("tracing already initialised: {e}");
    }
}
