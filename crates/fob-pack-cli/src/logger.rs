//! Logging setup for the fob-pack CLI.
//!
//! Library events from `fob_pack` (missing files, minifier fallbacks, written
//! bundles) go through the subscriber installed here.
//!
//! ```rust,no_run
//! use fob_pack_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("Packing site");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter for `--verbose`.
pub const VERBOSE_FILTER: &str = "fob_pack=debug,fob_pack_cli=debug";
/// Filter for `--quiet`.
pub const QUIET_FILTER: &str = "fob_pack=error,fob_pack_cli=error";
/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "fob_pack=info,fob_pack_cli=info";

/// Initialize the tracing subscriber.
///
/// Level selection, first match wins:
/// 1. `verbose`: debug for fob-pack crates
/// 2. `quiet`: errors only
/// 3. `RUST_LOG`
/// 4. info for fob-pack crates
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(select_filter(verbose, quiet), no_color);
}

/// Initialize the subscriber with an explicit filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn select_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_wins_over_quiet() {
        let filter = select_filter(true, true).to_string();
        assert!(filter.contains("fob_pack=debug"));
    }

    #[test]
    fn test_quiet_filter() {
        let filter = select_filter(false, true).to_string();
        assert!(filter.contains("fob_pack=error"));
    }
}
