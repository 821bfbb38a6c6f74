//! Logging setup for the `treepic` binary.
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the binary. Output goes to stderr so stdout stays clean for
//! `--format dot|json|tree`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when neither a flag nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "treepic=info";

/// Filter forced by a verbosity flag, if any. `verbose` wins over `quiet`.
pub fn flag_filter(verbose: bool, quiet: bool) -> Option<&'static str> {
    if verbose {
        Some("treepic=debug")
    } else if quiet {
        Some("treepic=error")
    } else {
        None
    }
}

/// Initialize the global subscriber. Call once, before any logging.
///
/// ```rust,no_run
/// treepic::logger::init_logger(false, false, true);
/// tracing::info!("ready");
/// ```
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = match flag_filter(verbose, quiet) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && std::env::var_os("NO_COLOR").is_none())
        .compact();

    // Ignore a second initialization instead of panicking.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_filter() {
        assert_eq!(flag_filter(true, false), Some("treepic=debug"));
        assert_eq!(flag_filter(true, true), Some("treepic=debug"));
        assert_eq!(flag_filter(false, true), Some("treepic=error"));
        assert_eq!(flag_filter(false, false), None);
    }

    #[test]
    fn test_filters_parse() {
        for directive in ["treepic=debug", "treepic=error", DEFAULT_FILTER] {
            assert!(EnvFilter::try_new(directive).is_ok(), "{directive}");
        }
    }
}
