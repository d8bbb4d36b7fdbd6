//! Diagnostic logging setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used with `--verbose` when `RUST_LOG` is unset
const VERBOSE_FILTER: &str = "invoice_snap=debug";

/// Filter used otherwise
const QUIET_FILTER: &str = "invoice_snap=warn";

/// Pick the filter directive. `RUST_LOG` wins when set.
fn filter_directive(verbose: bool, rust_log: Option<&str>) -> String {
    match rust_log.filter(|s| !s.trim().is_empty()) {
        Some(directive) => directive.to_string(),
        None if verbose => VERBOSE_FILTER.to_string(),
        None => QUIET_FILTER.to_string(),
    }
}

/// Initialize the global tracing subscriber, writing to stderr so stdout
/// stays clean for results
pub fn init_logging(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = filter_directive(verbose, rust_log.as_deref());
    let env_filter =
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(QUIET_FILTER));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_by_default() {
        assert_eq!(filter_directive(false, None), QUIET_FILTER);
    }

    #[test]
    fn verbose_enables_debug() {
        assert_eq!(filter_directive(true, None), VERBOSE_FILTER);
        assert_eq!(filter_directive(true, Some("  ")), VERBOSE_FILTER);
    }

    #[test]
    fn rust_log_wins() {
        assert_eq!(filter_directive(true, Some("ffmpeg=trace")), "ffmpeg=trace");
    }
}
