//! Diagnostic logging setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::GlobalOpts;

/// Environment variable holding a tracing filter directive
pub const LOG_ENV: &str = "PARTCOST_LOG";

/// Default filter level for the given verbosity flags
pub fn default_level(global: &GlobalOpts) -> &'static str {
    if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    }
}

/// Install a stderr fmt subscriber filtered by `PARTCOST_LOG`
pub fn init(global: &GlobalOpts) {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level(global)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    // A subscriber may already be set when running inside tests
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    fn opts(quiet: bool, verbose: bool) -> GlobalOpts {
        GlobalOpts {
            format: OutputFormat::Auto,
            quiet,
            verbose,
            project: None,
        }
    }

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(&opts(false, false)), "warn");
        assert_eq!(default_level(&opts(true, false)), "error");
        assert_eq!(default_level(&opts(false, true)), "debug");
        assert_eq!(default_level(&opts(true, true)), "debug");
    }
}
