use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

use crate::args::GlobalArgs;

/// Install a stderr subscriber. `RUST_LOG` wins over the verbosity flags.
pub fn init(global: &GlobalArgs) {
    let default_level = if global.quiet {
        "off"
    } else {
        match global.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter);

    // A subscriber may already be set when running under a test harness.
    let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
}
