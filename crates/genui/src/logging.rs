//! Logging setup
//!
//! Installs a global `tracing` subscriber from [`LoggingConfig`]. Library
//! code only emits events; hosts that already configure `tracing` can skip
//! this entirely.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Build the filter, falling back to `info` when the directive is invalid
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_new(&config.filter).unwrap_or_else(|err| {
        eprintln!(
            "invalid log filter {:?} ({}), falling back to info",
            config.filter, err
        );
        EnvFilter::new("info")
    })
}

/// Install the global subscriber
///
/// Returns `false` when a subscriber was already installed.
pub fn init(config: &LoggingConfig) -> bool {
    let registry = tracing_subscriber::registry().with(env_filter(config));
    let result = if config.json {
        registry
            .with(fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };
    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_falls_back() {
        let config = LoggingConfig {
            filter: "genui=notalevel".into(),
            json: false,
        };
        assert_eq!(env_filter(&config).to_string(), "info");
    }

    #[test]
    fn test_second_init_is_a_noop() {
        let config = LoggingConfig::default();
        init(&config);
        assert!(!init(&config));
    }
}
