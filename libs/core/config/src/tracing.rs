use crate::Environment;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Shape of the log lines written to stdout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// One flattened JSON object per event
    Json,
    /// Multi-line human-readable output with module targets
    Pretty,
}

impl From<&Environment> for LogFormat {
    fn from(environment: &Environment) -> Self {
        if environment.is_production() {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

impl LogFormat {
    /// Directives used when `RUST_LOG` is unset. The driver is noisy at
    /// debug, so it stays a level above the rest.
    pub fn default_directives(self) -> &'static str {
        match self {
            LogFormat::Json => "info,tower_http=info,mongodb=warn",
            LogFormat::Pretty => "debug,tower_http=debug,mongodb=info",
        }
    }
}

/// Install the color-eyre panic and report hooks.
///
/// Reports show the failing location but not the environment section.
/// A second call is a no-op.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Install the global subscriber for `environment`.
///
/// `RUST_LOG` overrides [`LogFormat::default_directives`]. An `ErrorLayer`
/// is always present so eyre reports carry the active span trace. If a
/// subscriber is already installed (typical under `cargo test`) this only
/// logs at debug.
pub fn init_tracing(environment: &Environment) {
    let format = LogFormat::from(environment);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format.default_directives()));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_error::ErrorLayer::default());

    let installed = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_target(false),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init(),
    };

    match installed {
        Ok(()) => info!(?format, ?environment, "tracing subscriber installed"),
        Err(_) => debug!("tracing subscriber already installed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_follows_environment() {
        assert_eq!(LogFormat::from(&Environment::Production), LogFormat::Json);
        assert_eq!(LogFormat::from(&Environment::Development), LogFormat::Pretty);
    }

    #[test]
    fn test_production_quiets_the_driver() {
        let directives = LogFormat::Json.default_directives();
        assert!(directives.starts_with("info"));
        assert!(directives.contains("mongodb=warn"));
        assert!(EnvFilter::try_new(directives).is_ok());
        assert!(EnvFilter::try_new(LogFormat::Pretty.default_directives()).is_ok());
    }

    #[test]
    fn test_second_install_is_tolerated() {
        init_tracing(&Environment::Development);
        init_tracing(&Environment::Production);
    }

    #[test]
    fn test_rust_log_override_is_accepted() {
        temp_env::with_var("RUST_LOG", Some("domain_events=trace,warn"), || {
            init_tracing(&Environment::Production);
        });
    }
}
