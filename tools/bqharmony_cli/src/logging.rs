//! Logging setup for the CLI

use std::io::IsTerminal;
use std::sync::Once;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

static LOG_ENV_VAR: &str = "BQHARMONY_LOG";

/// Initializes a stderr tracing subscriber filtered by `BQHARMONY_LOG` (default `info`).
pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let directives = std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| "info".to_string());
        let env_filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .parse_lossy(&directives);

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .init();
    });
}
