//! Tracing configuration for the `py2js` command.
//!
//! Output format is chosen with `PY2JS_LOG_FORMAT` (`text` or `json`), the
//! filter with `PY2JS_LOG` (falling back to `RUST_LOG`):
//!
//! ```bash
//! PY2JS_LOG=debug py2js src/
//! PY2JS_LOG=py2js_compiler::context=trace PY2JS_LOG_FORMAT=json py2js widget.py
//! ```
//!
//! Nothing is installed unless one of the filter variables is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match std::env::var("PY2JS_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// `PY2JS_LOG` takes precedence over `RUST_LOG` when both are set.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("PY2JS_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Install the global subscriber. All output goes to stderr; stdout carries
/// compiled JavaScript.
pub fn init_tracing() {
    let has_own_log = std::env::var("PY2JS_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_own_log && !has_rust_log {
        return;
    }

    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
