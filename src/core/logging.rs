//! Logging setup and request-scoped logging context.
//!
//! The request id is kept in a tokio task-local so that handlers and the model
//! client can tag their log lines without threading it through every call.

use chrono::Local;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

tokio::task_local! {
    /// Task-local storage for the current request ID.
    pub static REQUEST_ID: String;
}

/// Get the current request ID from context, if set.
///
/// Returns an empty string if no request ID is set.
pub fn get_request_id() -> String {
    REQUEST_ID.try_with(|id| id.clone()).unwrap_or_default()
}

/// Generate a new unique request ID using UUID v4.
pub fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Custom time formatter that uses local timezone (respects TZ environment variable)
struct LocalTime;

impl tracing_subscriber::fmt::time::FormatTime for LocalTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Build the filter string from an optional `RUST_LOG` value.
///
/// HTTP library noise is always suppressed, even when `RUST_LOG` is just
/// `info` or `trace`.
fn filter_directives(rust_log: Option<String>) -> String {
    let base = rust_log.unwrap_or_else(|| "info,machine_translator=debug".to_string());
    format!("{},hyper=warn,hyper::proto=warn,h2=warn,reqwest=warn", base)
}

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG` for filtering and `NO_COLOR` to disable ANSI escapes.
pub fn init_tracing() {
    let filter = EnvFilter::new(filter_directives(std::env::var("RUST_LOG").ok()));
    let no_color = std::env::var("NO_COLOR").is_ok();

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(LocalTime)
                .with_ansi(!no_color),
        )
        .init();
}
