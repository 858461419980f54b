use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use thiserror::Error;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

static METRIC_DESCRIPTIONS: Once = Once::new();

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), TelemetryError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| TelemetryError::Install(err.to_string()))
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "tilebridge_jobs_submitted_total",
            Unit::Count,
            "Total number of render jobs accepted for dispatch."
        );
        describe_counter!(
            "tilebridge_jobs_rejected_total",
            Unit::Count,
            "Total number of submissions rejected synchronously."
        );
        describe_counter!(
            "tilebridge_jobs_completed_total",
            Unit::Count,
            "Total number of render jobs that delivered tile bytes."
        );
        describe_counter!(
            "tilebridge_jobs_failed_total",
            Unit::Count,
            "Total number of render jobs that delivered an error."
        );
        describe_histogram!(
            "tilebridge_render_ms",
            Unit::Milliseconds,
            "Worker-phase render latency in milliseconds."
        );
    });
}
