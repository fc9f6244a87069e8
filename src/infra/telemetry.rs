use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
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
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "larder_search_cache_hit_total",
            Unit::Count,
            "Search lookups served from a fresh cache row."
        );
        describe_counter!(
            "larder_search_cache_miss_total",
            Unit::Count,
            "Search lookups that went upstream (row absent or stale)."
        );
        describe_counter!(
            "larder_detail_cache_hit_total",
            Unit::Count,
            "Detail ids served from fresh cache rows."
        );
        describe_counter!(
            "larder_detail_cache_miss_total",
            Unit::Count,
            "Detail ids that had to be fetched upstream."
        );
        describe_counter!(
            "larder_detail_gap_fill_total",
            Unit::Count,
            "Batched upstream bulk calls issued to fill detail gaps."
        );
        describe_counter!(
            "larder_cache_pruned_rows_total",
            Unit::Count,
            "Cache rows removed by the prune sweep."
        );
        describe_histogram!(
            "larder_upstream_request_ms",
            Unit::Milliseconds,
            "Upstream recipe API request latency in milliseconds."
        );
    });
}
