use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::render::{METRIC_BLOCKS_DROPPED, METRIC_BLOCKS_RENDERED};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;
use super::notion::METRIC_NOTION_REQUESTS;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
/// Logs go to stderr so rendered output can be piped from stdout.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
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
            METRIC_BLOCKS_RENDERED,
            Unit::Count,
            "Total number of content blocks rendered into presentation nodes."
        );
        describe_counter!(
            METRIC_BLOCKS_DROPPED,
            Unit::Count,
            "Total number of unsupported content blocks omitted from output."
        );
        describe_counter!(
            METRIC_NOTION_REQUESTS,
            Unit::Count,
            "Total number of requests issued to the Notion API."
        );
    });
}
