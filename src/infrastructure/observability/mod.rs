//! Observability infrastructure - Tracing and Metrics

mod config;
mod metrics;
mod tracing_setup;

pub use config::{MetricsConfig, ObservabilityConfig, TracingConfig};
pub use metrics::{
    create_metrics_router, init_metrics, record_completion_request, record_http_request,
    record_ingested_chunks, record_pipeline_run, record_pipeline_stage, CompletionMetricParams,
    PrometheusMetrics,
};
pub use tracing_setup::{init_tracing, shutdown_tracing};
