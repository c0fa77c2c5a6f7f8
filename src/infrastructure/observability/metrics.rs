//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;

const MAX_PATH_LABEL_LEN: usize = 50;

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("grounded_qa_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric. `path` should be the matched route template.
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path_label(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Record one pipeline stage execution (`retrieval` or `generation`)
pub fn record_pipeline_stage(stage: &'static str, success: bool, duration: Duration) {
    let labels = [("stage", stage.to_string()), ("status", status_label(success))];

    counter!("pipeline_stage_total", &labels).increment(1);
    histogram!("pipeline_stage_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Record a finished pipeline run; `outcome` is `success` or an error kind
pub fn record_pipeline_run(outcome: &str, duration: Duration, similarity: Option<f32>) {
    counter!("pipeline_runs_total", "outcome" => outcome.to_string()).increment(1);
    histogram!("pipeline_run_duration_seconds").record(duration.as_secs_f64());

    if let Some(similarity) = similarity {
        histogram!("retrieval_top_similarity").record(similarity as f64);
    }
}

/// Record a completion provider call
pub fn record_completion_request(params: CompletionMetricParams) {
    let labels = [
        ("provider", params.provider.to_string()),
        ("model", params.model.to_string()),
        ("status", status_label(params.success)),
    ];

    counter!("completion_requests_total", &labels).increment(1);
    histogram!("completion_request_duration_seconds", &labels)
        .record(params.duration.as_secs_f64());

    if let Some(tokens) = params.input_tokens {
        counter!("completion_input_tokens_total", &labels).increment(tokens);
    }

    if let Some(tokens) = params.output_tokens {
        counter!("completion_output_tokens_total", &labels).increment(tokens);
    }
}

/// Parameters for completion request metrics
pub struct CompletionMetricParams<'a> {
    pub provider: &'a str,
    pub model: &'a str,
    pub duration: Duration,
    pub success: bool,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
}

/// Record vectors written by an ingestion batch
pub fn record_ingested_chunks(source: &str, upserted: usize) {
    counter!("ingested_chunks_total", "source" => source.to_string()).increment(upserted as u64);
}

fn status_label(success: bool) -> String {
    if success { "success" } else { "error" }.to_string()
}

fn path_label(path: &str) -> String {
    path.chars().take(MAX_PATH_LABEL_LEN).collect()
}
