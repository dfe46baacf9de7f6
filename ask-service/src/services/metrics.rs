//! Prometheus metrics for ask-service.
//!
//! Recording helpers are no-ops until [`init_metrics`] has run, so library
//! code and tests never need a registry.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// Request metrics
pub static ASK_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static ASK_TRIGGER_HITS_TOTAL: OnceLock<IntCounter> = OnceLock::new();
pub static ASK_CONTEXT_LOAD_ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

// Backend metrics
pub static ASK_BACKEND_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static ASK_BACKEND_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static ASK_BACKEND_TOKENS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Call once at startup; later calls are ignored.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if REGISTRY.get().is_some() {
        return Ok(());
    }

    let registry = Registry::new();

    let requests = IntCounterVec::new(
        Opts::new("ask_requests_total", "Total /api/ask requests by outcome"),
        &["outcome"],
    )?;

    let trigger_hits = IntCounter::new(
        "ask_trigger_hits_total",
        "Requests answered from the trigger table",
    )?;

    let context_errors = IntCounterVec::new(
        Opts::new(
            "ask_context_load_errors_total",
            "Context document load failures",
        ),
        &["kind"],
    )?;

    let backend_requests = IntCounterVec::new(
        Opts::new("ask_backend_requests_total", "Total chat backend exchanges"),
        &["model", "status"],
    )?;

    let backend_latency = HistogramVec::new(
        HistogramOpts::new(
            "ask_backend_latency_seconds",
            "Chat backend exchange latency in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["model"],
    )?;

    let backend_tokens = IntCounterVec::new(
        Opts::new("ask_backend_tokens_total", "Tokens reported by the backend"),
        &["model", "type"], // type: input, output
    )?;

    registry.register(Box::new(requests.clone()))?;
    registry.register(Box::new(trigger_hits.clone()))?;
    registry.register(Box::new(context_errors.clone()))?;
    registry.register(Box::new(backend_requests.clone()))?;
    registry.register(Box::new(backend_latency.clone()))?;
    registry.register(Box::new(backend_tokens.clone()))?;

    let _ = REGISTRY.set(registry);
    let _ = ASK_REQUESTS_TOTAL.set(requests);
    let _ = ASK_TRIGGER_HITS_TOTAL.set(trigger_hits);
    let _ = ASK_CONTEXT_LOAD_ERRORS_TOTAL.set(context_errors);
    let _ = ASK_BACKEND_REQUESTS_TOTAL.set(backend_requests);
    let _ = ASK_BACKEND_LATENCY_SECONDS.set(backend_latency);
    let _ = ASK_BACKEND_TOKENS_TOTAL.set(backend_tokens);

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => return "# Metrics registry not initialized\n".to_string(),
    };

    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
        format!("# Failed to convert metrics to UTF-8: {}\n", e)
    })
}

/// Record the terminal outcome of an ask request.
pub fn record_ask_outcome(outcome: &str) {
    if let Some(counter) = ASK_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

pub fn record_trigger_hit() {
    if let Some(counter) = ASK_TRIGGER_HITS_TOTAL.get() {
        counter.inc();
    }
}

pub fn record_context_load_error(kind: &str) {
    if let Some(counter) = ASK_CONTEXT_LOAD_ERRORS_TOTAL.get() {
        counter.with_label_values(&[kind]).inc();
    }
}

/// Record one backend exchange; `status` is a finish reason or error kind.
pub fn record_backend_exchange(model: &str, status: &str, duration_secs: f64) {
    if let Some(counter) = ASK_BACKEND_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[model, status]).inc();
    }
    if let Some(histogram) = ASK_BACKEND_LATENCY_SECONDS.get() {
        histogram.with_label_values(&[model]).observe(duration_secs);
    }
}

pub fn record_tokens(model: &str, input_tokens: u32, output_tokens: u32) {
    if let Some(counter) = ASK_BACKEND_TOKENS_TOTAL.get() {
        counter
            .with_label_values(&[model, "input"])
            .inc_by(u64::from(input_tokens));
        counter
            .with_label_values(&[model, "output"])
            .inc_by(u64::from(output_tokens));
    }
}
