//! Prometheus metrics definitions for the fraud scoring service
//!
//! All metrics use the `fraud_scorer_` prefix.

use prometheus::{
    CounterVec, Gauge, Histogram, HistogramOpts, IntCounter, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

/// Prometheus metrics for the scoring service
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Predictions by outcome (fraud, safe, rejected)
    pub predictions_total: CounterVec,
    /// Time spent in the scoring pipeline
    pub scoring_latency_seconds: Histogram,
    /// Ledger operations that degraded (record, recent, stats)
    pub ledger_failures_total: CounterVec,
    /// Batches rejected for exceeding the size limit
    pub batch_rejections_total: IntCounter,
    /// Model load status (0=unloaded, 1=ready)
    pub model_loaded: GenericGauge<AtomicF64>,
}

impl Metrics {
    /// Create a new Metrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let predictions_total = CounterVec::new(
            Opts::new("fraud_scorer_predictions_total", "Total predictions by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        let scoring_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "fraud_scorer_scoring_latency_seconds",
                "Scoring pipeline latency in seconds",
            )
            .buckets(vec![
                0.00005, 0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.05,
            ]),
        )?;
        registry.register(Box::new(scoring_latency_seconds.clone()))?;

        let ledger_failures_total = CounterVec::new(
            Opts::new(
                "fraud_scorer_ledger_failures_total",
                "Ledger operations that fell back to their degraded result",
            ),
            &["operation"],
        )?;
        registry.register(Box::new(ledger_failures_total.clone()))?;

        let batch_rejections_total = IntCounter::with_opts(Opts::new(
            "fraud_scorer_batch_rejections_total",
            "Batches rejected for exceeding the size limit",
        ))?;
        registry.register(Box::new(batch_rejections_total.clone()))?;

        let model_loaded = Gauge::with_opts(Opts::new(
            "fraud_scorer_model_loaded",
            "Model load status (0=unloaded, 1=ready)",
        ))?;
        registry.register(Box::new(model_loaded.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            predictions_total,
            scoring_latency_seconds,
            ledger_failures_total,
            batch_rejections_total,
            model_loaded,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn record_prediction(&self, is_fraud: bool, elapsed_secs: f64) {
        let outcome = if is_fraud { "fraud" } else { "safe" };
        self.predictions_total.with_label_values(&[outcome]).inc();
        self.scoring_latency_seconds.observe(elapsed_secs);
    }

    pub fn record_rejection(&self) {
        self.predictions_total.with_label_values(&["rejected"]).inc();
    }

    pub fn record_ledger_failure(&self, operation: &str) {
        self.ledger_failures_total
            .with_label_values(&[operation])
            .inc();
    }

    pub fn set_model_loaded(&self, loaded: bool) {
        self.model_loaded.set(if loaded { 1.0 } else { 0.0 });
    }
}
