//! Metrics collection for observability
//!
//! Prometheus collectors for decode activity, kept in a private registry so
//! several readers (and tests) can each own one.
//!
//! # Metrics
//!
//! - `iso_documents_decoded_total` - Documents fully decoded
//! - `iso_entries_streamed_total` - Entries yielded by streaming iterators
//! - `iso_decode_failures_total{kind}` - Failed decodes by error kind
//! - `iso_decode_duration_seconds` - Histogram of full-decode latencies

use crate::Error;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Metrics collector
#[derive(Clone)]
pub struct DecoderMetrics {
    /// Documents fully decoded
    pub documents_decoded: IntCounter,

    /// Entries yielded by streaming
    pub entries_streamed: IntCounter,

    /// Failures by error kind
    pub decode_failures: IntCounterVec,

    /// Full-decode duration histogram
    pub decode_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl DecoderMetrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let documents_decoded = IntCounter::new(
            "iso_documents_decoded_total",
            "Total number of documents fully decoded",
        )?;
        registry.register(Box::new(documents_decoded.clone()))?;

        let entries_streamed = IntCounter::new(
            "iso_entries_streamed_total",
            "Total number of entries yielded by streaming iterators",
        )?;
        registry.register(Box::new(entries_streamed.clone()))?;

        let decode_failures = IntCounterVec::new(
            Opts::new("iso_decode_failures_total", "Failed decodes by error kind"),
            &["kind"],
        )?;
        registry.register(Box::new(decode_failures.clone()))?;

        let decode_duration = Histogram::with_opts(
            HistogramOpts::new(
                "iso_decode_duration_seconds",
                "Histogram of full-decode latencies",
            )
            .buckets(vec![0.001, 0.005, 0.010, 0.050, 0.100, 0.500, 1.0, 5.0, 30.0]),
        )?;
        registry.register(Box::new(decode_duration.clone()))?;

        Ok(Self {
            documents_decoded,
            entries_streamed,
            decode_failures,
            decode_duration,
            registry,
        })
    }

    /// Record a completed full decode
    pub fn record_document(&self, elapsed: Duration) {
        self.documents_decoded.inc();
        self.decode_duration.observe(elapsed.as_secs_f64());
    }

    /// Record a streamed entry
    pub fn record_entry(&self) {
        self.entries_streamed.inc();
    }

    /// Record a failure
    pub fn record_failure(&self, error: &Error) {
        self.decode_failures.with_label_values(&[error.kind()]).inc();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl fmt::Debug for DecoderMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderMetrics")
            .field("documents_decoded", &self.documents_decoded.get())
            .field("entries_streamed", &self.entries_streamed.get())
            .finish_non_exhaustive()
    }
}
