use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static KV_READS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "goldenglass_kv_reads_total",
        "Bucket reads served by the data endpoint",
        &["outcome"]
    )
    .expect("register kv_reads_total")
});

pub static KV_WRITES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "goldenglass_kv_writes_total",
        "Bucket writes accepted by the data endpoint",
        &["outcome"]
    )
    .expect("register kv_writes_total")
});

pub static KV_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "goldenglass_kv_errors_total",
        "Data endpoint failures by kind",
        &["kind"]
    )
    .expect("register kv_errors_total")
});

/// Record a bucket read; `hit` is false when the key was never written.
pub fn record_read(hit: bool) {
    KV_READS_TOTAL
        .with_label_values(&[if hit { "hit" } else { "miss" }])
        .inc();
}

pub fn record_write() {
    KV_WRITES_TOTAL.with_label_values(&["ok"]).inc();
}

/// `kind` is `client` for 4xx and `store` for backend failures.
pub fn record_error(kind: &str) {
    KV_ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

pub fn encode_metrics() -> (u16, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (500, format!("metrics encode error: {e}"));
    }
    (200, String::from_utf8(buffer).unwrap_or_default())
}
