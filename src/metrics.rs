use log::info;

/// Write-only telemetry sink, values are never read back
pub trait MetricsSink: Send + Sync {
    fn increment_counter(&self, name: &str, by: u64);
    fn set_gauge(&self, name: &str, value: f64);
    fn observe_histogram(&self, name: &str, value: f64);
}

/// Sink writing every update as a log line on the `metrics` target
#[derive(Default)]
pub struct LogMetrics;

impl MetricsSink for LogMetrics {
    fn increment_counter(&self, name: &str, by: u64) {
        info!(target: "metrics", "counter {} += {}", name, by);
    }

    fn set_gauge(&self, name: &str, value: f64) {
        info!(target: "metrics", "gauge {} = {}", name, value);
    }

    fn observe_histogram(&self, name: &str, value: f64) {
        info!(target: "metrics", "histogram {} <- {}", name, value);
    }
}
