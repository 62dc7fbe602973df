// src/metrics/collector.rs
use crate::health::ProbeTarget;
use crate::status::ServiceStatus;
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    /// Text exposition format.
    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

pub struct MetricsCollector {
    pub probes_total: IntCounterVec,
    pub probe_duration_seconds: HistogramVec,
    pub service_status: IntGaugeVec,
    pub transport_failures_total: IntCounter,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let probes_total = IntCounterVec::new(
            Opts::new("pinger_probes_total", "Total number of probes issued"),
            &["service", "outcome"],
        )?;
        registry.register(Box::new(probes_total.clone()))?;

        let probe_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "pinger_probe_duration_seconds",
                "Probe round trip in seconds",
            ),
            &["service"],
        )?;
        registry.register(Box::new(probe_duration_seconds.clone()))?;

        let service_status = IntGaugeVec::new(
            Opts::new(
                "pinger_service_status",
                "Service status (0=unknown, 1=online, 2=offline, 3=error)",
            ),
            &["service"],
        )?;
        registry.register(Box::new(service_status.clone()))?;

        let transport_failures_total = IntCounter::new(
            "pinger_transport_failures_total",
            "Probes that could not complete",
        )?;
        registry.register(Box::new(transport_failures_total.clone()))?;

        for target in ProbeTarget::ALL {
            service_status
                .with_label_values(&[target.name()])
                .set(ServiceStatus::Unknown.gauge_value());
        }

        Ok(Self {
            probes_total,
            probe_duration_seconds,
            service_status,
            transport_failures_total,
        })
    }

    pub fn record_probe(&self, target: ProbeTarget, status: ServiceStatus, duration: Duration) {
        self.probes_total
            .with_label_values(&[target.name(), status.as_str()])
            .inc();

        self.probe_duration_seconds
            .with_label_values(&[target.name()])
            .observe(duration.as_secs_f64());
    }

    pub fn record_transport_failure(&self, target: ProbeTarget, duration: Duration) {
        self.transport_failures_total.inc();
        self.record_probe(target, ServiceStatus::Error, duration);
    }

    pub fn update_service_status(&self, target: ProbeTarget, status: ServiceStatus) {
        self.service_status
            .with_label_values(&[target.name()])
            .set(status.gauge_value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposes_status_gauges_from_the_start() {
        let registry = MetricsRegistry::new().unwrap();
        let text = String::from_utf8(registry.gather().unwrap()).unwrap();

        assert!(text.contains("pinger_service_status{service=\"hello\"} 0"));
        assert!(text.contains("pinger_service_status{service=\"greet\"} 0"));
    }

    #[test]
    fn records_outcomes_per_service() {
        let registry = MetricsRegistry::new().unwrap();
        let metrics = registry.collector();

        metrics.record_probe(
            ProbeTarget::Hello,
            ServiceStatus::Offline,
            Duration::from_millis(12),
        );
        metrics.update_service_status(ProbeTarget::Hello, ServiceStatus::Offline);
        metrics.record_transport_failure(ProbeTarget::Greet, Duration::from_millis(300));

        assert_eq!(
            metrics
                .probes_total
                .with_label_values(&["hello", "offline"])
                .get(),
            1
        );
        assert_eq!(
            metrics
                .service_status
                .with_label_values(&["hello"])
                .get(),
            2
        );
        assert_eq!(metrics.transport_failures_total.get(), 1);
        assert_eq!(
            metrics
                .probes_total
                .with_label_values(&["greet", "error"])
                .get(),
            1
        );
        let greet_latency = metrics.probe_duration_seconds.with_label_values(&["greet"]);
        assert_eq!(greet_latency.get_sample_count(), 1);
        assert!((greet_latency.get_sample_sum() - 0.3).abs() < 1e-9);
    }
}
