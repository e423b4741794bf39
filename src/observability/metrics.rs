use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub submissions_total: IntCounterVec,
    pub pipeline_latency_seconds: HistogramVec,
    pub records_stored: IntGaugeVec,
    pub provider_requests_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let submissions_total = IntCounterVec::new(
            Opts::new("submissions_total", "Submissions by kind and outcome"),
            &["kind", "outcome"],
        )
        .expect("valid submissions_total metric");

        let pipeline_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "pipeline_latency_seconds",
                "End-to-end matching pipeline latency in seconds",
            ),
            &["kind", "outcome"],
        )
        .expect("valid pipeline_latency_seconds metric");

        let records_stored = IntGaugeVec::new(
            Opts::new("records_stored", "Records currently held per store"),
            &["kind"],
        )
        .expect("valid records_stored metric");

        let provider_requests_total = IntCounterVec::new(
            Opts::new(
                "provider_requests_total",
                "Calls to external geocoding and routing providers",
            ),
            &["provider", "outcome"],
        )
        .expect("valid provider_requests_total metric");

        registry
            .register(Box::new(submissions_total.clone()))
            .expect("register submissions_total");
        registry
            .register(Box::new(pipeline_latency_seconds.clone()))
            .expect("register pipeline_latency_seconds");
        registry
            .register(Box::new(records_stored.clone()))
            .expect("register records_stored");
        registry
            .register(Box::new(provider_requests_total.clone()))
            .expect("register provider_requests_total");

        Self {
            registry,
            submissions_total,
            pipeline_latency_seconds,
            records_stored,
            provider_requests_total,
        }
    }

    pub fn record_provider_call(&self, provider: &str, success: bool) {
        let outcome = if success { "success" } else { "error" };
        self.provider_requests_total
            .with_label_values(&[provider, outcome])
            .inc();
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
