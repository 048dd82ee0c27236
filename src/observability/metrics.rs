use prometheus::{
    Encoder, GaugeVec, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub dispatches_total: IntCounterVec,
    pub dispatch_latency_seconds: HistogramVec,
    pub routing_fallbacks_total: IntCounter,
    pub deliveries_assigned_total: IntCounter,
    pub driver_load: GaugeVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let dispatches_total = IntCounterVec::new(
            Opts::new("dispatches_total", "Total dispatch runs by outcome"),
            &["outcome"],
        )
        .expect("valid dispatches_total metric");

        let dispatch_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "dispatch_latency_seconds",
                "Latency of a dispatch run in seconds",
            ),
            &["outcome"],
        )
        .expect("valid dispatch_latency_seconds metric");

        let routing_fallbacks_total = IntCounter::new(
            "routing_fallbacks_total",
            "Matrix or route requests that degraded to default values",
        )
        .expect("valid routing_fallbacks_total metric");

        let deliveries_assigned_total = IntCounter::new(
            "deliveries_assigned_total",
            "Deliveries handed to a driver across all dispatch runs",
        )
        .expect("valid deliveries_assigned_total metric");

        let driver_load = GaugeVec::new(
            Opts::new("driver_load", "Deliveries on a driver's current route"),
            &["driver_id"],
        )
        .expect("valid driver_load metric");

        registry
            .register(Box::new(dispatches_total.clone()))
            .expect("register dispatches_total");
        registry
            .register(Box::new(dispatch_latency_seconds.clone()))
            .expect("register dispatch_latency_seconds");
        registry
            .register(Box::new(routing_fallbacks_total.clone()))
            .expect("register routing_fallbacks_total");
        registry
            .register(Box::new(deliveries_assigned_total.clone()))
            .expect("register deliveries_assigned_total");
        registry
            .register(Box::new(driver_load.clone()))
            .expect("register driver_load");

        Self {
            registry,
            dispatches_total,
            dispatch_latency_seconds,
            routing_fallbacks_total,
            deliveries_assigned_total,
            driver_load,
        }
    }

    /// Text exposition for whatever surface the embedding application mounts.
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
