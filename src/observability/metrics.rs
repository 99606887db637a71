use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub cache_lookups_total: IntCounterVec,
    pub cache_write_failures_total: IntCounterVec,
    pub nearby_queries_total: IntCounterVec,
    pub delivery_estimates_total: IntCounterVec,
    pub route_stops: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let cache_lookups_total = IntCounterVec::new(
            Opts::new("cache_lookups_total", "Result cache lookups by cache and outcome"),
            &["cache", "outcome"],
        )
        .expect("valid cache_lookups_total metric");

        let cache_write_failures_total = IntCounterVec::new(
            Opts::new(
                "cache_write_failures_total",
                "Result cache writes that failed and were skipped",
            ),
            &["cache"],
        )
        .expect("valid cache_write_failures_total metric");

        let nearby_queries_total = IntCounterVec::new(
            Opts::new("nearby_queries_total", "Proximity queries by location kind"),
            &["kind"],
        )
        .expect("valid nearby_queries_total metric");

        let delivery_estimates_total = IntCounterVec::new(
            Opts::new("delivery_estimates_total", "Delivery estimates by outcome"),
            &["outcome"],
        )
        .expect("valid delivery_estimates_total metric");

        let route_stops = Histogram::with_opts(
            HistogramOpts::new("route_stops", "Number of stops per optimized route")
                .buckets(vec![1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0, 34.0]),
        )
        .expect("valid route_stops metric");

        registry
            .register(Box::new(cache_lookups_total.clone()))
            .expect("register cache_lookups_total");
        registry
            .register(Box::new(cache_write_failures_total.clone()))
            .expect("register cache_write_failures_total");
        registry
            .register(Box::new(nearby_queries_total.clone()))
            .expect("register nearby_queries_total");
        registry
            .register(Box::new(delivery_estimates_total.clone()))
            .expect("register delivery_estimates_total");
        registry
            .register(Box::new(route_stops.clone()))
            .expect("register route_stops");

        Self {
            registry,
            cache_lookups_total,
            cache_write_failures_total,
            nearby_queries_total,
            delivery_estimates_total,
            route_stops,
        }
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
