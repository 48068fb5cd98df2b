use actix_web::{error, web, Error, HttpResponse};
use prometheus::{Counter, Encoder, IntCounterVec, Registry, TextEncoder};

use crate::app_state::AppState;

pub struct Metrics {
    pub registry: Registry,
    pub cache_hit_counter: Counter,
    pub cache_miss_counter: Counter,
    pub cache_error_counter: Counter,
    pub upstream_call_counter: IntCounterVec,
    pub upstream_error_counter: IntCounterVec,
}

// Function to add a prefix to the metric names
fn add_prefix(prefix: &str, name: &str) -> String {
    format!("{}_{}", prefix, name)
}

fn register_counter_with_prefix(
    registry: &Registry,
    prefix: &str,
    name: &str,
    description: &str,
) -> prometheus::Result<Counter> {
    let opts = prometheus::Opts::new(add_prefix(prefix, name), description);
    let counter = Counter::with_opts(opts)?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}

fn register_int_counter_vec_with_prefix(
    registry: &Registry,
    prefix: &str,
    name: &str,
    description: &str,
    labels: &[&str],
) -> prometheus::Result<IntCounterVec> {
    let opts = prometheus::Opts::new(add_prefix(prefix, name), description);
    let counter_vec = IntCounterVec::new(opts, labels)?;
    registry.register(Box::new(counter_vec.clone()))?;
    Ok(counter_vec)
}

impl Metrics {
    pub fn new(prefix: &str) -> prometheus::Result<Self> {
        let registry = Registry::new();

        let cache_hit_counter = register_counter_with_prefix(
            &registry,
            prefix,
            "cache_hit_total",
            "Total number of cache hits.",
        )?;
        let cache_miss_counter = register_counter_with_prefix(
            &registry,
            prefix,
            "cache_miss_total",
            "Total number of cache misses.",
        )?;
        let cache_error_counter = register_counter_with_prefix(
            &registry,
            prefix,
            "cache_error_total",
            "Total number of absorbed cache backend errors.",
        )?;
        let upstream_call_counter = register_int_counter_vec_with_prefix(
            &registry,
            prefix,
            "upstream_call_total",
            "Total number of calls made to the upstream rpc endpoint.",
            &["method"],
        )?;
        let upstream_error_counter = register_int_counter_vec_with_prefix(
            &registry,
            prefix,
            "upstream_error_total",
            "Total number of failed upstream calls, by error kind.",
            &["method", "kind"],
        )?;

        Ok(Self {
            registry,
            cache_hit_counter,
            cache_miss_counter,
            cache_error_counter,
            upstream_call_counter,
            upstream_error_counter,
        })
    }
}

#[actix_web::get("/metrics")]
async fn metrics(data: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let encoder = TextEncoder::new();
    let metric_families = data.metrics.registry.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(buffer))
}
