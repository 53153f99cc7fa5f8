//! Prometheus metrics for herakles-log-collector.
//!
//! Gauges and counters are refreshed from the collector's own counters on
//! every scrape rather than incremented on the ingest path. Scrapes are
//! serialized so concurrent scrapers never interleave a refresh.

use herakles_log_collector::Collector;
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};
use std::sync::{Arc, Mutex};

/// Collection of Prometheus metrics exported on `/metrics`.
#[derive(Clone)]
pub struct CollectorMetrics {
    registry: Registry,
    scrape_lock: Arc<Mutex<()>>,

    // ========== Store / Roster Gauges ==========
    pub records_stored: IntGauge,
    pub store_capacity: IntGauge,
    pub clients_connected: IntGauge,
    pub uptime_seconds: Gauge,

    // ========== Ingest Counters ==========
    pub records_appended_total: IntCounter,
    pub messages_framed_total: IntCounter,
    pub control_messages_total: IntCounter,
    pub dropped_messages_total: IntCounter,
    pub buffer_resets_total: IntCounter,
    pub bytes_received_total: IntCounter,
    pub connections_accepted_total: IntCounter,
}

impl CollectorMetrics {
    /// Creates all metrics and registers them with a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let records_stored = IntGauge::new(
            "herakles_collector_records_stored",
            "Number of log records currently held in memory",
        )?;
        let store_capacity = IntGauge::new(
            "herakles_collector_store_capacity",
            "Maximum number of log records held in memory",
        )?;
        let clients_connected = IntGauge::new(
            "herakles_collector_clients_connected",
            "Number of agent connections listed in the client roster",
        )?;
        let uptime_seconds = Gauge::new(
            "herakles_collector_uptime_seconds",
            "Seconds since the collector started",
        )?;

        let records_appended_total = IntCounter::new(
            "herakles_collector_records_appended_total",
            "Total log records appended to the store",
        )?;
        let messages_framed_total = IntCounter::new(
            "herakles_collector_messages_framed_total",
            "Total JSON objects cut out of agent streams",
        )?;
        let control_messages_total = IntCounter::new(
            "herakles_collector_control_messages_total",
            "Total HELLO/GOODBYE/PING/PONG messages discarded",
        )?;
        let dropped_messages_total = IntCounter::new(
            "herakles_collector_dropped_messages_total",
            "Total framed messages that produced no record",
        )?;
        let buffer_resets_total = IntCounter::new(
            "herakles_collector_buffer_resets_total",
            "Total receive buffer overflows that discarded buffered data",
        )?;
        let bytes_received_total = IntCounter::new(
            "herakles_collector_bytes_received_total",
            "Total bytes read from agent connections",
        )?;
        let connections_accepted_total = IntCounter::new(
            "herakles_collector_connections_accepted_total",
            "Total agent connections accepted",
        )?;

        registry.register(Box::new(records_stored.clone()))?;
        registry.register(Box::new(store_capacity.clone()))?;
        registry.register(Box::new(clients_connected.clone()))?;
        registry.register(Box::new(uptime_seconds.clone()))?;
        registry.register(Box::new(records_appended_total.clone()))?;
        registry.register(Box::new(messages_framed_total.clone()))?;
        registry.register(Box::new(control_messages_total.clone()))?;
        registry.register(Box::new(dropped_messages_total.clone()))?;
        registry.register(Box::new(buffer_resets_total.clone()))?;
        registry.register(Box::new(bytes_received_total.clone()))?;
        registry.register(Box::new(connections_accepted_total.clone()))?;

        Ok(Self {
            registry,
            scrape_lock: Arc::new(Mutex::new(())),
            records_stored,
            store_capacity,
            clients_connected,
            uptime_seconds,
            records_appended_total,
            messages_framed_total,
            control_messages_total,
            dropped_messages_total,
            buffer_resets_total,
            bytes_received_total,
            connections_accepted_total,
        })
    }

    /// Refreshes from `collector` and encodes, one scrape at a time.
    pub fn scrape(&self, collector: &Collector) -> Result<String, prometheus::Error> {
        // Poisoning leaves the metrics themselves intact
        let _guard = self
            .scrape_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.refresh(collector);
        self.encode()
    }

    /// Copies the collector's current state into the registered metrics.
    pub fn refresh(&self, collector: &Collector) {
        let store = collector.store.stats();
        let ingest = collector.stats.snapshot();

        self.records_stored.set(store.stored as i64);
        self.store_capacity.set(store.capacity as i64);
        self.clients_connected.set(collector.roster.len() as i64);
        self.uptime_seconds.set(ingest.uptime_seconds as f64);

        // Cumulative totals: reset + inc_by mirrors the source counter
        set_counter(&self.records_appended_total, store.total_appended);
        set_counter(&self.messages_framed_total, ingest.messages_framed);
        set_counter(&self.control_messages_total, ingest.control_messages);
        set_counter(&self.dropped_messages_total, ingest.dropped_messages);
        set_counter(&self.buffer_resets_total, ingest.buffer_resets);
        set_counter(&self.bytes_received_total, ingest.bytes_received);
        set_counter(&self.connections_accepted_total, ingest.connections_accepted);
    }

    /// Encodes every registered metric in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

fn set_counter(counter: &IntCounter, total: u64) {
    counter.reset();
    counter.inc_by(total);
}
