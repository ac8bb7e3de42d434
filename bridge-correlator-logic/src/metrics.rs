use lazy_static::lazy_static;
use prometheus::{
    HistogramVec, IntCounterVec, register_histogram_vec, register_int_counter_vec,
};

// Engine metrics. Keep labels low-cardinality: protocol and skip reason.
lazy_static! {
    /// Events fully processed per protocol.
    pub static ref EVENTS_PROCESSED: IntCounterVec = register_int_counter_vec!(
        "bridge_correlator_events_processed_total",
        "events handled to completion",
        &["protocol"],
    )
    .unwrap();

    /// Events skipped per protocol and reason {decode, config, state}.
    pub static ref EVENTS_SKIPPED: IntCounterVec = register_int_counter_vec!(
        "bridge_correlator_events_skipped_total",
        "events dropped without side effects",
        &["protocol", "reason"],
    )
    .unwrap();

    /// Envelopes that reached the matched state per protocol.
    pub static ref ENVELOPES_MATCHED: IntCounterVec = register_int_counter_vec!(
        "bridge_correlator_envelopes_matched_total",
        "envelopes with both legs observed",
        &["protocol"],
    )
    .unwrap();

    /// Observed end-to-end latency at match time, seconds. Negative samples
    /// are clamped to the lowest bucket.
    pub static ref MATCH_LATENCY_SECONDS: HistogramVec = register_histogram_vec!(
        "bridge_correlator_match_latency_seconds",
        "inbound minus outbound block timestamp at match time",
        &["protocol"],
        vec![0.0, 15.0, 60.0, 300.0, 900.0, 3600.0, 21600.0, 86400.0]
    )
    .unwrap();

    /// Bus receptions where more than one passenger shares the receiver.
    pub static ref BUS_AMBIGUOUS_RECEIVER: IntCounterVec = register_int_counter_vec!(
        "bridge_correlator_bus_ambiguous_receiver_total",
        "bus envelopes resolved first-hit among duplicate receivers",
        &["protocol"],
    )
    .unwrap();
}
