use biometrics::{Collector, Counter, Moments};

pub(crate) static RELAY_REQUESTS: Counter = Counter::new("routine_builder.relay.requests");
pub(crate) static RELAY_INVALID_REQUESTS: Counter =
    Counter::new("routine_builder.relay.invalid_requests");
pub(crate) static RELAY_UPSTREAM_ERRORS: Counter =
    Counter::new("routine_builder.relay.upstream_errors");
pub(crate) static RELAY_TRANSPORT_ERRORS: Counter =
    Counter::new("routine_builder.relay.transport_errors");
pub(crate) static RELAY_DURATION: Moments =
    Moments::new("routine_builder.relay.duration_seconds");

pub(crate) static SESSION_RELAY_CALLS: Counter =
    Counter::new("routine_builder.session.relay_calls");
pub(crate) static SESSION_RELAY_FAILURES: Counter =
    Counter::new("routine_builder.session.relay_failures");
pub(crate) static SESSION_PERSIST_ERRORS: Counter =
    Counter::new("routine_builder.session.persist_errors");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&RELAY_REQUESTS);
    collector.register_counter(&RELAY_INVALID_REQUESTS);
    collector.register_counter(&RELAY_UPSTREAM_ERRORS);
    collector.register_counter(&RELAY_TRANSPORT_ERRORS);
    collector.register_moments(&RELAY_DURATION);

    collector.register_counter(&SESSION_RELAY_CALLS);
    collector.register_counter(&SESSION_RELAY_FAILURES);
    collector.register_counter(&SESSION_PERSIST_ERRORS);
}
