/// Output port: publish domain events (no knowledge of transport).
///
/// Implementations must not block; delivery failures stay inside the adapter.
pub trait EventPublisher<E>: Send + Sync + 'static {
    fn publish(&self, event: &E);
}
