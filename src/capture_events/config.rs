//! Configuration for the event bus

/// Configuration for the event bus
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Maximum number of events that can be buffered
    ///
    /// Publishers never block; when the buffer is full the oldest events
    /// are dropped and slow receivers observe `RecvError::Lagged`.
    pub capacity: usize,

    /// Whether to collect publish/drop/subscriber metrics
    pub enable_metrics: bool,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            enable_metrics: true,
        }
    }
}
