//! Event bus implementation for publishing and subscribing to capture events

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, broadcast};

use super::config::EventBusConfig;
use super::errors::EventBusError;
use super::metrics::EventBusMetrics;
use super::streaming::FilteredReceiver;
use super::types::CaptureEvent;

/// Event bus for publishing and subscribing to capture events
///
/// Backed by a `tokio::sync::broadcast` channel: publishers never block,
/// every subscriber sees every event (subject to buffer capacity), and
/// slow subscribers observe `Lagged` rather than stalling the run.
#[derive(Debug)]
pub struct CaptureEventBus {
    sender: broadcast::Sender<CaptureEvent>,
    config: Arc<EventBusConfig>,
    metrics: EventBusMetrics,
    shutdown: Arc<Notify>,
    shutdown_flag: Arc<AtomicBool>,
    /// Reference count for tracking bus instances (for proper Drop semantics)
    num_instances: Arc<AtomicUsize>,
}

impl CaptureEventBus {
    /// Create a new event bus with the specified capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let config = EventBusConfig {
            capacity,
            ..Default::default()
        };
        Self::with_config(config)
    }

    /// Create a new event bus with custom configuration
    #[must_use]
    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.capacity);
        Self {
            sender,
            config: Arc::new(config),
            metrics: EventBusMetrics::new(),
            shutdown: Arc::new(Notify::new()),
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            num_instances: Arc::new(AtomicUsize::new(1)),
        }
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    /// Get current metrics
    ///
    /// Individual counter reads are atomic; for a consistent view across
    /// all counters use `metrics().snapshot()`.
    #[must_use]
    pub fn metrics(&self) -> &EventBusMetrics {
        &self.metrics
    }

    /// Publish an event to all subscribers
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of active subscribers that received the event
    /// * `Err(EventBusError::NoSubscribers)` - If nobody is listening
    pub fn publish(&self, event: CaptureEvent) -> Result<usize, EventBusError> {
        if let Ok(subscriber_count) = self.sender.send(event) {
            if self.config.enable_metrics {
                self.metrics.increment_published();
                self.metrics.update_subscriber_count(subscriber_count);

                if subscriber_count == 0 {
                    self.metrics.increment_dropped();
                    log::debug!("Published event but no active subscribers");
                }
            }
            Ok(subscriber_count)
        } else {
            if self.config.enable_metrics {
                self.metrics.increment_failed();
            }
            Err(EventBusError::NoSubscribers)
        }
    }

    /// Subscribe to events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CaptureEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let count = self.sender.receiver_count();
        if self.config.enable_metrics {
            self.metrics.update_subscriber_count(count);
        }
        count
    }

    /// Check if the event bus has any active subscribers
    #[must_use]
    pub fn has_subscribers(&self) -> bool {
        self.subscriber_count() > 0
    }

    /// Create a filtered subscriber that only receives specific event types
    ///
    /// # Arguments
    /// * `filter` - Function that returns true if the event should be passed through
    pub fn subscribe_filtered<F>(&self, filter: F) -> FilteredReceiver<F>
    where
        F: Fn(&CaptureEvent) -> bool + Send + Sync + 'static,
    {
        FilteredReceiver::new(self.subscribe(), filter)
    }

    /// Signal shutdown to all subscribers
    ///
    /// This method is idempotent - calling it multiple times is safe.
    /// All clones of this bus share the same shutdown signal.
    pub fn shutdown(&self) {
        self.shutdown_flag.store(true, Ordering::SeqCst);
        self.shutdown.notify_waiters();
        log::debug!("Event bus shutdown signaled");
    }

    /// Wait for shutdown signal
    pub async fn wait_for_shutdown(&self) {
        self.shutdown.notified().await;
    }

    /// Check if shutdown has been signaled
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown_flag.load(Ordering::SeqCst)
    }

    /// Gracefully shutdown the event bus with a final `Shutdown` event
    ///
    /// 1. Set the shutdown flag so new operations stop
    /// 2. Publish a `Shutdown` event carrying the reason
    /// 3. Give subscribers a short window to drain their buffers
    /// 4. Wake any task waiting on `wait_for_shutdown`
    pub async fn shutdown_gracefully(&self, reason: super::types::ShutdownReason) {
        log::info!("Beginning graceful shutdown of event bus: {reason:?}");

        self.shutdown_flag.store(true, Ordering::SeqCst);

        let _ = self.publish(CaptureEvent::shutdown(reason));

        // Heuristic drain window - subscribers do not acknowledge, so give
        // them time to process the buffered tail before waking waiters.
        tokio::time::sleep(Duration::from_millis(500)).await;

        self.shutdown.notify_waiters();

        log::debug!("Event bus graceful shutdown complete");
    }
}

impl Default for CaptureEventBus {
    fn default() -> Self {
        Self::with_config(EventBusConfig::default())
    }
}

impl Clone for CaptureEventBus {
    fn clone(&self) -> Self {
        // Increment instance count (follows tokio's broadcast::Sender pattern)
        self.num_instances.fetch_add(1, Ordering::Relaxed);
        Self {
            sender: self.sender.clone(),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            shutdown: self.shutdown.clone(),
            shutdown_flag: self.shutdown_flag.clone(),
            num_instances: self.num_instances.clone(),
        }
    }
}

impl Drop for CaptureEventBus {
    fn drop(&mut self) {
        // Only shutdown when the LAST instance is dropped
        // fetch_sub returns the value BEFORE decrementing
        if 1 == self.num_instances.fetch_sub(1, Ordering::AcqRel) {
            self.shutdown_flag.store(true, Ordering::SeqCst);
            self.shutdown.notify_waiters();
            log::trace!("Event bus dropped (last instance), shutdown signal sent");
        }
    }
}
