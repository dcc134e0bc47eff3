//! Filtered event receivers for selective event consumption

use std::sync::Arc;
use tokio::sync::broadcast;

use super::errors::EventBusError;
use super::types::CaptureEvent;

/// Filtered event receiver wrapper
pub struct FilteredReceiver<F>
where
    F: Fn(&CaptureEvent) -> bool + Send + Sync + 'static,
{
    receiver: broadcast::Receiver<CaptureEvent>,
    filter: Arc<F>,
}

impl<F> FilteredReceiver<F>
where
    F: Fn(&CaptureEvent) -> bool + Send + Sync + 'static,
{
    pub fn new(receiver: broadcast::Receiver<CaptureEvent>, filter: F) -> Self {
        Self {
            receiver,
            filter: Arc::new(filter),
        }
    }

    /// Receive the next filtered event
    ///
    /// Waits for the next event that passes the filter. Preserves the
    /// receiver's buffered state between calls - no events are lost.
    pub async fn recv(&mut self) -> Result<CaptureEvent, EventBusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if (self.filter)(&event) {
                        return Ok(event);
                    }
                    // Continue loop to check next buffered event
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(EventBusError::Shutdown);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    return Err(EventBusError::ReceiverLagged(skipped));
                }
            }
        }
    }

    /// Try to receive the next filtered event without blocking
    ///
    /// # Returns
    /// * `Ok(Some(CaptureEvent))` - Event received and passed filter
    /// * `Ok(None)` - No matching events immediately available
    /// * `Err(EventBusError)` - If receiving failed or receiver lagged
    pub fn try_recv(&mut self) -> Result<Option<CaptureEvent>, EventBusError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if (self.filter)(&event) {
                        return Ok(Some(event));
                    }
                    // Draining the buffer, not spinning
                }
                Err(broadcast::error::TryRecvError::Empty) => {
                    return Ok(None);
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(EventBusError::Shutdown);
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    return Err(EventBusError::ReceiverLagged(skipped));
                }
            }
        }
    }

    /// Check whether an event would pass this receiver's filter
    #[must_use]
    pub fn would_receive(&self, event: &CaptureEvent) -> bool {
        (self.filter)(event)
    }
}
