//! Heart-rate fan-out hub.
//!
//! The hub owns the listener registry: a [`tokio::sync::broadcast`]
//! channel. Every submitted reading is stamped and sent once into the
//! channel, and every receiver registered at that moment gets its own copy.
//! HTTP submissions and WebSocket pushes both go through
//! [`HeartRateHub::submit`].
//!
//! # Slow listeners
//!
//! Each listener has a bounded buffer of `capacity` samples. A listener
//! that falls further behind loses its oldest samples (reported as
//! [`RecvError::Lagged`] and logged). Submitters and other listeners are
//! never blocked.

use chrono::Utc;
use safespace_types::{HeartRateReading, HeartRateSample};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// Default per-listener buffer size.
pub const DEFAULT_CAPACITY: usize = 256;

/// Acknowledgment returned to a submitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Receipt {
    /// The sample as broadcast, including its receipt timestamp.
    pub sample: HeartRateSample,
    /// Number of listeners the sample was delivered to.
    pub delivered_to: usize,
}

/// Broadcasts heart-rate samples to every connected listener.
///
/// Cheap to clone. All clones share the same registry.
#[derive(Debug, Clone)]
pub struct HeartRateHub {
    tx: broadcast::Sender<HeartRateSample>,
}

impl HeartRateHub {
    /// Create a hub whose listeners each buffer up to `capacity` samples.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Stamp `reading` with the current time and broadcast it.
    ///
    /// Listeners that subscribe later never see this sample. Having no
    /// listeners is not an error.
    pub fn submit(&self, reading: HeartRateReading) -> Receipt {
        let sample = reading.stamp(Utc::now());
        // send only fails when there are no receivers.
        let delivered_to = self.tx.send(sample).unwrap_or(0);

        tracing::debug!(
            bpm = sample.bpm,
            fear = sample.fear,
            delivered_to,
            "Heart-rate sample broadcast"
        );

        Receipt {
            sample,
            delivered_to,
        }
    }

    /// Register a new listener.
    ///
    /// The returned handle receives every sample submitted after this call
    /// until it is unsubscribed or dropped.
    pub fn subscribe(&self) -> HeartRateSubscription {
        HeartRateSubscription {
            rx: Some(self.tx.subscribe()),
        }
    }

    /// Number of currently registered listeners.
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for HeartRateHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// A listener handle returned by [`HeartRateHub::subscribe`].
///
/// Dropping the handle unsubscribes it.
#[derive(Debug)]
pub struct HeartRateSubscription {
    rx: Option<broadcast::Receiver<HeartRateSample>>,
}

impl HeartRateSubscription {
    /// Wait for the next sample.
    ///
    /// Samples lost to lag are skipped. Returns `None` once the
    /// subscription has been unsubscribed or the hub is gone. Cancel-safe,
    /// so it can be used inside `tokio::select!`.
    pub async fn recv(&mut self) -> Option<HeartRateSample> {
        loop {
            let rx = self.rx.as_mut()?;
            match rx.recv().await {
                Ok(sample) => return Some(sample),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Heart-rate listener lagged, dropped oldest samples");
                }
                Err(RecvError::Closed) => {
                    self.rx = None;
                    return None;
                }
            }
        }
    }

    /// Take the next sample if one is already buffered.
    pub fn try_recv(&mut self) -> Option<HeartRateSample> {
        loop {
            let rx = self.rx.as_mut()?;
            match rx.try_recv() {
                Ok(sample) => return Some(sample),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Heart-rate listener lagged, dropped oldest samples");
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Closed) => {
                    self.rx = None;
                    return None;
                }
            }
        }
    }

    /// Remove this listener from the hub.
    ///
    /// Idempotent. Returns `true` only on the call that actually removed
    /// the listener.
    pub fn unsubscribe(&mut self) -> bool {
        self.rx.take().is_some()
    }

    /// Whether the listener is still registered.
    pub const fn is_active(&self) -> bool {
        self.rx.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(bpm: f64) -> HeartRateReading {
        HeartRateReading { bpm, fear: false }
    }

    fn bpm_of(sample: Option<HeartRateSample>) -> Option<u32> {
        sample.and_then(|s| format!("{:.0}", s.bpm).parse().ok())
    }

    #[test]
    fn every_listener_gets_exactly_one_copy() {
        let hub = HeartRateHub::default();
        let mut listeners: Vec<_> = (0..5).map(|_| hub.subscribe()).collect();

        let receipt = hub.submit(reading(72.0));
        assert_eq!(receipt.delivered_to, 5);

        for listener in &mut listeners {
            assert_eq!(bpm_of(listener.try_recv()), Some(72));
            assert!(listener.try_recv().is_none());
        }
    }

    #[test]
    fn late_listener_sees_no_history() {
        let hub = HeartRateHub::default();
        let _early = hub.subscribe();
        hub.submit(reading(80.0));

        let mut late = hub.subscribe();
        assert!(late.try_recv().is_none());

        hub.submit(reading(81.0));
        assert_eq!(bpm_of(late.try_recv()), Some(81));
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let hub = HeartRateHub::default();
        let mut listener = hub.subscribe();

        hub.submit(reading(90.0));
        assert!(listener.unsubscribe());
        hub.submit(reading(91.0));

        // Buffered samples are discarded along with the receiver.
        assert!(listener.try_recv().is_none());
        assert!(!listener.is_active());
    }

    #[test]
    fn receive_then_unsubscribe_yields_only_first_sample() {
        let hub = HeartRateHub::default();
        let mut listener = hub.subscribe();

        hub.submit(reading(100.0));
        let first = listener.try_recv();
        listener.unsubscribe();
        hub.submit(reading(101.0));

        assert_eq!(bpm_of(first), Some(100));
        assert!(listener.try_recv().is_none());
    }

    #[test]
    fn subscribe_then_unsubscribe_leaves_no_listeners() {
        let hub = HeartRateHub::default();
        let mut listener = hub.subscribe();
        assert_eq!(hub.listener_count(), 1);
        listener.unsubscribe();
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn double_unsubscribe_is_a_no_op() {
        let hub = HeartRateHub::default();
        let mut listener = hub.subscribe();
        assert!(listener.unsubscribe());
        assert!(!listener.unsubscribe());
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn dropping_handle_unsubscribes() {
        let hub = HeartRateHub::default();
        {
            let _listener = hub.subscribe();
            assert_eq!(hub.listener_count(), 1);
        }
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn submit_without_listeners_is_not_an_error() {
        let hub = HeartRateHub::default();
        let receipt = hub.submit(HeartRateReading {
            bpm: 64.0,
            fear: true,
        });
        assert_eq!(receipt.delivered_to, 0);
        assert!(receipt.sample.fear);
    }

    #[test]
    fn slow_listener_drops_oldest_without_blocking_others() {
        let hub = HeartRateHub::new(2);
        let mut slow = hub.subscribe();
        let mut fast = hub.subscribe();

        for bpm in [60.0, 61.0, 62.0, 63.0] {
            hub.submit(reading(bpm));
            assert!(fast.try_recv().is_some());
        }

        // Only the two newest samples survive in the slow listener's buffer.
        assert_eq!(bpm_of(slow.try_recv()), Some(62));
        assert_eq!(bpm_of(slow.try_recv()), Some(63));
        assert!(slow.try_recv().is_none());
        assert!(slow.is_active());
    }

    #[test]
    fn samples_arrive_in_submission_order() {
        let hub = HeartRateHub::default();
        let mut listener = hub.subscribe();
        for bpm in [70.0, 71.0, 72.0] {
            hub.submit(reading(bpm));
        }
        let received: Vec<_> = (0..3).filter_map(|_| bpm_of(listener.try_recv())).collect();
        assert_eq!(received, vec![70, 71, 72]);
    }

    #[tokio::test]
    async fn recv_wakes_concurrent_listeners() {
        let hub = HeartRateHub::default();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let mut listener = hub.subscribe();
                tokio::spawn(async move { listener.recv().await })
            })
            .collect();

        hub.submit(reading(110.0));

        for handle in handles {
            let sample = handle.await.ok().flatten();
            assert_eq!(bpm_of(sample), Some(110));
        }
    }

    #[tokio::test]
    async fn recv_ends_when_hub_is_dropped() {
        let hub = HeartRateHub::default();
        let mut listener = hub.subscribe();
        drop(hub);
        assert!(listener.recv().await.is_none());
        assert!(!listener.is_active());
    }

    #[tokio::test]
    async fn recv_after_unsubscribe_returns_none() {
        let hub = HeartRateHub::default();
        let mut listener = hub.subscribe();
        listener.unsubscribe();
        hub.submit(reading(99.0));
        assert!(listener.recv().await.is_none());
    }
}
