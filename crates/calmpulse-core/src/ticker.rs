//! One-second tick source.
//!
//! A background tokio task that sends a [`Tick`] per period while running.
//! Missed ticks are delayed rather than bursted, so a stalled runtime never
//! replays a backlog of seconds into the tracker.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Default tick interval.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick;

/// Restartable periodic tick producer.
///
/// At most one producer task exists at a time.
pub struct TickSource {
    interval: Duration,
    tx: mpsc::UnboundedSender<Tick>,
    task: Option<JoinHandle<()>>,
}

impl TickSource {
    pub fn new(interval: Duration) -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let interval = if interval.is_zero() {
            DEFAULT_TICK_INTERVAL
        } else {
            interval
        };
        (
            Self {
                interval,
                tx,
                task: None,
            },
            rx,
        )
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Begin producing ticks. Returns `false` if already running.
    ///
    /// The first tick arrives one full period after this call.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        let tx = self.tx.clone();
        let period = self.interval;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(Tick).is_err() {
                    debug!("tick receiver dropped, ticker exiting");
                    break;
                }
            }
        }));
        debug!(interval_ms = period.as_millis() as u64, "ticker started");
        true
    }

    /// Stop producing ticks. Returns `false` if it was not running.
    pub fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                debug!("ticker stopped");
                true
            }
            None => false,
        }
    }
}

/// Discard ticks that are already queued. Returns how many were dropped.
///
/// Call after [`TickSource::stop`] so a tick produced before the stop can
/// never reach the next run.
pub fn drain(ticks: &mut mpsc::UnboundedReceiver<Tick>) -> usize {
    let mut dropped = 0;
    while ticks.try_recv().is_ok() {
        dropped += 1;
    }
    dropped
}

impl Drop for TickSource {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period_after_start() {
        let (mut source, mut rx) = TickSource::new(Duration::from_secs(1));
        assert!(source.start());
        assert!(!source.start());

        tokio::time::sleep(Duration::from_millis(3500)).await;
        let mut received = 0;
        while rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_ticks_and_is_idempotent() {
        let (mut source, mut rx) = TickSource::new(Duration::from_secs(1));
        source.start();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(source.stop());
        assert!(!source.stop());
        assert!(!source.is_running());
        while rx.try_recv().is_ok() {}

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn drain_discards_ticks_queued_before_stop() {
        let (mut source, mut rx) = TickSource::new(Duration::from_secs(1));
        source.start();
        tokio::time::sleep(Duration::from_millis(2500)).await;
        source.stop();

        assert_eq!(drain(&mut rx), 2);
        assert_eq!(drain(&mut rx), 0);
        source.start();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_stop() {
        let (mut source, mut rx) = TickSource::new(Duration::from_secs(1));
        source.start();
        source.stop();
        assert!(source.start());
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn zero_interval_falls_back_to_default() {
        let (source, _rx) = TickSource::new(Duration::ZERO);
        assert_eq!(source.interval(), DEFAULT_TICK_INTERVAL);
    }
}
