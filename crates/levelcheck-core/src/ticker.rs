//! Background clock for an active session.
//!
//! The ticker owns the run's [`TickLease`] and calls [`Assessment::tick`] once
//! per period. It stops on its own the first time a tick is ignored, which
//! happens as soon as the session leaves the active state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::engine::Assessment;
use crate::session::{TickLease, TickOutcome, TIME_CRITICAL_SECS};

/// Notifications sent from the ticker to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// Remaining time dropped below the critical threshold.
    TimeCritical { remaining_secs: u32 },
    /// The countdown reached zero. Sent at most once per run.
    TimeExhausted,
}

/// Handle to a running ticker task.
pub struct Ticker {
    events: mpsc::UnboundedReceiver<TickEvent>,
    task: JoinHandle<()>,
}

impl Ticker {
    /// Spawn a ticker for the run identified by `lease`.
    pub fn spawn(engine: Arc<Mutex<Assessment>>, lease: TickLease, period: Duration) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(engine, lease, period, tx));
        Self { events, task }
    }

    /// Wait for the next event. Returns `None` once the ticker has stopped.
    pub async fn recv(&mut self) -> Option<TickEvent> {
        self.events.recv().await
    }

    /// Poll for an event without waiting.
    pub fn try_recv(&mut self) -> Option<TickEvent> {
        self.events.try_recv().ok()
    }

    /// Wait for the task to stop, which it does on the first tick after the
    /// session leaves the active state.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            tracing::error!("ticker task failed: {e}");
        }
    }

    /// Stop immediately.
    pub fn abort(&self) {
        self.task.abort();
    }
}

async fn run(
    engine: Arc<Mutex<Assessment>>,
    lease: TickLease,
    period: Duration,
    tx: mpsc::UnboundedSender<TickEvent>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately.
    interval.tick().await;

    let mut critical = false;
    let mut exhausted = false;
    loop {
        interval.tick().await;
        let outcome = engine.lock().await.tick(&lease);
        match outcome {
            TickOutcome::Ignored => break,
            TickOutcome::Counted {
                remaining_secs: Some(remaining_secs),
            } => {
                if remaining_secs < TIME_CRITICAL_SECS {
                    if !critical {
                        critical = true;
                        let _ = tx.send(TickEvent::TimeCritical { remaining_secs });
                    }
                } else {
                    // An extension lifted the clock back above the threshold.
                    critical = false;
                }
                exhausted = false;
            }
            TickOutcome::Counted {
                remaining_secs: None,
            } => {}
            TickOutcome::TimeExhausted => {
                if !exhausted {
                    exhausted = true;
                    let _ = tx.send(TickEvent::TimeExhausted);
                }
            }
        }
    }
    tracing::debug!("ticker stopped");
}
