use chrono::{Local, NaiveDate};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, sleep};

use crate::pomodoro::pomodoro::TICK_INTERVAL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

/// What a clock delivers back to the engine's event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// One second passed on a tick subscription.
    Tick(SubscriptionId),
    /// A one-shot delay ran out.
    Elapsed(SubscriptionId),
}

/// Source of ticks, delays and the calendar date.
pub trait Clock {
    fn today(&self) -> NaiveDate;
    /// Starts a recurring tick every `TICK_INTERVAL`.
    fn subscribe_ticks(&mut self) -> SubscriptionId;
    fn schedule_after(&mut self, delay: Duration) -> SubscriptionId;
    fn cancel(&mut self, id: SubscriptionId);
}

pub type ClockSender = mpsc::UnboundedSender<ClockEvent>;
pub type ClockReceiver = mpsc::UnboundedReceiver<ClockEvent>;

/// Clock running on the tokio timer. Each subscription is a spawned task
/// feeding `ClockEvent`s into one channel; must be used inside a runtime.
pub struct TokioClock {
    next_id: u64,
    tasks: HashMap<SubscriptionId, JoinHandle<()>>,
    events: ClockSender,
}

impl TokioClock {
    pub fn new() -> (Self, ClockReceiver) {
        let (events, rx) = mpsc::unbounded_channel();
        let clock = Self {
            next_id: 0,
            tasks: HashMap::new(),
            events,
        };
        (clock, rx)
    }

    fn allocate(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId(self.next_id)
    }

    #[cfg(test)]
    pub fn active_subscriptions(&self) -> usize {
        self.tasks.len()
    }
}

impl Clock for TokioClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn subscribe_ticks(&mut self) -> SubscriptionId {
        let id = self.allocate();
        let tx = self.events.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval(TICK_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if tx.send(ClockEvent::Tick(id)).is_err() {
                    break;
                }
            }
        });
        self.tasks.insert(id, handle);
        id
    }

    fn schedule_after(&mut self, delay: Duration) -> SubscriptionId {
        let id = self.allocate();
        let tx = self.events.clone();
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(ClockEvent::Elapsed(id));
        });
        self.tasks.insert(id, handle);
        id
    }

    fn cancel(&mut self, id: SubscriptionId) {
        if let Some(handle) = self.tasks.remove(&id) {
            handle.abort();
        }
    }
}

impl Drop for TokioClock {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}
