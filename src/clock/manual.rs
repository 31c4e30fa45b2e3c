use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::time::Duration;

use super::clock::{Clock, SubscriptionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    Ticks,
    Delay(Duration),
}

/// Clock driven by hand from tests: it only records subscriptions.
#[derive(Debug)]
pub struct ManualClock {
    pub today: NaiveDate,
    next_id: u64,
    active: BTreeMap<SubscriptionId, Pending>,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            next_id: 0,
            active: BTreeMap::new(),
        }
    }

    pub fn active(&self) -> Vec<(SubscriptionId, Pending)> {
        self.active.iter().map(|(id, p)| (*id, *p)).collect()
    }

    pub fn tick_subscriptions(&self) -> usize {
        self.active.values().filter(|p| **p == Pending::Ticks).count()
    }

    pub fn pending_delay(&self) -> Option<(SubscriptionId, Duration)> {
        self.active.iter().find_map(|(id, p)| match p {
            Pending::Delay(delay) => Some((*id, *delay)),
            Pending::Ticks => None,
        })
    }

    fn insert(&mut self, pending: Pending) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.active.insert(id, pending);
        id
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn subscribe_ticks(&mut self) -> SubscriptionId {
        self.insert(Pending::Ticks)
    }

    fn schedule_after(&mut self, delay: Duration) -> SubscriptionId {
        self.insert(Pending::Delay(delay))
    }

    fn cancel(&mut self, id: SubscriptionId) {
        self.active.remove(&id);
    }
}
