pub mod clock;
#[cfg(test)]
pub mod manual;

pub use clock::{Clock, ClockEvent, ClockReceiver, SubscriptionId, TokioClock};
