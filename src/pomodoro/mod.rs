pub mod command;
pub mod engine;
pub mod pomodoro;
pub mod progress;
pub mod settings;

pub use command::Command;
pub use engine::TimerEngine;
pub use pomodoro::Mode;
pub use settings::{Durations, Theme};
