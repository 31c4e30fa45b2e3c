use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const GRACE_PERIOD: Duration = Duration::from_secs(3); // 00:00 stays visible before auto-reset

pub const DEFAULT_POMODORO_MINUTES: u32 = 25;
pub const DEFAULT_SHORT_BREAK_MINUTES: u32 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u32 = 15;

pub const POMODORO_MINUTES_RANGE: (u32, u32) = (1, 60);
pub const SHORT_BREAK_MINUTES_RANGE: (u32, u32) = (1, 30);
pub const LONG_BREAK_MINUTES_RANGE: (u32, u32) = (1, 60);

/// Completed focus intervals per day shown as 100% on the progress bar.
/// Display only; the counter keeps going past it.
pub const DAILY_GOAL: u32 = 8;

pub const NOTIFICATION_TITLE: &str = "Pomodoro Timer";
pub const FOCUS_COMPLETE_MESSAGE: &str = "🎉 Focus complete! Time for a break!";
pub const BREAK_COMPLETE_MESSAGE: &str = "⏰ Break is over, ready for the next focus session!";
pub const SETTINGS_SAVED_MESSAGE: &str = "✅ Settings saved!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[serde(rename = "pomodoro", alias = "focus")]
    Focus,
    #[serde(alias = "shortBreak")]
    ShortBreak,
    #[serde(alias = "longBreak")]
    LongBreak,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Focus, Mode::ShortBreak, Mode::LongBreak];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Focus => "pomodoro",
            Mode::ShortBreak => "short_break",
            Mode::LongBreak => "long_break",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Focus => "Focus",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Mode::Focus => "🍅",
            Mode::ShortBreak => "☕",
            Mode::LongBreak => "🌿",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pomodoro" | "focus" => Ok(Mode::Focus),
            "short_break" | "shortBreak" | "short" => Ok(Mode::ShortBreak),
            "long_break" | "longBreak" | "long" => Ok(Mode::LongBreak),
            other => Err(format!(
                "unknown mode '{other}' (expected focus, short or long)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_wire_names() {
        assert_eq!("focus".parse::<Mode>(), Ok(Mode::Focus));
        assert_eq!("pomodoro".parse::<Mode>(), Ok(Mode::Focus));
        assert_eq!("shortBreak".parse::<Mode>(), Ok(Mode::ShortBreak));
        assert_eq!(" long ".parse::<Mode>(), Ok(Mode::LongBreak));
        assert!("nap".parse::<Mode>().is_err());
    }

    #[test]
    fn serializes_with_storage_names() {
        let json = serde_json::to_string(&Mode::ShortBreak).unwrap();
        assert_eq!(json, "\"short_break\"");
        let mode: Mode = serde_json::from_str("\"focus\"").unwrap();
        assert_eq!(mode, Mode::Focus);
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>(), Ok(mode));
        }
    }
}
