use serde::Deserialize;

use super::pomodoro::Mode;
use super::settings::Durations;

/// A user action, as produced by either front-end.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Start,
    Pause,
    Reset,
    SwitchMode {
        mode: Mode,
        /// Answer to "timer is active, switch anyway?"; only consulted
        /// while running.
        #[serde(default)]
        confirmed: bool,
    },
    ApplySettings(Durations),
    SetTheme {
        theme: String,
    },
    /// Push every display value again.
    Refresh,
}
