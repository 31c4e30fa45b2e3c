use serde::Serialize;
use std::io::Write;

use crate::pomodoro::pomodoro::Mode;
use crate::pomodoro::settings::Theme;

const BAR_WIDTH: usize = 20;

/// Receives everything the timer wants shown.
pub trait DisplaySink {
    /// `progress` is the elapsed fraction of the current interval, in [0, 1].
    fn render(&mut self, minutes: &str, seconds: &str, progress: f64);
    fn render_progress(&mut self, completed: u32, total_focus_minutes: u32, percent_of_goal: f64);
    fn render_mode(&mut self, mode: Mode);
    fn render_theme(&mut self, theme: &Theme);
}

impl<T: DisplaySink + ?Sized> DisplaySink for Box<T> {
    fn render(&mut self, minutes: &str, seconds: &str, progress: f64) {
        (**self).render(minutes, seconds, progress)
    }

    fn render_progress(&mut self, completed: u32, total_focus_minutes: u32, percent_of_goal: f64) {
        (**self).render_progress(completed, total_focus_minutes, percent_of_goal)
    }

    fn render_mode(&mut self, mode: Mode) {
        (**self).render_mode(mode)
    }

    fn render_theme(&mut self, theme: &Theme) {
        (**self).render_theme(theme)
    }
}

/// Zero-padded `("MM", "SS")` labels for a number of seconds.
pub fn clock_labels(seconds: u32) -> (String, String) {
    (format!("{:02}", seconds / 60), format!("{:02}", seconds % 60))
}

/// One display update as sent to WebSocket clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayFrame {
    Timer {
        minutes: String,
        seconds: String,
        progress: f64,
    },
    #[serde(rename_all = "camelCase")]
    Progress {
        completed_pomodoros: u32,
        total_focus_time: u32,
        percent_of_goal: f64,
    },
    Mode {
        mode: Mode,
        label: &'static str,
    },
    Theme {
        theme: String,
    },
}

impl DisplayFrame {
    pub fn timer(minutes: &str, seconds: &str, progress: f64) -> Self {
        DisplayFrame::Timer {
            minutes: minutes.to_string(),
            seconds: seconds.to_string(),
            progress,
        }
    }

    pub fn progress(completed: u32, total_focus_minutes: u32, percent_of_goal: f64) -> Self {
        DisplayFrame::Progress {
            completed_pomodoros: completed,
            total_focus_time: total_focus_minutes,
            percent_of_goal,
        }
    }

    pub fn mode(mode: Mode) -> Self {
        DisplayFrame::Mode {
            mode,
            label: mode.label(),
        }
    }

    pub fn theme(theme: &Theme) -> Self {
        DisplayFrame::Theme {
            theme: theme.as_str().to_string(),
        }
    }
}

fn progress_bar(fraction: f64) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Renders to stdout: the countdown redraws one line in place, everything
/// else gets its own line.
pub struct TerminalDisplay {
    mode: Mode,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self { mode: Mode::Focus }
    }

    fn line(&self, text: &str) {
        let mut stdout = std::io::stdout();
        let _ = writeln!(stdout, "\r\x1b[2K{}", text);
        let _ = stdout.flush();
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySink for TerminalDisplay {
    fn render(&mut self, minutes: &str, seconds: &str, progress: f64) {
        let mut stdout = std::io::stdout();
        let _ = write!(
            stdout,
            "\r\x1b[2K{} {:<11} {}:{} [{}] {:>3.0}%",
            self.mode.emoji(),
            self.mode.label(),
            minutes,
            seconds,
            progress_bar(progress),
            progress * 100.0
        );
        let _ = stdout.flush();
    }

    fn render_progress(&mut self, completed: u32, total_focus_minutes: u32, percent_of_goal: f64) {
        self.line(&format!(
            "Today: {} pomodoros, {} minutes focused [{}] {}%",
            completed,
            total_focus_minutes,
            progress_bar(percent_of_goal / 100.0),
            percent_of_goal.round()
        ));
    }

    fn render_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.line(&format!("{} {} mode", mode.emoji(), mode.label()));
    }

    fn render_theme(&mut self, theme: &Theme) {
        self.line(&format!("Theme: {}", theme));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_zero_padded() {
        assert_eq!(clock_labels(25 * 60), ("25".to_string(), "00".to_string()));
        assert_eq!(clock_labels(61), ("01".to_string(), "01".to_string()));
        assert_eq!(clock_labels(0), ("00".to_string(), "00".to_string()));
    }

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0), "░".repeat(BAR_WIDTH));
        assert_eq!(progress_bar(1.0), "█".repeat(BAR_WIDTH));
        assert_eq!(progress_bar(0.5).chars().filter(|c| *c == '█').count(), 10);
        assert_eq!(progress_bar(7.0), "█".repeat(BAR_WIDTH));
    }

    #[test]
    fn frames_serialize_with_type_tag() {
        let json = serde_json::to_value(DisplayFrame::timer("24", "59", 0.0)).unwrap();
        assert_eq!(json["type"], "timer");
        assert_eq!(json["minutes"], "24");

        let json = serde_json::to_value(DisplayFrame::progress(3, 75, 37.5)).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["completedPomodoros"], 3);
        assert_eq!(json["totalFocusTime"], 75);

        let json = serde_json::to_value(DisplayFrame::mode(Mode::LongBreak)).unwrap();
        assert_eq!(json["mode"], "long_break");
        assert_eq!(json["label"], "Long Break");
    }
}
