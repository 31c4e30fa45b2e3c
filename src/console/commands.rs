use clap::{Parser, Subcommand};

use crate::pomodoro::{Command, Durations, Mode};

pub const CONFIRM_SWITCH_PROMPT: &str = "Timer is running, switch anyway? [y/N]";

#[derive(Parser, Debug)]
#[command(name = "pomodoro", about = "Pomodoro timer commands")]
struct ConsoleLine {
    #[command(subcommand)]
    command: ConsoleCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Restart the current interval from its full length
    Reset,
    /// Switch to focus, short or long
    Mode { mode: Mode },
    /// Set interval lengths in minutes
    Settings {
        pomodoro: u32,
        short_break: u32,
        long_break: u32,
    },
    /// Pick a display theme
    Theme { name: String },
    /// Print the full timer state
    Status,
    /// Exit
    #[command(alias = "exit")]
    Quit,
}

impl ConsoleCommand {
    /// The engine command for this line; `None` for commands the console
    /// answers itself.
    pub fn to_command(&self) -> Option<Command> {
        match self {
            ConsoleCommand::Start => Some(Command::Start),
            ConsoleCommand::Pause => Some(Command::Pause),
            ConsoleCommand::Reset => Some(Command::Reset),
            ConsoleCommand::Mode { mode } => Some(Command::SwitchMode {
                mode: *mode,
                confirmed: false,
            }),
            ConsoleCommand::Settings {
                pomodoro,
                short_break,
                long_break,
            } => Some(Command::ApplySettings(Durations {
                pomodoro: *pomodoro,
                short_break: *short_break,
                long_break: *long_break,
            })),
            ConsoleCommand::Theme { name } => Some(Command::SetTheme {
                theme: name.clone(),
            }),
            ConsoleCommand::Status | ConsoleCommand::Quit => None,
        }
    }
}

pub fn parse_line(line: &str) -> Result<ConsoleCommand, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "pomodoro".to_string());
    let parsed = ConsoleLine::try_parse_from(args).map_err(|e| e.to_string())?;
    Ok(parsed.command)
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// The confirmed switch for a "switch anyway?" answer, `None` when declined.
/// A declined switch never reaches the engine, even if the timer stopped
/// while the prompt was open.
pub fn answer_switch(mode: Mode, answer: &str) -> Option<Command> {
    is_affirmative(answer).then_some(Command::SwitchMode {
        mode,
        confirmed: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands() {
        assert_eq!(parse_line("start"), Ok(ConsoleCommand::Start));
        assert_eq!(parse_line("  pause "), Ok(ConsoleCommand::Pause));
        assert_eq!(parse_line("exit"), Ok(ConsoleCommand::Quit));
    }

    #[test]
    fn parses_mode_and_settings() {
        assert_eq!(
            parse_line("mode short"),
            Ok(ConsoleCommand::Mode {
                mode: Mode::ShortBreak
            })
        );
        let settings = parse_line("settings 50 10 20").unwrap();
        assert_eq!(
            settings.to_command(),
            Some(Command::ApplySettings(Durations {
                pomodoro: 50,
                short_break: 10,
                long_break: 20
            }))
        );
        assert_eq!(
            parse_line("theme 'Deep Ocean'").unwrap().to_command(),
            Some(Command::SetTheme {
                theme: "Deep Ocean".to_string()
            })
        );
    }

    #[test]
    fn reports_bad_input() {
        assert!(parse_line("mode nap").is_err());
        assert!(parse_line("settings 25 -1 15").is_err());
        assert!(parse_line("dance").is_err());
        assert!(parse_line("theme \"unterminated").is_err());
    }

    #[test]
    fn status_and_quit_stay_in_console() {
        assert_eq!(ConsoleCommand::Status.to_command(), None);
        assert_eq!(ConsoleCommand::Quit.to_command(), None);
    }

    #[test]
    fn only_yes_confirms() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("no"));
    }

    #[test]
    fn declined_switch_sends_nothing() {
        assert_eq!(answer_switch(Mode::ShortBreak, "n"), None);
        assert_eq!(answer_switch(Mode::ShortBreak, ""), None);
        assert_eq!(
            answer_switch(Mode::LongBreak, "yes"),
            Some(Command::SwitchMode {
                mode: Mode::LongBreak,
                confirmed: true
            })
        );
    }
}
