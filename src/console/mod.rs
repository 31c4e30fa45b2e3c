pub mod commands;

pub use commands::{CONFIRM_SWITCH_PROMPT, ConsoleCommand, answer_switch, parse_line};
