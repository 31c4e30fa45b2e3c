pub mod display;

pub use display::{DisplayFrame, DisplaySink, TerminalDisplay, clock_labels};
