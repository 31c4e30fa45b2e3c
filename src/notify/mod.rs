pub mod notifier;

pub use notifier::{DesktopNotifier, Notifier, Permission};
