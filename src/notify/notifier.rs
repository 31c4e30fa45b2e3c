use log::{debug, info, warn};
use notify_rust::Notification;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Delivers end-of-interval and confirmation messages to the user.
pub trait Notifier {
    fn notify(&mut self, title: &str, body: &str);
}

impl<T: Notifier + ?Sized> Notifier for Box<T> {
    fn notify(&mut self, title: &str, body: &str) {
        (**self).notify(title, body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Undetermined,
    /// The first desktop notification is in flight.
    Pending,
    Granted,
    Denied,
}

pub type DeliveryResult = Result<(), Box<dyn std::error::Error>>;

/// Shows one desktop notification, blocking until the daemon answers.
pub type Delivery = Arc<dyn Fn(&str, &str) -> DeliveryResult + Send + Sync>;

/// Desktop notifications through the session's notification daemon, with a
/// terminal alert whenever that channel is not known to work.
pub struct DesktopNotifier {
    permission: Arc<Mutex<Permission>>,
    deliver: Delivery,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self::with_delivery(Permission::Undetermined, Arc::new(send_notification))
    }

    pub fn disabled() -> Self {
        Self::with_delivery(Permission::Denied, Arc::new(send_notification))
    }

    pub fn with_delivery(permission: Permission, deliver: Delivery) -> Self {
        Self {
            permission: Arc::new(Mutex::new(permission)),
            deliver,
        }
    }

    pub fn permission(&self) -> Permission {
        self.permission
            .lock()
            .map(|p| *p)
            .unwrap_or(Permission::Denied)
    }

    fn set_permission(&self, permission: Permission) {
        if let Ok(mut current) = self.permission.lock() {
            *current = permission;
        }
    }

    /// Shows one desktop notification off the event loop; the outcome is
    /// written back into `permission`.
    fn spawn_desktop(&self, title: &str, body: &str) {
        let title = title.to_string();
        let body = body.to_string();
        let permission = Arc::clone(&self.permission);
        let deliver = Arc::clone(&self.deliver);
        tokio::task::spawn_blocking(move || {
            let outcome = deliver(&title, &body);
            let Ok(mut current) = permission.lock() else {
                return;
            };
            match outcome {
                Ok(()) => {
                    if *current != Permission::Granted {
                        info!("Desktop notifications available");
                    }
                    *current = Permission::Granted;
                }
                Err(e) => {
                    warn!("Desktop notification failed, using terminal alerts: {}", e);
                    *current = Permission::Denied;
                }
            }
        });
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&mut self, title: &str, body: &str) {
        match self.permission() {
            Permission::Granted => self.spawn_desktop(title, body),
            Permission::Undetermined => {
                debug!("Checking desktop notifications");
                self.set_permission(Permission::Pending);
                self.spawn_desktop(title, body);
                alert(title, body);
            }
            Permission::Pending | Permission::Denied => alert(title, body),
        }
    }
}

fn send_notification(title: &str, body: &str) -> DeliveryResult {
    Notification::new()
        .summary(title)
        .body(body)
        .timeout(0) // No auto-dismiss
        .show()?;
    Ok(())
}

/// Terminal fallback: bell plus the message on stderr.
pub fn alert(title: &str, body: &str) {
    info!("{}: {}", title, body);
    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "\x07\n🔔 {} - {}", title, body);
    let _ = stderr.flush();
}
