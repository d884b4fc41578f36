/// Non-blocking, user-facing notices raised when a reload degrades.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Routes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!("{message}");
    }
}
