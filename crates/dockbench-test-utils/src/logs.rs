//! Capture WARN and ERROR log entries emitted during a test.
//!
//! Cleanup reports residual resources only through logs, so tests assert on
//! the number and content of warnings. Install a capture with
//! [`LogCapture::install`] and keep the guard alive for the test body.
//!
//! The guard sets a thread-local default subscriber, so it sees events from
//! tasks spawned on a current-thread runtime (the `#[tokio::test]` default).

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

/// A captured log entry.
#[derive(Debug, Clone)]
pub struct CapturedLog {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl CapturedLog {
    /// Value of a structured field, if present
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Captures ERROR and WARN level log entries.
///
/// Clone this to get a handle for assertions while the layer keeps
/// recording.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<CapturedLog>>>,
}

impl LogCapture {
    /// Create an empty capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a capture and install it as the thread's default subscriber.
    pub fn install() -> (Self, DefaultGuard) {
        let capture = Self::new();
        let subscriber =
            tracing_subscriber::registry().with(LogCaptureLayer::new(capture.clone()));
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    /// All captured WARN entries
    pub fn warnings(&self) -> Vec<CapturedLog> {
        self.at(Level::WARN)
    }

    /// All captured ERROR entries
    pub fn errors(&self) -> Vec<CapturedLog> {
        self.at(Level::ERROR)
    }

    /// Returns true if there are any captured entries.
    pub fn has_entries(&self) -> bool {
        !self.buffer.lock().unwrap().is_empty()
    }

    fn at(&self, level: Level) -> Vec<CapturedLog> {
        self.buffer
            .lock()
            .unwrap()
            .iter()
            .filter(|log| log.level == level)
            .cloned()
            .collect()
    }

    fn push(&self, log: CapturedLog) {
        self.buffer.lock().unwrap().push(log);
    }
}

/// Visitor that splits a tracing event into its message and fields.
#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            write!(&mut self.message, "{:?}", value).ok();
        } else {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields
                .push((field.name().to_string(), value.to_string()));
        }
    }
}

/// Tracing layer that captures ERROR and WARN events.
#[derive(Debug, Clone)]
pub struct LogCaptureLayer {
    capture: LogCapture,
}

impl LogCaptureLayer {
    /// Create a new log capture layer.
    pub fn new(capture: LogCapture) -> Self {
        Self { capture }
    }
}

impl<S> Layer<S> for LogCaptureLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();

        // Only capture ERROR and WARN
        if level != Level::ERROR && level != Level::WARN {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        self.capture.push(CapturedLog {
            level,
            target: event.metadata().target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_warn_and_error_only() {
        let (capture, _guard) = LogCapture::install();

        tracing::info!("ignored");
        tracing::debug!("ignored");
        tracing::warn!(kind = "image", id = %"abc", "Something odd");
        tracing::error!("Something broke");

        let warnings = capture.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "Something odd");
        assert_eq!(warnings[0].field("kind"), Some("image"));
        assert_eq!(warnings[0].field("id"), Some("abc"));
        assert_eq!(capture.errors().len(), 1);
    }

    #[test]
    fn test_capture_empty() {
        let (capture, _guard) = LogCapture::install();
        tracing::info!("nothing to see");
        assert!(!capture.has_entries());
    }
}
