//! Utility functions and helpers

use std::sync::Arc;

/// Format a number with thousands separators
///
/// Accepts anything whose `Display` output is a plain decimal number, so the
/// sign and any fractional part are kept as-is: `-1234567.5` becomes
/// `-1,234,567.5`.
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let (sign, unsigned) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::new();
    let mut count = 0;
    for c in int_part.chars().rev() {
        if count == 3 {
            grouped.push(',');
            count = 0;
        }
        grouped.push(c);
        count += 1;
    }
    let mut result: String = sign.to_string();
    result.extend(grouped.chars().rev());
    if let Some(frac) = frac_part {
        result.push('.');
        result.push_str(frac);
    }
    result
}

/// Escape text for safe inclusion in HTML responses
pub fn sanitize_html(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ==================== Event Logging ====================

/// Shared logger handle passed into component constructors
pub type LoggerRef = Arc<dyn EventLogger>;

/// Logger handle injected into each pipeline component
pub trait EventLogger: Send + Sync {
    /// Log a failure together with the operation it interrupted
    fn log_error(&self, operation: &str, message: &str);
    /// Log a recoverable oddity
    fn log_warning(&self, operation: &str, message: &str);
    /// Log a progress milestone
    fn log_info(&self, operation: &str, message: &str);
    /// Log debug information
    fn log_debug(&self, operation: &str, message: &str);
}

/// Default logger forwarding to the `log` facade
#[derive(Debug, Clone)]
pub struct DefaultEventLogger {
    target: String,
}

impl DefaultEventLogger {
    /// Create a logger writing under `kakeibo::<component>`
    pub fn new(component: &str) -> Self {
        Self {
            target: format!("kakeibo::{}", component),
        }
    }

    /// Convenience constructor returning a shared handle
    pub fn shared(component: &str) -> LoggerRef {
        Arc::new(Self::new(component))
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl EventLogger for DefaultEventLogger {
    fn log_error(&self, operation: &str, message: &str) {
        log::error!(target: &self.target, "{} failed: {}", operation, message);
    }

    fn log_warning(&self, operation: &str, message: &str) {
        log::warn!(target: &self.target, "{}: {}", operation, message);
    }

    fn log_info(&self, operation: &str, message: &str) {
        log::info!(target: &self.target, "{}: {}", operation, message);
    }

    fn log_debug(&self, operation: &str, message: &str) {
        log::debug!(target: &self.target, "{}: {}", operation, message);
    }
}

/// Logger that keeps every event in memory, for assertions in tests
#[derive(Debug, Default)]
pub struct RecordingEventLogger {
    events: std::sync::Mutex<Vec<(LogLevel, String)>>,
}

/// Level attached to a recorded event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warning,
    Info,
    Debug,
}

impl RecordingEventLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, oldest first
    pub fn events(&self) -> Vec<(LogLevel, String)> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Messages recorded at the given level
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    fn record(&self, level: LogLevel, operation: &str, message: &str) {
        let entry = (level, format!("{}: {}", operation, message));
        match self.events.lock() {
            Ok(mut events) => events.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

impl EventLogger for RecordingEventLogger {
    fn log_error(&self, operation: &str, message: &str) {
        self.record(LogLevel::Error, operation, message);
    }

    fn log_warning(&self, operation: &str, message: &str) {
        self.record(LogLevel::Warning, operation, message);
    }

    fn log_info(&self, operation: &str, message: &str) {
        self.record(LogLevel::Info, operation, message);
    }

    fn log_debug(&self, operation: &str, message: &str) {
        self.record(LogLevel::Debug, operation, message);
    }
}
