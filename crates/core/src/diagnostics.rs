//! Message log collecting non-fatal import diagnostics.
//!
//! Every message is also emitted as a `tracing` event, so a subscriber sees
//! the same stream the log records.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    pub severity: Severity,
    pub text: String,
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Info => write!(f, "{}", self.text),
            Severity::Error => write!(f, "error: {}", self.text),
        }
    }
}

/// Fire-and-forget diagnostics sink.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<LogMessage>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_msg(&mut self, text: impl Into<String>) {
        let text = text.into();
        info!(target: "dwarfone::import", "{text}");
        self.messages.push(LogMessage { severity: Severity::Info, text });
    }

    /// Record an error, including its source chain.
    pub fn append_exception(&mut self, err: &(dyn Error + 'static)) {
        let mut text = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            text.push_str(": ");
            text.push_str(&cause.to_string());
            source = cause.source();
        }
        warn!(target: "dwarfone::import", "{text}");
        self.messages.push(LogMessage { severity: Severity::Error, text });
    }

    pub fn messages(&self) -> &[LogMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|m| m.severity == Severity::Error).count()
    }
}
