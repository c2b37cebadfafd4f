//! Accumulates human-readable verification errors
//!
//! Nothing here ever fails: every check appends a line and moves on. The
//! rendered list is the user-facing report.

use std::error::Error;

/// Append-only list of diagnostic messages for one verification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorCollector {
    messages: Vec<String>,
}

impl ErrorCollector {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Record one error line.
    pub fn add(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{message}");
        self.messages.push(message);
    }

    /// Record an error caused by `fault`.
    ///
    /// The full fault chain goes to the log; only `message` is kept for the
    /// report.
    pub fn add_fault(&mut self, message: impl Into<String>, fault: &(dyn Error + 'static)) {
        let message = message.into();
        tracing::error!(error = %fault_chain(fault), "{message}");
        self.messages.push(message);
    }

    /// Append everything collected by `other`, preserving order.
    pub fn extend(&mut self, other: Self) {
        self.messages.extend(other.messages);
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.messages.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    #[must_use]
    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }

    /// Render as a bulleted list, one `- message` per line.
    #[must_use]
    pub fn render(&self) -> String {
        render_bullets(&self.messages)
    }
}

/// Bulleted rendering shared by the collector and finished outcomes.
#[must_use]
pub fn render_bullets(messages: &[String]) -> String {
    messages
        .iter()
        .map(|m| format!("- {m}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `Display` of an error followed by each `source()`, one per line.
#[must_use]
pub fn fault_chain(fault: &(dyn Error + 'static)) -> String {
    let mut out = fault.to_string();
    let mut source = fault.source();
    while let Some(cause) = source {
        out.push_str("\ncaused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// Indent every line of `text` by four spaces.
///
/// A JSON `null` dump is shown as `<No body>`.
#[must_use]
pub fn indent_err_text(text: &str) -> String {
    let text = if text == "null" { "<No body>" } else { text };
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("    {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
