//! Verification results and their serializable report form

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::collector::render_bullets;

/// Result of verifying one response: collected errors plus saved values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerificationOutcome {
    /// Errors in the order they were found; empty means success
    pub errors: Vec<String>,
    /// save-name → extracted value
    pub saved: Map<String, Value>,
}

impl VerificationOutcome {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    /// Bulleted error report.
    #[must_use]
    pub fn render(&self) -> String {
        render_bullets(&self.errors)
    }
}

/// Machine-readable summary of one verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VerificationReport {
    /// Test name
    pub name: String,
    pub passed: bool,
    /// Actual status code of the response
    pub status_code: u16,
    #[serde(default)]
    pub errors: Vec<String>,
    /// Values saved for later stages
    #[serde(default)]
    pub saved: Map<String, Value>,
}

impl VerificationReport {
    #[must_use]
    pub fn new(name: impl Into<String>, status_code: u16, outcome: VerificationOutcome) -> Self {
        Self {
            name: name.into(),
            passed: outcome.passed(),
            status_code,
            errors: outcome.errors,
            saved: outcome.saved,
        }
    }
}

/// JSON Schema of [`VerificationReport`].
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(VerificationReport);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
