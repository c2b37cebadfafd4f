//! Pluggable validator and saver functions
//!
//! An extension is referenced from an expected-response document as
//!
//! ```yaml
//! $ext:
//!   function: module:function
//!   extra_kwargs:
//!     key: value
//! ```
//!
//! The verifier only sees [`ExtensionRef`]s produced by an
//! [`ExtensionResolver`]. Faults raised by an extension, whether returned
//! errors or panics, are recorded as collected errors and never abort the
//! verification.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use serde_json::{Map, Value};

use vouch_core::collector::{ErrorCollector, fault_chain, indent_err_text};
use vouch_core::matching::{display_value, is_empty_value};
use vouch_core::{ExtSpec, HttpResponse};

/// Error type extension functions may return.
pub type ExtensionFault = Box<dyn std::error::Error + Send + Sync>;

/// A function invoked against a completed response.
///
/// Validators return any value (ignored). Savers return a mapping of
/// save-name → value, or `null`.
pub trait ResponseFunction: Send + Sync {
    /// # Errors
    ///
    /// Any error is reported as a failed check.
    fn call(&self, response: &HttpResponse, kwargs: &Map<String, Value>)
    -> Result<Value, ExtensionFault>;
}

impl<F> ResponseFunction for F
where
    F: Fn(&HttpResponse, &Map<String, Value>) -> Result<Value, ExtensionFault> + Send + Sync,
{
    fn call(
        &self,
        response: &HttpResponse,
        kwargs: &Map<String, Value>,
    ) -> Result<Value, ExtensionFault> {
        self(response, kwargs)
    }
}

/// A resolved extension function with its bound keyword arguments.
#[derive(Clone)]
pub struct ExtensionRef {
    reference: String,
    function: Arc<dyn ResponseFunction>,
    kwargs: Map<String, Value>,
}

impl std::fmt::Debug for ExtensionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionRef")
            .field("reference", &self.reference)
            .field("kwargs", &self.kwargs)
            .finish_non_exhaustive()
    }
}

/// How an extension call went wrong.
enum Fault {
    Returned(ExtensionFault),
    Panicked(String),
}

impl Fault {
    fn trace(&self) -> String {
        match self {
            Self::Returned(e) => fault_chain(&**e),
            Self::Panicked(msg) => format!("panicked: {msg}"),
        }
    }
}

impl ExtensionRef {
    #[must_use]
    pub fn new(
        reference: impl Into<String>,
        function: Arc<dyn ResponseFunction>,
        kwargs: Map<String, Value>,
    ) -> Self {
        Self {
            reference: reference.into(),
            function,
            kwargs,
        }
    }

    /// The `module:function` string this was resolved from.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    #[must_use]
    pub fn kwargs(&self) -> &Map<String, Value> {
        &self.kwargs
    }

    fn call_isolated(&self, response: &HttpResponse) -> Result<Value, Fault> {
        match catch_unwind(AssertUnwindSafe(|| {
            self.function.call(response, &self.kwargs)
        })) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(Fault::Returned(e)),
            Err(payload) => {
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic payload".to_string());
                Err(Fault::Panicked(msg))
            }
        }
    }

    fn record_fault(&self, kind: &str, fault: &Fault, errors: &mut ErrorCollector) {
        let message = format!(
            "Error calling {kind} function '{}':\n{}",
            self.reference,
            indent_err_text(&fault.trace())
        );
        match fault {
            Fault::Returned(e) => errors.add_fault(message, &**e),
            Fault::Panicked(_) => errors.add(message),
        }
    }

    /// Run as a validator. The return value is ignored.
    pub fn validate(&self, response: &HttpResponse, errors: &mut ErrorCollector) {
        if let Err(fault) = self.call_isolated(response) {
            self.record_fault("validate", &fault, errors);
        }
    }

    /// Run as a saver, returning the values to merge into the saved set.
    pub fn save(&self, response: &HttpResponse, errors: &mut ErrorCollector) -> Map<String, Value> {
        match self.call_isolated(response) {
            Ok(Value::Object(saved)) => saved,
            Ok(empty) if is_empty_value(&empty) => Map::new(),
            Ok(other) => {
                errors.add(format!(
                    "Unexpected return value '{}' from $ext save function",
                    display_value(&other)
                ));
                Map::new()
            }
            Err(fault) => {
                self.record_fault("save", &fault, errors);
                Map::new()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Extension reference '{0}' is not of the form module:function")]
    Malformed(String),
    #[error("No extension function registered as '{0}'")]
    NotFound(String),
}

/// Turns a DSL-level `$ext` reference into something callable.
pub trait ExtensionResolver {
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the reference cannot be resolved.
    fn resolve(&self, spec: &ExtSpec) -> Result<ExtensionRef, ResolveError>;
}

/// In-process table of extension functions keyed by `module:function`.
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    functions: HashMap<String, Arc<dyn ResponseFunction>>,
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("ExtensionRegistry")
            .field("functions", &names)
            .finish()
    }
}

impl ExtensionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure.
    pub fn register_fn<F>(&mut self, reference: impl Into<String>, function: F) -> &mut Self
    where
        F: Fn(&HttpResponse, &Map<String, Value>) -> Result<Value, ExtensionFault>
            + Send
            + Sync
            + 'static,
    {
        self.register(reference, Arc::new(function))
    }

    /// Register any [`ResponseFunction`].
    pub fn register(
        &mut self,
        reference: impl Into<String>,
        function: Arc<dyn ResponseFunction>,
    ) -> &mut Self {
        self.functions.insert(reference.into(), function);
        self
    }

    #[must_use]
    pub fn contains(&self, reference: &str) -> bool {
        self.functions.contains_key(reference)
    }
}

impl ExtensionResolver for ExtensionRegistry {
    fn resolve(&self, spec: &ExtSpec) -> Result<ExtensionRef, ResolveError> {
        let reference = spec.function.as_str();
        match reference.split_once(':') {
            Some((module, func)) if !module.is_empty() && !func.is_empty() => {}
            _ => return Err(ResolveError::Malformed(reference.to_string())),
        }
        let function = self
            .functions
            .get(reference)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(reference.to_string()))?;
        Ok(ExtensionRef::new(
            reference,
            function,
            spec.extra_kwargs.clone(),
        ))
    }
}
