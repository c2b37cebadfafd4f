//! Verification of one response against its expected specification
//!
//! Checks run in a fixed order and never stop early:
//!
//! 1. status code
//! 2. `body.$ext` validator
//! 3. saving from body, headers, redirect query params, then `save.$ext`
//! 4. block validation of body, headers, redirect query params
//!
//! Every problem lands in one [`ErrorCollector`]; the caller gets either the
//! saved values or a single [`VerifyError::TestFailed`] with the full report.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use vouch_core::collector::indent_err_text;
use vouch_core::template::{FormatKeys, PlaceholderResolver, Variables};
use vouch_core::{
    Config, ErrorCollector, ExpectedSpec, HttpResponse, SectionKind, SpecError,
    VerificationOutcome,
};

use crate::block::{Templating, validate_block};
use crate::extension::{ExtensionRef, ExtensionResolver, ResolveError};
use crate::redirect;
use crate::saver::save_values;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("Test '{name}' failed:\n{report}")]
    TestFailed { name: String, report: String },
    #[error(transparent)]
    Spec(#[from] SpecError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// The three sections of a response, extracted once per verification.
struct ResponseView {
    body: Option<Value>,
    headers: Value,
    redirect_query_params: Value,
    /// Whether the redirect header was present at all
    has_redirect: bool,
}

impl ResponseView {
    fn section(&self, kind: SectionKind) -> Option<&Value> {
        match kind {
            SectionKind::Body => self.body.as_ref(),
            SectionKind::Headers => Some(&self.headers),
            SectionKind::RedirectQueryParams => Some(&self.redirect_query_params),
        }
    }
}

/// Verifies responses against one [`ExpectedSpec`].
pub struct ResponseVerifier {
    name: String,
    expected: ExpectedSpec,
    validate_function: Option<ExtensionRef>,
    save_function: Option<ExtensionRef>,
    variables: Variables,
    placeholders: Arc<dyn PlaceholderResolver>,
    redirect_header: String,
}

impl std::fmt::Debug for ResponseVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseVerifier")
            .field("name", &self.name)
            .field("expected", &self.expected)
            .field("validate_function", &self.validate_function)
            .field("save_function", &self.save_function)
            .field("redirect_header", &self.redirect_header)
            .finish_non_exhaustive()
    }
}

impl ResponseVerifier {
    /// Resolve the `$ext` references and build a verifier.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Spec`] for a malformed `$ext` block and
    /// [`VerifyError::Resolve`] for a reference the resolver does not know.
    pub fn new(
        name: impl Into<String>,
        expected: ExpectedSpec,
        resolver: &dyn ExtensionResolver,
    ) -> Result<Self, VerifyError> {
        let validate_function = expected
            .body_ext()?
            .map(|ext| resolver.resolve(&ext))
            .transpose()?;
        let save_function = expected
            .save_ext()
            .map(|ext| resolver.resolve(ext))
            .transpose()?;

        Ok(Self {
            name: name.into(),
            expected,
            validate_function,
            save_function,
            variables: Variables::new(),
            placeholders: Arc::new(FormatKeys),
            redirect_header: vouch_core::config::DEFAULT_REDIRECT_HEADER.to_string(),
        })
    }

    /// Build a verifier using project configuration.
    ///
    /// # Errors
    ///
    /// Same as [`ResponseVerifier::new`].
    pub fn from_config(
        name: impl Into<String>,
        expected: ExpectedSpec,
        resolver: &dyn ExtensionResolver,
        config: &Config,
    ) -> Result<Self, VerifyError> {
        Ok(Self::new(name, expected, resolver)?
            .with_variables(config.variables.clone())
            .with_redirect_header(config.redirect_header.clone()))
    }

    /// Variables for `{name}` placeholders in expected values.
    #[must_use]
    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    #[must_use]
    pub fn with_placeholders(mut self, placeholders: Arc<dyn PlaceholderResolver>) -> Self {
        self.placeholders = placeholders;
        self
    }

    #[must_use]
    pub fn with_redirect_header(mut self, header: impl Into<String>) -> Self {
        self.redirect_header = header.into();
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn expected(&self) -> &ExpectedSpec {
        &self.expected
    }

    /// Verify `response`, returning values saved for later stages.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::TestFailed`] carrying the full report if any
    /// check failed. Values may have been saved even then; use
    /// [`ResponseVerifier::evaluate`] to get both.
    pub fn verify(&self, response: &HttpResponse) -> Result<Map<String, Value>, VerifyError> {
        let outcome = self.evaluate(response);
        if outcome.passed() {
            Ok(outcome.saved)
        } else {
            Err(VerifyError::TestFailed {
                name: self.name.clone(),
                report: outcome.render(),
            })
        }
    }

    /// Run every check and return all errors together with saved values.
    #[must_use]
    pub fn evaluate(&self, response: &HttpResponse) -> VerificationOutcome {
        debug!(test = %self.name, status = response.status, "Verifying response");

        let mut errors = ErrorCollector::new();
        let body = response.json();

        self.check_status(response.status, body.as_ref(), &mut errors);

        if let Some(validate) = &self.validate_function {
            validate.validate(response, &mut errors);
        }

        let view = self.extract_view(response, body, &mut errors);

        let mut saved = Map::new();
        for kind in SectionKind::ALL {
            if kind == SectionKind::RedirectQueryParams && !view.has_redirect {
                // already reported while extracting the view
                continue;
            }
            saved.extend(save_values(
                kind,
                view.section(kind),
                self.expected.save_section(kind),
                &mut errors,
            ));
        }

        match &self.save_function {
            Some(save) => saved.extend(save.save(response, &mut errors)),
            None => debug!("No save function"),
        }

        let templating = Templating {
            placeholders: self.placeholders.as_ref(),
            variables: &self.variables,
        };
        for kind in SectionKind::ALL {
            validate_block(
                kind,
                view.section(kind),
                self.expected.raw_section(kind).as_ref(),
                templating,
                &mut errors,
            );
        }

        VerificationOutcome {
            errors: errors.into_messages(),
            saved,
        }
    }

    fn check_status(&self, actual: u16, body: Option<&Value>, errors: &mut ErrorCollector) {
        let expected = self.expected.status_code;
        if actual == expected {
            return;
        }
        if (400..500).contains(&actual) {
            let dump = body
                .and_then(|b| serde_json::to_string_pretty(b).ok())
                .unwrap_or_else(|| "null".to_string());
            errors.add(format!(
                "Status code was {actual}, expected {expected}:\n{}",
                indent_err_text(&dump)
            ));
        } else {
            errors.add(format!("Status code was {actual}, expected {expected}"));
        }
    }

    fn extract_view(
        &self,
        response: &HttpResponse,
        body: Option<Value>,
        errors: &mut ErrorCollector,
    ) -> ResponseView {
        let location = response.headers.get(&self.redirect_header);

        let redirect_query_params = match location {
            Some(url) => redirect::query_params(url),
            None => {
                if let Some(wanted) = self.expected.save_section(SectionKind::RedirectQueryParams) {
                    errors.add(format!(
                        "Wanted to save {}, but there was no redirect url in response",
                        serde_json::to_string(wanted).unwrap_or_default()
                    ));
                }
                Map::new()
            }
        };

        ResponseView {
            body,
            headers: response.headers.to_value(),
            redirect_query_params: Value::Object(redirect_query_params),
            has_redirect: location.is_some(),
        }
    }
}
