//! vouch-core: Core types for declarative HTTP response verification
//!
//! This crate provides the data model shared by the verification engine:
//! expected-response specifications, key-path resolution, error collection,
//! value matching, placeholder templating and project configuration.

pub mod collector;
pub mod config;
pub mod keypath;
pub mod matching;
pub mod report;
pub mod response;
pub mod section;
pub mod spec;
pub mod template;

pub use collector::ErrorCollector;
pub use config::{Config, ConfigError};
pub use keypath::{KeyMatch, KeyPath, KeyPathError};
pub use matching::{Expectation, is_empty_value, values_match};
pub use report::{VerificationOutcome, VerificationReport};
pub use response::{Headers, HttpResponse, ResponseSnapshot};
pub use section::SectionKind;
pub use spec::{ExpectedSpec, ExtSpec, SaveSpec, SpecError};
pub use template::{FormatError, FormatKeys, PlaceholderResolver, Variables};
