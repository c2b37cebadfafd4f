//! vouch-verify: Response verification engine
//!
//! Checks an [`HttpResponse`](vouch_core::HttpResponse) against an
//! [`ExpectedSpec`](vouch_core::ExpectedSpec), collecting every failure
//! instead of stopping at the first one, and extracts values for later
//! stages of a test.
//!
//! ```no_run
//! use serde_json::json;
//! use vouch_core::{ExpectedSpec, HttpResponse};
//! use vouch_verify::{ExtensionRegistry, ResponseVerifier};
//!
//! let expected = ExpectedSpec::from_value(json!({
//!     "status_code": 201,
//!     "body": {"user.name": "alice"},
//!     "save": {"body": {"user_id": "user.id"}}
//! }))?;
//! let verifier = ResponseVerifier::new("create user", expected, &ExtensionRegistry::new())?;
//!
//! let response = HttpResponse::new(201).with_json(&json!({"user": {"id": 7, "name": "alice"}}));
//! let saved = verifier.verify(&response)?;
//! assert_eq!(saved["user_id"], json!(7));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod block;
pub mod extension;
pub mod http;
pub mod redirect;
pub mod saver;
pub mod verifier;

pub use block::{Templating, validate_block};
pub use extension::{
    ExtensionFault, ExtensionRef, ExtensionRegistry, ExtensionResolver, ResolveError,
    ResponseFunction,
};
pub use saver::save_values;
pub use verifier::{ResponseVerifier, VerifyError};
