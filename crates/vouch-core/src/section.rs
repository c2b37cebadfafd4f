//! The three extractable parts of a response

use crate::keypath::KeyMatch;

/// One logical section of a response that can be validated or saved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Body,
    Headers,
    RedirectQueryParams,
}

impl SectionKind {
    /// Verification order: body, headers, redirect query params.
    pub const ALL: [Self; 3] = [Self::Body, Self::Headers, Self::RedirectQueryParams];

    /// Name used in expected-response documents and error messages
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Headers => "headers",
            Self::RedirectQueryParams => "redirect_query_params",
        }
    }

    /// Header names are case-insensitive; everything else is exact.
    #[must_use]
    pub const fn key_match(self) -> KeyMatch {
        match self {
            Self::Headers => KeyMatch::IgnoreAsciiCase,
            Self::Body | Self::RedirectQueryParams => KeyMatch::Exact,
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
