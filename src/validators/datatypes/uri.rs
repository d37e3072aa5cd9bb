//! anyURI
//!
//! A value is accepted when, after escaping the characters XLink requires
//! to be escaped, it resolves as a URI reference against a fixed absolute
//! base. The actual value is the lexical form itself.

use super::TypeValidator;
use crate::error::{ValueError, ValueResult};
use crate::validators::context::ValidationContext;
use crate::validators::facets::FacetMask;
use crate::validators::values::ActualValue;
use once_cell::sync::Lazy;
use url::Url;

static BASE_URI: Lazy<Option<Url>> = Lazy::new(|| Url::parse("abc://def.ghi.jkl").ok());

fn needs_escape(c: char) -> bool {
    !c.is_ascii()
        || c.is_ascii_control()
        || matches!(c, ' ' | '<' | '>' | '"' | '{' | '}' | '|' | '\\' | '^' | '`')
}

/// Percent-encode the characters that may not appear raw in a URI
pub(crate) fn escape_uri(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut buf = [0u8; 4];
    for c in content.chars() {
        if needs_escape(c) {
            for b in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", b));
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn has_valid_escapes(uri: &str) -> bool {
    let bytes = uri.as_bytes();
    bytes.iter().enumerate().all(|(i, b)| {
        *b != b'%'
            || (i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit())
    })
}

fn has_valid_scheme(uri: &str) -> bool {
    let end = uri.find(['/', '?', '#']).unwrap_or(uri.len());
    match uri[..end].find(':') {
        None => true,
        Some(0) => false,
        Some(colon) => {
            let scheme = &uri[..colon];
            let mut chars = scheme.chars();
            chars.next().map_or(false, |c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
    }
}

/// Whether a lexical form is a valid URI reference
pub(crate) fn is_valid_uri_reference(content: &str) -> bool {
    if content.is_empty() {
        return true;
    }
    let encoded = escape_uri(content);
    if encoded.matches('#').count() > 1
        || !has_valid_escapes(&encoded)
        || !has_valid_scheme(&encoded)
    {
        return false;
    }
    match BASE_URI.as_ref() {
        Some(base) => base.join(&encoded).is_ok(),
        None => false,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnyUriDv;

impl TypeValidator for AnyUriDv {
    fn allowed_facets(&self) -> FacetMask {
        FacetMask::STRING_FACETS
    }

    fn parse(&self, content: &str, _ctx: &dyn ValidationContext) -> ValueResult<ActualValue> {
        if !is_valid_uri_reference(content) {
            return Err(ValueError::invalid_lexical(content, "anyURI"));
        }
        Ok(ActualValue::String(content.to_string()))
    }
}
