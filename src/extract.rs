//! UPI payment URI extraction from raw scanned text.
//!
//! Input comes straight off a QR decode (camera frame, uploaded image, or a
//! pasted Android intent string) so no shape can be assumed. Patterns are
//! compiled once and tried in priority order; no match is an expected outcome,
//! not an error.

use regex::Regex;
use tracing::debug;

use crate::query::UpiQuery;

/// The isolated payment URI and its detached query string.
///
/// `raw_upi_uri` always begins with `upi://pay?`; `query` never carries a
/// leading `?`. Immutable after creation: an amended query is threaded
/// separately through the rest of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpiParts {
    pub raw_upi_uri: String,
    pub query: UpiQuery,
}

/// Pre-compiled extraction patterns.
pub struct UpiExtractor {
    /// `upi://pay?` followed by anything up to `#` or whitespace.
    standalone: Regex,
    /// Same prefix, but also terminated by `;` or `"` — intent-wrapped
    /// payloads append `;package=...;end` metadata after the URI.
    intent_embedded: Regex,
    /// A bare `pa=` parameter anchored at start-of-string or after `?`/`&`.
    bare_query: Regex,
}

impl UpiExtractor {
    pub fn new() -> Self {
        Self {
            standalone: Regex::new(r"(?i)upi://pay\?[^#\s]+").unwrap(),
            intent_embedded: Regex::new(r#"(?i)upi://pay\?[^;"\s]+"#).unwrap(),
            bare_query: Regex::new(r"(^|[?&])pa=").unwrap(),
        }
    }

    /// Find a UPI payment URI in arbitrary text. First match wins:
    /// a standalone `upi://pay?...` URI, then an intent-embedded one, then a
    /// bare query fragment (from which the URI is synthesized). `None` means
    /// "not a UPI payload" — the caller owes the user a message, not a retry.
    pub fn extract(&self, raw: Option<&str>) -> Option<UpiParts> {
        let s = raw?.trim();
        if s.is_empty() {
            return None;
        }

        if let Some(m) = self.standalone.find(s) {
            let mut matched = m.as_str();
            // An intent-wrapped URI with no `#` terminator would otherwise
            // swallow the `;...;end` metadata into the query; tighten the
            // match to the intent terminators in that case.
            if matched.contains(';') || matched.contains('"') {
                if let Some(tight) = self.intent_embedded.find(s) {
                    matched = tight.as_str();
                }
            }
            debug!(uri = matched, "extracted upi uri");
            return Some(split_uri(matched));
        }

        if self.bare_query.is_match(s) {
            // Everything after the last `?`, or the whole string if none.
            let query = match s.rfind('?') {
                Some(idx) => &s[idx + 1..],
                None => s,
            };
            debug!(query, "synthesized upi uri from bare query");
            return Some(UpiParts {
                raw_upi_uri: format!("upi://pay?{query}"),
                query: UpiQuery::new(query),
            });
        }

        None
    }
}

impl Default for UpiExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn split_uri(raw_upi_uri: &str) -> UpiParts {
    let query = raw_upi_uri
        .split_once('?')
        .map(|(_, q)| q)
        .unwrap_or_default();
    UpiParts {
        raw_upi_uri: raw_upi_uri.to_string(),
        query: UpiQuery::new(query),
    }
}
