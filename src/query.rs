//! Safe get/set/ensure operations on a UPI query string.
//!
//! The query stays a flat `key=value&key=value` string the whole way through,
//! because that is how payment apps consume it: a structured parse/re-serialize
//! round trip would reorder or re-encode parameters that real-world QR payloads
//! depend on byte-for-byte. All edits are anchored on `(^|&)key=` so a value
//! that merely *contains* `key=` is never touched.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// Characters escaped when encoding a parameter value, matching JavaScript's
/// `encodeURIComponent` (keeps `A-Z a-z 0-9 - _ . ! ~ * ' ( )`).
pub(crate) const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A UPI query string: URL-encoded `key=value` pairs joined by `&`.
///
/// Keys are matched case-insensitively; casing and parameter order are
/// preserved on output. Invariant: never carries a leading `?`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpiQuery(String);

impl UpiQuery {
    pub fn new(query: impl Into<String>) -> Self {
        let q: String = query.into();
        // Uphold the no-leading-`?` invariant even on sloppy input.
        UpiQuery(q.trim_start_matches('?').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Set `key` to `value` (percent-encoded), returning a new query.
    ///
    /// If the key is already present (case-insensitive) its value is replaced
    /// in place, keeping the parameter's position and original key casing.
    /// Otherwise the pair is appended. All other parameters pass through
    /// untouched.
    pub fn set_param(&self, key: &str, value: &str) -> UpiQuery {
        let encoded = utf8_percent_encode(value, COMPONENT).to_string();

        if self.0.is_empty() {
            return UpiQuery(format!("{key}={encoded}"));
        }

        let mut replaced = false;
        let segments: Vec<String> = self
            .0
            .split('&')
            .map(|segment| {
                if replaced {
                    return segment.to_string();
                }
                match segment.split_once('=') {
                    Some((existing_key, _)) if existing_key.eq_ignore_ascii_case(key) => {
                        replaced = true;
                        format!("{existing_key}={encoded}")
                    }
                    _ => segment.to_string(),
                }
            })
            .collect();

        if replaced {
            UpiQuery(segments.join("&"))
        } else {
            UpiQuery(format!("{}&{key}={encoded}", self.0))
        }
    }

    /// Look up a parameter's raw (still-encoded) value, case-insensitive key.
    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.0.split('&').find_map(|segment| {
            segment
                .split_once('=')
                .filter(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
    }

    /// Append `cu=INR` unless a currency parameter already exists.
    /// Idempotent; an existing currency of any value is respected.
    pub fn ensure_currency(&self) -> UpiQuery {
        if self.get_raw("cu").is_some() {
            return self.clone();
        }
        if self.0.is_empty() {
            UpiQuery("cu=INR".to_string())
        } else {
            UpiQuery(format!("{}&cu=INR", self.0))
        }
    }
}

impl From<String> for UpiQuery {
    fn from(query: String) -> Self {
        UpiQuery::new(query)
    }
}

impl From<&str> for UpiQuery {
    fn from(query: &str) -> Self {
        UpiQuery::new(query)
    }
}

impl std::fmt::Display for UpiQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_param_appends_when_missing() {
        let q = UpiQuery::new("pa=merchant@bank");
        assert_eq!(q.set_param("am", "250.00").as_str(), "pa=merchant@bank&am=250.00");
    }

    #[test]
    fn test_set_param_on_empty_query() {
        let q = UpiQuery::new("");
        assert_eq!(q.set_param("am", "5.00").as_str(), "am=5.00");
    }

    #[test]
    fn test_set_param_replaces_in_place() {
        let q = UpiQuery::new("a=1&b=2");
        assert_eq!(q.set_param("a", "9").as_str(), "a=9&b=2");
    }

    #[test]
    fn test_set_param_is_idempotent() {
        let q = UpiQuery::new("pa=x&pn=y");
        let once = q.set_param("am", "10.00");
        let twice = once.set_param("am", "10.00");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_set_param_key_match_is_case_insensitive_and_preserves_casing() {
        let q = UpiQuery::new("PA=x&Am=1.00");
        assert_eq!(q.set_param("am", "2.00").as_str(), "PA=x&Am=2.00");
    }

    #[test]
    fn test_set_param_ignores_key_inside_a_value() {
        // `am=` appears inside pn's value; only a real am parameter may change
        let q = UpiQuery::new("pn=am%3D5&pa=x");
        assert_eq!(q.set_param("am", "7.00").as_str(), "pn=am%3D5&pa=x&am=7.00");
    }

    #[test]
    fn test_set_param_encodes_value() {
        let q = UpiQuery::new("pa=x");
        assert_eq!(
            q.set_param("pn", "Grocery Store & Co").as_str(),
            "pa=x&pn=Grocery%20Store%20%26%20Co"
        );
    }

    #[test]
    fn test_encoding_keeps_unreserved_marks() {
        let q = UpiQuery::new("");
        assert_eq!(q.set_param("pn", "a-b_c.d!e~f*g'h(i)").as_str(), "pn=a-b_c.d!e~f*g'h(i)");
    }

    #[test]
    fn test_ensure_currency_appends_inr() {
        assert_eq!(UpiQuery::new("pa=x").ensure_currency().as_str(), "pa=x&cu=INR");
    }

    #[test]
    fn test_ensure_currency_respects_existing() {
        assert_eq!(
            UpiQuery::new("pa=x&cu=USD").ensure_currency().as_str(),
            "pa=x&cu=USD"
        );
        assert_eq!(
            UpiQuery::new("pa=x&CU=usd").ensure_currency().as_str(),
            "pa=x&CU=usd"
        );
    }

    #[test]
    fn test_ensure_currency_is_idempotent() {
        let q = UpiQuery::new("pa=x&am=1.00");
        let once = q.ensure_currency();
        assert_eq!(once.ensure_currency(), once);
    }

    #[test]
    fn test_leading_question_mark_is_stripped() {
        assert_eq!(UpiQuery::new("?pa=x").as_str(), "pa=x");
    }
}
