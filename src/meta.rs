//! Read-only projection of a UPI query for display purposes.

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::query::UpiQuery;

/// Display fields pulled out of the query. Only the payee name today; other
/// UPI fields (`mc`, `tn`, ...) slot in here if the UI ever needs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayeeMeta {
    pub pn: String,
}

/// Decode the payee name from a UPI query.
///
/// A missing `pn` yields an empty string — amount entry can proceed without a
/// display name. `None` means the query itself could not be decoded (invalid
/// UTF-8 behind the percent-encoding) and is to be treated as "could not
/// extract name", not "invalid payment".
pub fn read_meta(query: &UpiQuery) -> Option<PayeeMeta> {
    let mut pn = String::new();
    for segment in query.as_str().split('&') {
        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        let decoded = match decode_component(value) {
            Some(v) => v,
            None => {
                warn!(segment, "malformed percent-encoding in upi query");
                return None;
            }
        };
        if pn.is_empty() && key.eq_ignore_ascii_case("pn") {
            pn = decoded;
        }
    }
    Some(PayeeMeta { pn })
}

/// URL-component decode with form semantics: `+` is a space, `%xx` is a byte.
fn decode_component(value: &str) -> Option<String> {
    let spaced = value.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .ok()
        .map(|cow| cow.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(q: &str) -> Option<PayeeMeta> {
        read_meta(&UpiQuery::new(q))
    }

    #[test]
    fn test_reads_percent_encoded_name() {
        let m = meta("pa=merchant@bank&pn=Grocery%20Store").unwrap();
        assert_eq!(m.pn, "Grocery Store");
    }

    #[test]
    fn test_plus_decodes_to_space() {
        assert_eq!(meta("pn=Tea+Stall").unwrap().pn, "Tea Stall");
    }

    #[test]
    fn test_missing_pn_degrades_to_empty_name() {
        assert_eq!(meta("pa=merchant@bank&am=5.00").unwrap().pn, "");
        assert_eq!(meta("").unwrap().pn, "");
    }

    #[test]
    fn test_key_lookup_is_case_insensitive() {
        assert_eq!(meta("PN=Shop").unwrap().pn, "Shop");
    }

    #[test]
    fn test_first_pn_wins() {
        assert_eq!(meta("pn=First&pn=Second").unwrap().pn, "First");
    }

    #[test]
    fn test_invalid_utf8_encoding_returns_none() {
        assert!(meta("pn=%FF%FE").is_none());
    }

    #[test]
    fn test_stray_percent_passes_through() {
        // An incomplete escape is kept literally rather than rejected
        assert_eq!(meta("pn=50%").unwrap().pn, "50%");
    }
}
