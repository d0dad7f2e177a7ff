//! End-to-end assembly of one payment attempt: scanned text in, amended
//! query and display metadata out. The deep-link handoff itself stays with
//! [`crate::dispatch`].

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::amount::normalize_amount;
use crate::error::HandoffError;
use crate::extract::UpiExtractor;
use crate::meta::{read_meta, PayeeMeta};
use crate::query::UpiQuery;

/// Everything the dispatcher and the UI need for one payment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// The URI as matched in the scan, unamended.
    pub raw_upi_uri: String,
    /// The final query: original parameters plus `am` and `cu=INR`.
    pub query: UpiQuery,
    pub payee: PayeeMeta,
}

/// Build a dispatchable payment intent from raw scan text and a user-entered
/// amount.
///
/// The amount is validated before the query is touched; on rejection the
/// query is left unamended and the error carries the user-facing message.
/// A query whose payee name cannot be decoded degrades to an empty display
/// name rather than failing the payment.
pub fn prepare_payment(
    raw_text: &str,
    amount_input: &str,
    extractor: &UpiExtractor,
) -> Result<PaymentIntent, HandoffError> {
    let parts = extractor
        .extract(Some(raw_text))
        .ok_or(HandoffError::NotAPaymentPayload)?;

    let payee = read_meta(&parts.query).unwrap_or_else(|| PayeeMeta { pn: String::new() });

    let amount = normalize_amount(amount_input)?;

    let query = parts
        .query
        .set_param("am", &amount)
        .ensure_currency();

    info!(
        payee = %payee.pn,
        amount = %amount,
        "payment intent prepared"
    );

    Ok(PaymentIntent {
        raw_upi_uri: parts.raw_upi_uri,
        query,
        payee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AmountError;

    #[test]
    fn test_scan_to_intent_end_to_end() {
        let extractor = UpiExtractor::new();
        let intent = prepare_payment(
            "upi://pay?pa=merchant@bank&pn=Grocery%20Store",
            "250",
            &extractor,
        )
        .unwrap();

        assert_eq!(intent.raw_upi_uri, "upi://pay?pa=merchant@bank&pn=Grocery%20Store");
        assert_eq!(intent.payee.pn, "Grocery Store");
        assert_eq!(
            intent.query.as_str(),
            "pa=merchant@bank&pn=Grocery%20Store&am=250.00&cu=INR"
        );
    }

    #[test]
    fn test_existing_currency_is_kept() {
        let extractor = UpiExtractor::new();
        let intent = prepare_payment("upi://pay?pa=x&cu=USD", "9.5", &extractor).unwrap();
        assert_eq!(intent.query.as_str(), "pa=x&cu=USD&am=9.50");
    }

    #[test]
    fn test_non_payment_text_is_rejected() {
        let extractor = UpiExtractor::new();
        assert_eq!(
            prepare_payment("https://example.com", "10", &extractor),
            Err(HandoffError::NotAPaymentPayload)
        );
    }

    #[test]
    fn test_bad_amount_rejected_before_query_mutation() {
        let extractor = UpiExtractor::new();
        for bad in ["", "0", "-5"] {
            let err = prepare_payment("upi://pay?pa=x", bad, &extractor).unwrap_err();
            assert!(matches!(err, HandoffError::InvalidAmount(_)), "{bad:?}: {err:?}");
        }
        assert_eq!(
            prepare_payment("upi://pay?pa=x", "", &extractor),
            Err(HandoffError::InvalidAmount(AmountError::Empty))
        );
    }

    #[test]
    fn test_undecodable_payee_name_degrades_to_empty() {
        let extractor = UpiExtractor::new();
        let intent = prepare_payment("upi://pay?pa=x&pn=%FF", "5", &extractor).unwrap();
        assert_eq!(intent.payee.pn, "");
        assert_eq!(intent.query.as_str(), "pa=x&pn=%FF&am=5.00&cu=INR");
    }
}
