//! QR-to-payment-intent pipeline for supervised UPI payments.
//!
//! Scanned text goes in one end; a platform-specific deep-link handoff to a
//! payment app comes out the other. The stages, in data-flow order:
//!
//! - [`capture`] — camera-frame and uploaded-image producers of raw text
//! - [`extract`] — isolates a `upi://pay?` URI and its query from the text
//! - [`meta`] — reads display fields (payee name) out of the query
//! - [`amount`] — validates and fixes the entered amount to two decimals
//! - [`query`] — string-safe `am`/`cu` injection without re-serialization
//! - [`dispatch`] — timed, visibility-based deep-link fallback chain
//!
//! Persistent state (users, balances, transactions) lives in a hosted
//! backend and is out of scope here; this crate only manipulates the
//! transient payment attempt.

pub mod amount;
pub mod capture;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod meta;
pub mod pipeline;
pub mod query;

pub use amount::normalize_amount;
pub use capture::{decode_image, CaptureSession, Frame, FrameSource, QrDecode};
pub use config::DispatchPolicy;
pub use dispatch::{Dispatcher, NavigationHost, Platform, Visibility};
pub use error::{AmountError, CaptureError, HandoffError};
pub use extract::{UpiExtractor, UpiParts};
pub use meta::{read_meta, PayeeMeta};
pub use pipeline::{prepare_payment, PaymentIntent};
pub use query::UpiQuery;
