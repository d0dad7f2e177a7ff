//! Error taxonomy for the payment handoff pipeline.
//!
//! Expected "no match" outcomes (not-a-UPI-payload, missing payee name) are
//! conveyed through `Option`/unchanged values by the parsing functions, never
//! through panics. The types here cover the conditions a caller has to show
//! to the user.

use thiserror::Error;

/// Why an entered amount was rejected before touching the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Please enter an amount")]
    Empty,
    #[error("Please enter a valid positive amount")]
    NotANumber,
    #[error("Please enter a valid positive amount")]
    NotPositive,
}

/// Pipeline-level failures surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandoffError {
    /// The scanned text contained no UPI payment URI and no `pa=` fragment.
    /// Non-retryable without a new scan.
    #[error("This QR code is not a UPI payment code")]
    NotAPaymentPayload,
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),
}

/// Failures of the capture surface (live camera or uploaded image).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Camera requires a secure connection (HTTPS)")]
    InsecureContext,
    #[error("Camera access not supported by this browser")]
    Unsupported,
    #[error("Camera permission denied")]
    PermissionDenied,
    #[error("No suitable camera found")]
    NoCamera,
    #[error("Could not start the camera stream: {0}")]
    StreamFailed(String),
    #[error("Could not process the image: {0}")]
    UnreadableImage(String),
    #[error("No QR code found in the uploaded image")]
    NoCodeFound,
    #[error("Capture session already closed")]
    SourceClosed,
}

impl CaptureError {
    /// Remediation hint shown alongside the message, when one exists.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            CaptureError::InsecureContext => Some("Use https:// or a dev tunnel like ngrok."),
            CaptureError::Unsupported => Some("Try Chrome (Android) or Safari (iOS)."),
            CaptureError::PermissionDenied => {
                Some("Please allow camera access in your browser settings and reload.")
            }
            _ => None,
        }
    }

    /// Uploaded-image failures may simply be retried with another file;
    /// camera acquisition failures may not.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            CaptureError::UnreadableImage(_) | CaptureError::NoCodeFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hints_only_on_acquisition_errors() {
        assert!(CaptureError::InsecureContext.hint().is_some());
        assert!(CaptureError::PermissionDenied.hint().is_some());
        assert!(CaptureError::NoCodeFound.hint().is_none());
        assert!(CaptureError::NoCamera.hint().is_none());
    }

    #[test]
    fn test_upload_errors_are_retryable() {
        assert!(CaptureError::NoCodeFound.retryable());
        assert!(CaptureError::UnreadableImage("bad png".into()).retryable());
        assert!(!CaptureError::PermissionDenied.retryable());
    }

    #[test]
    fn test_amount_error_wraps_into_handoff_error() {
        let err: HandoffError = AmountError::Empty.into();
        assert_eq!(err, HandoffError::InvalidAmount(AmountError::Empty));
    }
}
