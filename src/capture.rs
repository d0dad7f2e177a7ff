//! Capture surface: the two producers of raw scan text.
//!
//! Live capture pulls frames from a camera-owning [`FrameSource`] until the
//! first successful decode; static capture decodes one uploaded image. The
//! actual QR decoding sits behind [`QrDecode`] so decoder backends can be
//! swapped without touching session lifecycle.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::CaptureError;

/// A grayscale frame handed to the decoder.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub luma: Vec<u8>,
}

/// Camera-owning frame producer. An implementation holds the stream handle
/// exclusively; `stop` releases it (tracks stopped). Acquire a new source
/// only after the previous session is closed — the camera is never shared.
#[async_trait]
pub trait FrameSource: Send {
    /// Next frame at the runtime's frame cadence. Errors are terminal for
    /// the session (permission revoked, device gone, stream ended).
    async fn next_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Release the camera. Must be safe to call more than once.
    fn stop(&mut self);
}

/// QR decoder boundary. A per-frame miss is `None`, not an error.
pub trait QrDecode: Send + Sync {
    fn decode(&self, frame: &Frame) -> Option<String>;
}

/// One live capture session. Owns its frame source for its whole lifetime;
/// emits at most one decoded payload and stops the source on success, on a
/// terminal error, on [`close`](CaptureSession::close), and on drop.
pub struct CaptureSession<S: FrameSource> {
    source: S,
    closed: bool,
}

impl<S: FrameSource> CaptureSession<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            closed: false,
        }
    }

    /// Pull frames until the decoder produces a payload, then stop the
    /// source and return the trimmed text. Per-frame decode misses are
    /// transient and keep the loop running. The decoded text is returned
    /// rather than delivered through a callback, so nothing can observe a
    /// decode after the session is closed.
    pub async fn scan(&mut self, decoder: &dyn QrDecode) -> Result<String, CaptureError> {
        if self.closed {
            return Err(CaptureError::SourceClosed);
        }
        loop {
            let frame = match self.source.next_frame().await {
                Ok(frame) => frame,
                Err(err) => {
                    warn!(%err, "frame source failed, closing session");
                    self.close();
                    return Err(err);
                }
            };
            match decoder.decode(&frame) {
                Some(text) => {
                    let text = text.trim().to_string();
                    if text.is_empty() {
                        debug!("decoder returned empty payload, continuing");
                        continue;
                    }
                    info!(len = text.len(), "live capture decoded a payload");
                    self.close();
                    return Ok(text);
                }
                // no code in this frame, keep pulling
                None => continue,
            }
        }
    }

    /// Stop the frame source and retire the session. Idempotent.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.source.stop();
        }
    }
}

impl<S: FrameSource> Drop for CaptureSession<S> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Decode a single user-uploaded image. Unreadable files and images with no
/// code are distinct errors; both are recoverable by uploading another file.
pub fn decode_image(bytes: &[u8], decoder: &dyn QrDecode) -> Result<String, CaptureError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| CaptureError::UnreadableImage(e.to_string()))?;
    let luma = img.to_luma8();
    let frame = Frame {
        width: luma.width(),
        height: luma.height(),
        luma: luma.into_raw(),
    };
    match decoder.decode(&frame) {
        Some(text) if !text.trim().is_empty() => {
            info!(len = text.trim().len(), "uploaded image decoded");
            Ok(text.trim().to_string())
        }
        _ => Err(CaptureError::NoCodeFound),
    }
}
