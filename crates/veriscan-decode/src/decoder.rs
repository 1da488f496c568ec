use async_trait::async_trait;
use veriscan_foundation::{DecodeError, FrameBuffer};

/// A single-frame barcode decoder.
///
/// `decode` inspects one raster frame and returns `Ok(Some(text))` on a hit,
/// `Ok(None)` when the frame simply contains no readable code, and `Err` only
/// for real failures. Implementations may keep internal scratch state between
/// frames, hence `&mut self`; the pipeline guarantees at most one decode is
/// in flight at a time.
#[async_trait]
pub trait BarcodeDecoder: Send {
    async fn decode(&mut self, frame: &FrameBuffer) -> Result<Option<String>, DecodeError>;
}
