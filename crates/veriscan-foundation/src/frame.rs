/// Persistent offscreen raster buffer the decode loop draws video frames
/// into. One buffer lives for the whole session and is mutated in place;
/// the backing allocation is touched only when the video's native
/// dimensions change, which bounds allocation churn in the 2 Hz hot loop.
#[derive(Debug)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

const BYTES_PER_PIXEL: usize = 4; // RGBA

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        }
    }

    /// Match the buffer to the video's native dimensions. No-op when the
    /// dimensions are unchanged.
    pub fn resize_to(&mut self, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }
        let len = width as usize * height as usize * BYTES_PER_PIXEL;
        self.pixels.resize(len, 0);
        self.width = width;
        self.height = height;
        tracing::debug!("Frame buffer resized to {}x{}", width, height);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
