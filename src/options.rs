//! Decoder configuration.
//!
//! A small options value object threaded through `Decoder::new_with_options`
//! rather than a pile of ad-hoc setters on the decoder itself.

/// Upper bound on `width * height` a [`crate::Decoder`] will accept from a
/// SOF0 segment before refusing to allocate an output buffer for it.
pub(crate) const MAX_DIMENSIONS: usize = 1 << 27;

/// Maximum number of color components (channels) a frame may declare.
pub(crate) const MAX_COMPONENTS: usize = 4;

/// Number of quantization-table and Huffman-table slots (DQT/DHT table ids
/// are 4-bit fields, but baseline never uses more than 4 of each).
pub(crate) const MAX_TABLES: usize = 4;

/// Knobs that influence how a [`crate::Decoder`] behaves, as opposed to
/// what it decodes.
#[derive(Debug, Copy, Clone)]
pub struct DecoderOptions {
    max_pixels: usize,
    strict_comments: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_pixels: MAX_DIMENSIONS,
            strict_comments: false,
        }
    }
}

impl DecoderOptions {
    /// Create options with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum `width * height` this decoder will accept.
    #[must_use]
    pub fn set_max_pixels(mut self, max_pixels: usize) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    #[must_use]
    pub(crate) fn max_pixels(&self) -> usize {
        self.max_pixels
    }

    /// Require COM segment bytes to be valid UTF-8. When unset (the
    /// default), comment bytes are passed to the image sink unconditionally
    /// without interpreting their encoding.
    #[must_use]
    pub fn set_strict_comments(mut self, strict: bool) -> Self {
        self.strict_comments = strict;
        self
    }

    #[must_use]
    pub(crate) fn strict_comments(&self) -> bool {
        self.strict_comments
    }
}
