//! Constants and small value types shared across the decoder: the
//! zig-zag scan order, the output color space, and the set of SOF
//! markers this decoder recognizes (whether or not it implements them).

/// Start of baseline DCT, Huffman coding. The only SOF variant this
/// decoder implements.
pub const START_OF_FRAME_BASE: u8 = 0xC0;

/// Undoes the zig-zag run-length scan order, mapping a serialized
/// coefficient index (0..64) to its natural row-major position in an 8x8
/// block.
#[rustfmt::skip]
pub const UN_ZIGZAG: [usize; 64] = [
    0,  1,  8,  16, 9,  2,  3, 10,
    17, 24, 32, 25, 18, 11, 4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13, 6,  7,  14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// The color space of the decoded output. This decoder always produces
/// `RGB`; the other variants are retained for callers that want to
/// describe what the source stream declared before conversion.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ColorSpace {
    /// Red, Green, Blue -- the output of every successful decode.
    RGB,
    /// A single luminance channel, source had no chroma components.
    GRAYSCALE,
    /// Luma/chroma, the wire format before color conversion.
    YCbCr,
}

impl ColorSpace {
    /// Number of channels a stream in this color space carries.
    #[must_use]
    pub const fn num_components(self) -> usize {
        match self {
            Self::RGB | Self::YCbCr => 3,
            Self::GRAYSCALE => 1,
        }
    }
}
