//! Contains the common errors that may be encountered while decoding a
//! baseline JPEG image.
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Common decode errors.
///
/// Every variant carries enough context in its `String` payload to act as
/// a standalone diagnostic; none of these are recoverable mid-decode, the
/// caller is expected to discard the image sink and try again with a
/// different input.
#[allow(clippy::module_name_repetitions)]
pub enum DecodeErrors {
    /// The byte source ended before the decoder had enough bytes to
    /// satisfy a read.
    TruncatedStream(String),
    /// Marker framing was violated: an expected 0xFF was missing, SOI/EOI
    /// appeared out of place, or a reserved marker byte with no defined
    /// meaning was encountered.
    BadMarker(String),
    /// A segment's declared length disagreed with its contents, or one of
    /// its fields was outside the range this decoder accepts.
    BadSegment(String),
    /// A Huffman table failed to build, or a segment referenced a
    /// quantization/Huffman table index that was never defined.
    BadTable(String),
    /// An undefined Huffman code, or a byte-stuffing violation, was found
    /// in the entropy-coded data.
    BadEntropy(String),
    /// The stream uses a real JPEG feature this decoder does not
    /// implement.
    Unsupported(UnsupportedSchemes),
}

impl Debug for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TruncatedStream(reason) => {
                write!(f, "Truncated stream. Reason: {}", reason)
            }
            Self::BadMarker(reason) => {
                write!(f, "Bad marker. Reason: {}", reason)
            }
            Self::BadSegment(reason) => {
                write!(f, "Bad segment. Reason: {}", reason)
            }
            Self::BadTable(reason) => {
                write!(f, "Bad table. Reason: {}", reason)
            }
            Self::BadEntropy(reason) => {
                write!(f, "Bad entropy coded data. Reason: {}", reason)
            }
            Self::Unsupported(ref scheme) => {
                write!(f, "{:?}", scheme)
            }
        }
    }
}

impl Display for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl Error for DecodeErrors {}

/// JPEG features this decoder recognizes but does not implement.
///
/// Baseline sequential DCT, Huffman coding is the only scheme this crate
/// decodes; everything else here is reported so that a caller can tell
/// "this decoder doesn't do progressive JPEG" apart from "this file is
/// corrupt".
#[derive(Eq, PartialEq, Copy, Clone)]
pub enum UnsupportedSchemes {
    /// SOF1, extended sequential DCT, Huffman coding.
    ExtendedSequentialHuffman,
    /// SOF2/SOF6/SOF10/SOF14, progressive DCT.
    ProgressiveDctHuffman,
    /// SOF3/SOF7/SOF11/SOF15, lossless.
    LosslessHuffman,
    /// SOF5/SOF9/SOF13, hierarchical.
    HierarchicalHuffman,
    /// Any SOFn using arithmetic rather than Huffman coding.
    Arithmetic,
    /// DRI / RSTn, restart intervals.
    RestartIntervals,
}

impl Debug for UnsupportedSchemes {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExtendedSequentialHuffman => write!(
                f,
                "This decoder only supports baseline sequential DCT; the stream uses extended sequential DCT (SOF1)."
            ),
            Self::ProgressiveDctHuffman => write!(
                f,
                "This decoder only supports baseline sequential DCT; the stream is progressive."
            ),
            Self::LosslessHuffman => write!(
                f,
                "This decoder only supports baseline sequential DCT; the stream is lossless JPEG."
            ),
            Self::HierarchicalHuffman => write!(
                f,
                "This decoder only supports baseline sequential DCT; the stream is hierarchical."
            ),
            Self::Arithmetic => write!(
                f,
                "This decoder only supports Huffman coding; the stream uses arithmetic coding."
            ),
            Self::RestartIntervals => write!(
                f,
                "This decoder does not support restart intervals (DRI/RSTn)."
            ),
        }
    }
}

impl UnsupportedSchemes {
    /// Maps a SOF marker byte (the low byte of e.g. 0xFFC2) to the feature
    /// it requests, for every SOF marker other than SOF0. Returns `None`
    /// for bytes with no standard meaning at all; those are surfaced as
    /// [`DecodeErrors::BadMarker`] instead, not `Unsupported`.
    #[must_use]
    pub fn from_sof_marker(marker: u8) -> Option<UnsupportedSchemes> {
        match marker {
            0xC1 => Some(Self::ExtendedSequentialHuffman),
            0xC2 => Some(Self::ProgressiveDctHuffman),
            0xC3 => Some(Self::LosslessHuffman),
            0xC5 | 0xC6 | 0xC7 => Some(Self::HierarchicalHuffman),
            0xC9 | 0xCA | 0xCB | 0xCD | 0xCE | 0xCF => Some(Self::Arithmetic),
            _ => None,
        }
    }
}
