//! A baseline sequential JPEG decoder.
//!
//! Decodes the subset of ITU-T T.81 baseline sequential DCT, Huffman-coded
//! JPEG into 8-bit RGB pixels plus an optional textual comment. Progressive,
//! lossless, hierarchical, arithmetic-coded and 12-bit variants, restart
//! intervals, and JFIF/EXIF metadata are out of scope (see
//! [`errors::UnsupportedSchemes`]).
//!
//! The decoder never allocates an image container itself: callers supply an
//! [`ImageSink`](sink::ImageSink), which receives `set_size`/`set_comment`/
//! `set_pixel` calls as the stream is parsed. [`sink::RgbImage`] is a
//! minimal in-memory sink for callers that just want a pixel buffer.
#![allow(clippy::needless_return, clippy::similar_names)]
#![warn(clippy::correctness, clippy::perf, clippy::pedantic)]
#[macro_use]
extern crate log;

pub mod bitreader;
pub mod color_convert;
pub mod component;
pub mod decoder;
pub mod errors;
pub mod huffman;
pub mod idct;
pub mod misc;
pub mod options;
pub mod sink;
pub mod upsample;

pub use crate::decoder::Decoder;
pub use crate::errors::{DecodeErrors, UnsupportedSchemes};
pub use crate::misc::ColorSpace;
pub use crate::options::DecoderOptions;
pub use crate::sink::{ImageSink, RgbImage};
