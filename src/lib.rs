#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]
//#![warn(missing_docs)]

//! A crate for Windows and OS/2 Device-Independent Bitmap (BMP) files.
//!
//! * [bmp::decode] reads a bitmap from any [ByteSource] and gives back a
//!   [PixelGrid] along with the [Metadata] describing the file.
//! * [bmp::encode] is the inverse, writing a grid and metadata to any
//!   [ByteSink].
//!
//! All of the header versions are supported (OS/2 1.x and 2.x, and Windows
//! 3 through 5), with uncompressed, bitfield, RLE8, and RLE4 pixel data.
//!
//! The crate is `no_std` but needs `alloc`. The `std` feature adds stream
//! adapters for `std::io` readers and writers.

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

mod error;
pub use error::*;

pub mod stream;
pub use stream::{ByteSink, ByteSource, Endian, SliceSource, StructReader, StructWriter, Wire};
#[cfg(feature = "std")]
pub use stream::{IoSink, IoSource};

pub mod pixel;
pub use pixel::*;

pub mod ascii_array;
pub use ascii_array::*;

pub mod bit_depth_changes;

pub mod image;
pub use image::*;

pub mod options;
pub use options::*;

pub mod bmp;
pub use bmp::{decode, decode_bytes, decode_with_options, encode, encode_to_vec, Metadata};

/// Used by various image formats that support sRGB colors.
///
/// BMP stores this in the `intent` field of a version 5 header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SrgbIntent {
  /// for images preferring good adaptation to the output device gamut at the
  /// expense of colorimetric accuracy, such as photographs.
  Perceptual,
  /// for images requiring colour appearance matching (relative to the output
  /// device white point), such as logos.
  RelativeColorimetric,
  /// for images preferring preservation of saturation at the expense of hue and
  /// lightness, such as charts and graphs.
  Saturation,
  /// for images requiring preservation of absolute colorimetry, such as
  /// previews of images destined for a different output device (proofs).
  AbsoluteColorimetric,
}
