use crate::{ascii_array::AsciiArray, bmp::BmpCompression};

/// An error from the `dibkit` crate.
///
/// Both decoding and encoding report failures with this type. Byte offsets are
/// measured from wherever the stream was positioned when the operation
/// started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum BmpError {
  /// The file doesn't start with one of the known bitmap tags.
  #[error("expected the `BM` magic tag, found {found:?}")]
  MagicMismatch { found: AsciiArray<2> },

  /// The file is one of the OS/2 resource containers (bitmap array, icon,
  /// pointer). These are recognized but not decoded.
  #[error("`{tag}` OS/2 resource files are recognized but not supported")]
  UnsupportedContainer { tag: AsciiArray<2> },

  /// The DIB header size doesn't match any known header version.
  #[error("unsupported DIB header size: {0} bytes")]
  UnsupportedHeaderSize(u32),

  /// The compression value isn't defined for this header family.
  #[error("unknown compression value: {0}")]
  UnknownCompression(u32),

  /// The compression is a legal BMP compression, but this crate doesn't handle
  /// it (JPEG, PNG, CMYK, the OS/2 Huffman and RLE24 modes).
  #[error("{0:?} compression is not supported")]
  UnsupportedCompression(BmpCompression),

  /// The bit depth can't be used with the compression method.
  #[error("{bits_per_pixel} bits per pixel is not legal with {compression:?} compression")]
  IllegalBitDepth { bits_per_pixel: u16, compression: BmpCompression },

  /// A header field holds a value that makes the image undecodable.
  #[error("invalid header: {0}")]
  InvalidHeader(&'static str),

  /// A channel bitmask has gaps, or doesn't fit within the pixel.
  #[error("invalid channel bitmask: {0:#010X}")]
  InvalidBitmask(u32),

  /// The palette size is inconsistent with the bit depth, or an index points
  /// past the end of the palette.
  #[error("malformed palette: {entries} entries at {bits_per_pixel} bits per pixel")]
  MalformedPalette { entries: usize, bits_per_pixel: u16 },

  /// The pixel data offset points inside the headers or palette.
  #[error("pixel data offset {offset} overlaps the headers (minimum is {minimum})")]
  PixelOffsetOverlap { offset: u32, minimum: u64 },

  /// The stream ended before a structure or row was complete.
  #[error("stream truncated at byte {offset}: {needed} more bytes were needed")]
  TruncatedStream { offset: u64, needed: usize },

  /// The underlying stream failed for a reason other than running out of
  /// bytes.
  #[error("stream failure at byte {offset}")]
  StreamFailure { offset: u64 },

  /// The RLE record starting at `offset` can't be applied to the image.
  #[error("invalid RLE record at byte {offset}")]
  InvalidRleRecord { offset: u64 },

  /// Top-down images must be uncompressed (or bitfields).
  #[error("a top-down image can't use {0:?} compression")]
  InconsistentOrientation(BmpCompression),

  /// The image is larger than the configured limits allow.
  #[error("image dimensions {width}x{height} exceed the decode limits")]
  DimensionsTooLarge { width: u32, height: u32 },

  /// The allocator couldn't give us enough space.
  #[error("allocation failure")]
  Alloc,

  /// The pixel grid given to the encoder doesn't agree with the metadata.
  #[error("pixel grid does not match the metadata: {0}")]
  GridMismatch(&'static str),
}

impl From<alloc::collections::TryReserveError> for BmpError {
  #[inline]
  fn from(_: alloc::collections::TryReserveError) -> Self {
    Self::Alloc
  }
}
