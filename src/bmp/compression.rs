use crate::error::BmpError;

/// The compression method of the pixel data.
///
/// The same raw value means different things in different header families:
/// OS/2 2.x headers use 3 and 4 for Huffman 1D and RLE24, while Windows
/// headers use them for bitfields and JPEG.
///
/// * [Rgb](Self::Rgb) can be used with any bit depth.
/// * [Rle8](Self::Rle8) is only for 8bpp, and [Rle4](Self::Rle4) only for 4bpp.
/// * [Bitfields](Self::Bitfields) and [AlphaBitfields](Self::AlphaBitfields)
///   are only for 16bpp and 32bpp.
/// * Everything else is recognized, but this crate can't decode it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum BmpCompression {
  /// No compression.
  #[default]
  Rgb,
  /// Run-length encoded, 8bpp.
  Rle8,
  /// Run-length encoded, 4bpp.
  Rle4,
  /// No compression, with red, green, and blue bitmasks.
  Bitfields,
  /// A JPEG image is embedded as the pixel data.
  Jpeg,
  /// A PNG image is embedded as the pixel data.
  Png,
  /// No compression, with red, green, blue, and alpha bitmasks.
  AlphaBitfields,
  /// CMYK, no compression.
  Cmyk,
  /// CMYK, run-length encoded 8bpp.
  CmykRle8,
  /// CMYK, run-length encoded 4bpp.
  CmykRle4,
  /// OS/2 2.x: Modified Huffman (1bpp fax style) encoding.
  Huffman1D,
  /// OS/2 2.x: Run-length encoded, 24bpp.
  Rle24,
}
impl BmpCompression {
  /// Interprets a raw compression value.
  ///
  /// `os2` selects the OS/2 2.x meanings of the values that differ.
  #[inline]
  pub const fn from_raw(value: u32, os2: bool) -> Result<Self, BmpError> {
    use BmpCompression::*;
    Ok(match (value, os2) {
      (0, _) => Rgb,
      (1, _) => Rle8,
      (2, _) => Rle4,
      (3, true) => Huffman1D,
      (4, true) => Rle24,
      (3, false) => Bitfields,
      (4, false) => Jpeg,
      (5, false) => Png,
      (6, false) => AlphaBitfields,
      (11, false) => Cmyk,
      (12, false) => CmykRle8,
      (13, false) => CmykRle4,
      _ => return Err(BmpError::UnknownCompression(value)),
    })
  }

  /// The raw value stored in a header.
  #[inline]
  #[must_use]
  pub const fn to_raw(self) -> u32 {
    use BmpCompression::*;
    match self {
      Rgb => 0,
      Rle8 => 1,
      Rle4 => 2,
      Bitfields | Huffman1D => 3,
      Jpeg | Rle24 => 4,
      Png => 5,
      AlphaBitfields => 6,
      Cmyk => 11,
      CmykRle8 => 12,
      CmykRle4 => 13,
    }
  }

  /// If this crate can decode and encode pixel data with this compression.
  #[inline]
  #[must_use]
  pub const fn is_supported(self) -> bool {
    use BmpCompression::*;
    matches!(self, Rgb | Rle8 | Rle4 | Bitfields | AlphaBitfields)
  }

  /// If an image with this compression can be stored top-down.
  #[inline]
  #[must_use]
  pub const fn allows_top_down(self) -> bool {
    use BmpCompression::*;
    matches!(self, Rgb | Bitfields | AlphaBitfields)
  }

  /// If the pixel data is located with bitmasks.
  #[inline]
  #[must_use]
  pub const fn uses_bitmasks(self) -> bool {
    matches!(self, Self::Bitfields | Self::AlphaBitfields)
  }

  /// Checks that the bit depth can be used with this compression.
  pub const fn check_bit_depth(self, bits_per_pixel: u16) -> Result<(), BmpError> {
    use BmpCompression::*;
    if !self.is_supported() {
      return Err(BmpError::UnsupportedCompression(self));
    }
    let legal = match self {
      Rgb => matches!(bits_per_pixel, 1 | 2 | 4 | 8 | 16 | 24 | 32),
      Rle8 => bits_per_pixel == 8,
      Rle4 => bits_per_pixel == 4,
      _ => matches!(bits_per_pixel, 16 | 32),
    };
    if legal {
      Ok(())
    } else {
      Err(BmpError::IllegalBitDepth { bits_per_pixel, compression: self })
    }
  }
}

#[test]
fn test_compression_raw_values() {
  assert_eq!(BmpCompression::from_raw(3, false), Ok(BmpCompression::Bitfields));
  assert_eq!(BmpCompression::from_raw(3, true), Ok(BmpCompression::Huffman1D));
  assert_eq!(BmpCompression::from_raw(6, true), Err(BmpError::UnknownCompression(6)));
  assert_eq!(BmpCompression::Rle24.to_raw(), 4);
  assert_eq!(
    BmpCompression::Jpeg.check_bit_depth(0),
    Err(BmpError::UnsupportedCompression(BmpCompression::Jpeg))
  );
  assert_eq!(
    BmpCompression::Rle8.check_bit_depth(4),
    Err(BmpError::IllegalBitDepth { bits_per_pixel: 4, compression: BmpCompression::Rle8 })
  );
}
