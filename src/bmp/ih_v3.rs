use super::{Bitmasks, RgbBitmasks};
use crate::wire_record;

wire_record! {
  /// InfoHeader version 1 (called "v3" after the Windows version).
  ///
  /// This is by far the most common header. Every later Windows header starts
  /// with these same fields, and the OS/2 2.x header shares the same layout
  /// too (though it reads some of the values differently).
  ///
  /// Corresponds to the 40 byte `BITMAPINFOHEADER`.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
  pub struct BitmapInfoHeader {
    /// The size of the whole header this is part of.
    pub size: u32,

    /// Image pixel width
    pub width: i32,

    /// Image pixel height.
    ///
    /// * A positive height indicates that the origin is the **bottom** left.
    /// * A negative height indicates that the image origin is the **top** left.
    pub height: i32,

    /// Must be 1.
    pub planes: u16,

    /// Should be 1, 2, 4, 8, 16, 24, or 32.
    ///
    /// The value 0 is also allowed, which indicates that a Jpeg or Png file is
    /// contained in this bitmap, which will have the bits per pixel info.
    pub bits_per_pixel: u16,

    /// The raw compression value, see [BmpCompression](super::BmpCompression).
    pub compression: u32,

    /// The number of bytes in the pixel data.
    ///
    /// Uncompressed images can leave this as 0.
    pub image_size: u32,

    /// horizontal pixels per meter
    pub x_pixels_per_meter: i32,

    /// vertical pixels per meter
    pub y_pixels_per_meter: i32,

    /// Palette length.
    ///
    /// 0 means that the full `2**N` palette is used (where `N` is the image bit
    /// depth), or no palette for images over 8 bits per pixel.
    pub colors_used: u32,

    /// The number of "important" colors, at the start of the palette.
    ///
    /// 0 means that all colors are important. This field is generally ignored.
    pub colors_important: u32,
  }
}

wire_record! {
  /// An info header with RGB bitmasks included.
  ///
  /// This is mostly undocumented, so new files are unlikely to use it.
  ///
  /// Corresponds to the 52 byte `BITMAPV2INFOHEADER`.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
  #[allow(missing_docs)]
  pub struct BitmapV2InfoHeader {
    pub info: BitmapInfoHeader,
    pub masks: RgbBitmasks,
  }
}

wire_record! {
  /// An info header with RGBA bitmasks included.
  ///
  /// This is mostly undocumented, so new files are unlikely to use it.
  ///
  /// Corresponds to the 56 byte `BITMAPV3INFOHEADER`.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
  #[allow(missing_docs)]
  pub struct BitmapV3InfoHeader {
    pub info: BitmapInfoHeader,
    pub masks: Bitmasks,
  }
}
