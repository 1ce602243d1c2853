use super::{Bitmasks, BitmapInfoHeader, ColorSpace};
use crate::wire_record;

wire_record! {
  /// InfoHeader version 4.
  ///
  /// Compared to the 56 byte header, it adds color space information.
  ///
  /// Corresponds to the 108 byte `BITMAPV4HEADER`.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
  pub struct BitmapV4Header {
    /// The common fields.
    pub info: BitmapInfoHeader,

    /// The masks are only used with bitfields compression.
    pub masks: Bitmasks,

    /// How to interpret the colors of the image.
    pub color_space: ColorSpace,
  }
}

wire_record! {
  /// InfoHeader version 5.
  ///
  /// Compared to V4, it adds a rendering intent and the location of ICC
  /// profile data.
  ///
  /// Corresponds to the 124 byte `BITMAPV5HEADER`.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
  pub struct BitmapV5Header {
    /// Everything a V4 header has.
    pub v4: BitmapV4Header,

    /// One of the `LCS_GM_*` values, see
    /// [intent_from_raw](super::intent_from_raw).
    pub intent: u32,

    /// Offset of the profile data, from the start of this header.
    pub profile_data: u32,

    /// Size of the profile data.
    pub profile_size: u32,

    /// Should be 0.
    pub reserved: u32,
  }
}
