use crate::wire_record;

wire_record! {
  /// Header for Windows 2.0 and OS/2 1.x images.
  ///
  /// Unlikely to be seen in modern times.
  ///
  /// Corresponds to the the 12 byte `BITMAPCOREHEADER` struct (aka
  /// `OS21XBITMAPHEADER`).
  #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
  pub struct BitmapCoreHeader {
    /// Always 12.
    pub size: u32,

    /// Width in pixels.
    pub width: u16,

    /// Height in pixels.
    ///
    /// This version of the header has no way to mark an image as top-down, so
    /// rows are always stored bottom row first.
    pub height: u16,

    /// Must be 1.
    pub planes: u16,

    /// 1, 4, 8, or 24. An appropriate palette should be present for the
    /// indexed depths.
    pub bits_per_pixel: u16,
  }
}
