//! Channel bitmasks for 16 and 32 bits per pixel images.
//!
//! Each channel is a contiguous run of bits within a little-endian `u16` or
//! `u32` pixel. A channel is pulled out by masking and then shifting down to
//! the mask's lowest set bit, and finally scaled to 8 bits (see
//! [bit_depth_changes](crate::bit_depth_changes)).

use crate::{
  bit_depth_changes::{channel_from_u8, channel_to_u8},
  error::BmpError,
  pixel::Bgra32,
  wire_record,
};

wire_record! {
  /// Red, green, and blue masks, as stored after a 40 byte info header with
  /// [Bitfields](super::BmpCompression::Bitfields) compression, or inside a
  /// 52 byte header.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
  #[allow(missing_docs)]
  pub struct RgbBitmasks {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
  }
}

wire_record! {
  /// Red, green, blue, and alpha masks.
  ///
  /// An alpha mask of 0 means the image has no alpha channel (every pixel is
  /// opaque).
  #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
  #[allow(missing_docs)]
  pub struct Bitmasks {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
    pub alpha: u32,
  }
}
impl Bitmasks {
  /// 5 bits per channel. This is the layout of 16bpp RGB images.
  pub const RGB555: Self = Self { red: 0x7C00, green: 0x03E0, blue: 0x001F, alpha: 0 };
  /// 5 bits of red and blue, 6 bits of green.
  pub const RGB565: Self = Self { red: 0xF800, green: 0x07E0, blue: 0x001F, alpha: 0 };
  /// 8 bits per channel, no alpha. This is the layout of 32bpp RGB images.
  pub const XRGB8888: Self =
    Self { red: 0x00FF_0000, green: 0x0000_FF00, blue: 0x0000_00FF, alpha: 0 };
  /// 8 bits per channel with alpha in the top byte.
  pub const ARGB8888: Self =
    Self { red: 0x00FF_0000, green: 0x0000_FF00, blue: 0x0000_00FF, alpha: 0xFF00_0000 };

  /// The implied masks of uncompressed 16bpp and 32bpp images.
  #[inline]
  #[must_use]
  pub const fn default_for(bits_per_pixel: u16) -> Option<Self> {
    match bits_per_pixel {
      16 => Some(Self::RGB555),
      32 => Some(Self::XRGB8888),
      _ => None,
    }
  }

  /// Just the red, green, and blue masks.
  #[inline]
  #[must_use]
  pub const fn rgb(&self) -> RgbBitmasks {
    RgbBitmasks { red: self.red, green: self.green, blue: self.blue }
  }

  /// Checks that every mask is contiguous, fits within the pixel, and doesn't
  /// share bits with another mask.
  pub fn validate(&self, bits_per_pixel: u16) -> Result<(), BmpError> {
    let limit = if bits_per_pixel >= 32 { u32::MAX } else { (1_u32 << bits_per_pixel) - 1 };
    let mut seen = 0_u32;
    for mask in [self.red, self.green, self.blue, self.alpha] {
      if mask & !limit != 0 || mask & seen != 0 {
        return Err(BmpError::InvalidBitmask(mask));
      }
      seen |= mask;
      if mask != 0 {
        let shifted = mask >> mask.trailing_zeros();
        if shifted & shifted.wrapping_add(1) != 0 {
          return Err(BmpError::InvalidBitmask(mask));
        }
      }
    }
    Ok(())
  }
}
impl From<RgbBitmasks> for Bitmasks {
  #[inline]
  fn from(RgbBitmasks { red, green, blue }: RgbBitmasks) -> Self {
    Self { red, green, blue, alpha: 0 }
  }
}

/// One channel's mask, with the shift and width precomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMask {
  mask: u32,
  shift: u32,
  bits: u32,
}
impl ChannelMask {
  /// Precomputes the shift and bit width of a (contiguous) mask.
  #[inline]
  #[must_use]
  pub const fn new(mask: u32) -> Self {
    if mask == 0 {
      Self { mask, shift: 0, bits: 0 }
    } else {
      Self { mask, shift: mask.trailing_zeros(), bits: mask.count_ones() }
    }
  }

  /// The width of the channel in bits.
  #[inline]
  #[must_use]
  pub const fn bits(self) -> u32 {
    self.bits
  }

  /// Pulls this channel out of a raw pixel as an 8-bit value.
  #[inline]
  #[must_use]
  pub fn extract(self, raw: u32) -> u8 {
    channel_to_u8((raw & self.mask) >> self.shift, self.bits)
  }

  /// Places an 8-bit value into this channel's bits.
  #[inline]
  #[must_use]
  pub fn insert(self, c: u8) -> u32 {
    if self.bits == 0 {
      0
    } else {
      (channel_from_u8(c, self.bits) << self.shift) & self.mask
    }
  }
}

/// Converts between raw bitfield pixels and [Bgra32].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitfieldCodec {
  red: ChannelMask,
  green: ChannelMask,
  blue: ChannelMask,
  alpha: ChannelMask,
}
impl BitfieldCodec {
  /// Prepares the masks for use.
  #[inline]
  #[must_use]
  pub const fn new(masks: Bitmasks) -> Self {
    Self {
      red: ChannelMask::new(masks.red),
      green: ChannelMask::new(masks.green),
      blue: ChannelMask::new(masks.blue),
      alpha: ChannelMask::new(masks.alpha),
    }
  }

  /// Decodes a raw pixel. Without an alpha mask the alpha is 255.
  #[inline]
  #[must_use]
  pub fn unpack(&self, raw: u32) -> Bgra32 {
    Bgra32 {
      b: self.blue.extract(raw),
      g: self.green.extract(raw),
      r: self.red.extract(raw),
      a: if self.alpha.bits() == 0 { 255 } else { self.alpha.extract(raw) },
    }
  }

  /// Encodes a raw pixel.
  #[inline]
  #[must_use]
  pub fn pack(&self, p: Bgra32) -> u32 {
    self.red.insert(p.r) | self.green.insert(p.g) | self.blue.insert(p.b) | self.alpha.insert(p.a)
  }
}

#[test]
fn test_rgb565_full_red() {
  let codec = BitfieldCodec::new(Bitmasks::RGB565);
  assert_eq!(codec.unpack(0xF800), Bgra32 { b: 0, g: 0, r: 255, a: 255 });
  assert_eq!(codec.unpack(0x07E0), Bgra32 { b: 0, g: 255, r: 0, a: 255 });
  assert_eq!(codec.pack(Bgra32 { b: 0, g: 0, r: 255, a: 255 }), 0xF800);
}

#[test]
fn test_argb8888_is_exact() {
  let codec = BitfieldCodec::new(Bitmasks::ARGB8888);
  let p = Bgra32 { b: 1, g: 2, r: 3, a: 4 };
  assert_eq!(codec.pack(p), 0x0403_0201);
  assert_eq!(codec.unpack(0x0403_0201), p);
}

#[test]
fn test_bitmask_validation() {
  assert!(Bitmasks::RGB565.validate(16).is_ok());
  assert!(Bitmasks::ARGB8888.validate(32).is_ok());
  assert_eq!(Bitmasks::XRGB8888.validate(16), Err(BmpError::InvalidBitmask(0x00FF_0000)));
  let gappy = Bitmasks { red: 0b1011, ..Bitmasks::RGB555 };
  assert_eq!(gappy.validate(16), Err(BmpError::InvalidBitmask(0b1011)));
  let overlapping = Bitmasks { red: 0xFF00, green: 0xFF00, blue: 0x00FF, alpha: 0 };
  assert_eq!(overlapping.validate(16), Err(BmpError::InvalidBitmask(0xFF00)));
  let alpha_over_red = Bitmasks { alpha: 0x00FF_0000, ..Bitmasks::XRGB8888 };
  assert_eq!(alpha_over_red.validate(32), Err(BmpError::InvalidBitmask(0x00FF_0000)));
}
