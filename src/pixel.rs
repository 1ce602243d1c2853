//! Packed 8-bit-per-channel pixel formats.
//!
//! There's five formats, covering every channel order that shows up in BMP
//! data and in the usual places that BMP data gets sent to:
//!
//! * [Rgb24] and [Bgr24]: three channels, no alpha.
//! * [Rgba32], [Bgra32], and [Argb32]: four channels.
//!
//! Every format is `#[repr(C)]` and [Pod], so slices of pixels can be cast to
//! and from slices of bytes with `bytemuck`.
//!
//! ## Conversion
//!
//! Any format converts to any other with [PixelFormat::convert] (or `From`).
//! Changing only the channel order is lossless. Going from a 3-channel format
//! to a 4-channel format sets alpha to fully opaque, and going the other way
//! just drops alpha.
//!
//! Each format also converts to and from normalized floats (`0.0 ..= 1.0`).
//! Bytes go to floats as `c / 255`. Floats go back to bytes as
//! `v * 255 + 0.5`, clamped to `0 ..= 255`, then truncated. With that rounding
//! rule a byte always survives the trip through a float unchanged.

use bytemuck::{Pod, Zeroable};
use pixel_formats::{r32g32b32_Sfloat, r32g32b32a32_Sfloat};

/// Converts a channel byte to a normalized float.
#[inline]
#[must_use]
pub fn u8_to_unit(c: u8) -> f32 {
  f32::from(c) / 255.0
}

/// Converts a normalized float to a channel byte.
///
/// `NaN` becomes 0.
#[inline]
#[must_use]
pub fn unit_to_u8(f: f32) -> u8 {
  let v = f * 255.0 + 0.5;
  if v >= 255.0 {
    255
  } else if v >= 0.0 {
    v as u8
  } else {
    0
  }
}

/// Three channels, red first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(C)]
#[allow(missing_docs)]
pub struct Rgb24 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

/// Three channels, blue first.
///
/// This is how 24-bit BMP pixels are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(C)]
#[allow(missing_docs)]
pub struct Bgr24 {
  pub b: u8,
  pub g: u8,
  pub r: u8,
}

/// Four channels, red first, alpha last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(C)]
#[allow(missing_docs)]
pub struct Rgba32 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}

/// Four channels, blue first, alpha last.
///
/// This is the layout of a 4-byte BMP palette entry and of a 32-bit BMP pixel
/// with the default masks. The crate uses it for all direct color images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(C)]
#[allow(missing_docs)]
pub struct Bgra32 {
  pub b: u8,
  pub g: u8,
  pub r: u8,
  pub a: u8,
}

/// Four channels, alpha first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Zeroable, Pod)]
#[repr(C)]
#[allow(missing_docs)]
pub struct Argb32 {
  pub a: u8,
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

/// Common operations on the packed pixel formats.
///
/// All conversions pass through [Rgba32].
pub trait PixelFormat: Copy + Pod + PartialEq + core::fmt::Debug {
  /// If the format stores an alpha channel.
  const HAS_ALPHA: bool;

  /// Converts to [Rgba32]. Formats without alpha give an alpha of 255.
  fn to_rgba32(self) -> Rgba32;

  /// Converts from [Rgba32]. Formats without alpha drop the alpha value.
  fn from_rgba32(rgba: Rgba32) -> Self;

  /// Converts to any other format.
  #[inline]
  #[must_use]
  fn convert<Q: PixelFormat>(self) -> Q {
    Q::from_rgba32(self.to_rgba32())
  }

  /// Converts to a normalized 4-channel float color.
  #[inline]
  #[must_use]
  fn to_normalized(self) -> r32g32b32a32_Sfloat {
    let Rgba32 { r, g, b, a } = self.to_rgba32();
    r32g32b32a32_Sfloat { r: u8_to_unit(r), g: u8_to_unit(g), b: u8_to_unit(b), a: u8_to_unit(a) }
  }

  /// Converts from a normalized 4-channel float color.
  #[inline]
  #[must_use]
  fn from_normalized(v: r32g32b32a32_Sfloat) -> Self {
    Self::from_rgba32(Rgba32 {
      r: unit_to_u8(v.r),
      g: unit_to_u8(v.g),
      b: unit_to_u8(v.b),
      a: unit_to_u8(v.a),
    })
  }

  /// Converts to a normalized 3-channel float color, ignoring alpha.
  #[inline]
  #[must_use]
  fn to_normalized_rgb(self) -> r32g32b32_Sfloat {
    let Rgba32 { r, g, b, .. } = self.to_rgba32();
    r32g32b32_Sfloat { r: u8_to_unit(r), g: u8_to_unit(g), b: u8_to_unit(b) }
  }

  /// Converts from a normalized 3-channel float color, with alpha 255.
  #[inline]
  #[must_use]
  fn from_normalized_rgb(v: r32g32b32_Sfloat) -> Self {
    Self::from_rgba32(Rgba32 { r: unit_to_u8(v.r), g: unit_to_u8(v.g), b: unit_to_u8(v.b), a: 255 })
  }
}

impl PixelFormat for Rgb24 {
  const HAS_ALPHA: bool = false;
  #[inline]
  fn to_rgba32(self) -> Rgba32 {
    Rgba32 { r: self.r, g: self.g, b: self.b, a: 255 }
  }
  #[inline]
  fn from_rgba32(Rgba32 { r, g, b, .. }: Rgba32) -> Self {
    Self { r, g, b }
  }
}
impl PixelFormat for Bgr24 {
  const HAS_ALPHA: bool = false;
  #[inline]
  fn to_rgba32(self) -> Rgba32 {
    Rgba32 { r: self.r, g: self.g, b: self.b, a: 255 }
  }
  #[inline]
  fn from_rgba32(Rgba32 { r, g, b, .. }: Rgba32) -> Self {
    Self { b, g, r }
  }
}
impl PixelFormat for Rgba32 {
  const HAS_ALPHA: bool = true;
  #[inline]
  fn to_rgba32(self) -> Rgba32 {
    self
  }
  #[inline]
  fn from_rgba32(rgba: Rgba32) -> Self {
    rgba
  }
}
impl PixelFormat for Bgra32 {
  const HAS_ALPHA: bool = true;
  #[inline]
  fn to_rgba32(self) -> Rgba32 {
    Rgba32 { r: self.r, g: self.g, b: self.b, a: self.a }
  }
  #[inline]
  fn from_rgba32(Rgba32 { r, g, b, a }: Rgba32) -> Self {
    Self { b, g, r, a }
  }
}
impl PixelFormat for Argb32 {
  const HAS_ALPHA: bool = true;
  #[inline]
  fn to_rgba32(self) -> Rgba32 {
    Rgba32 { r: self.r, g: self.g, b: self.b, a: self.a }
  }
  #[inline]
  fn from_rgba32(Rgba32 { r, g, b, a }: Rgba32) -> Self {
    Self { a, r, g, b }
  }
}

macro_rules! impl_from_pixel {
  ($($src:ty => [$($dst:ty),*]),* $(,)?) => {
    $($(
      impl From<$src> for $dst {
        #[inline]
        fn from(p: $src) -> Self {
          p.convert()
        }
      }
    )*)*
  };
}
impl_from_pixel! {
  Rgb24 => [Bgr24, Rgba32, Bgra32, Argb32],
  Bgr24 => [Rgb24, Rgba32, Bgra32, Argb32],
  Rgba32 => [Rgb24, Bgr24, Bgra32, Argb32],
  Bgra32 => [Rgb24, Bgr24, Rgba32, Argb32],
  Argb32 => [Rgb24, Bgr24, Rgba32, Bgra32],
}

#[test]
fn test_unit_to_u8_rounding() {
  assert_eq!(unit_to_u8(0.0), 0);
  assert_eq!(unit_to_u8(1.0), 255);
  assert_eq!(unit_to_u8(0.5), 128);
  assert_eq!(unit_to_u8(-3.0), 0);
  assert_eq!(unit_to_u8(7.0), 255);
  assert_eq!(unit_to_u8(f32::NAN), 0);
  // just under the halfway point between 1 and 2
  assert_eq!(unit_to_u8(1.49 / 255.0), 1);
  for c in 0..=255_u8 {
    assert_eq!(unit_to_u8(u8_to_unit(c)), c, "failed c:{}", c);
  }
}

#[test]
fn test_channel_count_changes() {
  let rgb = Rgb24 { r: 1, g: 2, b: 3 };
  assert_eq!(Argb32::from(rgb), Argb32 { a: 255, r: 1, g: 2, b: 3 });
  let bgra = Bgra32 { b: 3, g: 2, r: 1, a: 9 };
  assert_eq!(Rgb24::from(bgra), rgb);
  assert_eq!(bytemuck::bytes_of(&Bgr24::from(bgra)), &[3, 2, 1]);
}
