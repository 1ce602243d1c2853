#![allow(non_upper_case_globals)]

use crate::{
  error::BmpError,
  stream::{ByteSink, ByteSource, StructReader, StructWriter, Wire},
  wire_record, SrgbIntent,
};

/// `LCS_CALIBRATED_RGB`: the endpoints and gammas describe the color space.
pub const LCS_CALIBRATED_RGB: u32 = 0;
/// `LCS_sRGB`, the bytes `"sRGB"`.
pub const LCS_sRGB: u32 = 0x7352_4742;
/// `LCS_WINDOWS_COLOR_SPACE`, the bytes `"Win "`.
pub const LCS_WINDOWS_COLOR_SPACE: u32 = 0x5769_6E20;
/// `PROFILE_LINKED`, the bytes `"LINK"`.
pub const PROFILE_LINKED: u32 = 0x4C49_4E4B;
/// `PROFILE_EMBEDDED`, the bytes `"MBED"`.
pub const PROFILE_EMBEDDED: u32 = 0x4D42_4544;

const LCS_GM_BUSINESS: u32 = 0x0000_0001;
const LCS_GM_GRAPHICS: u32 = 0x0000_0002;
const LCS_GM_IMAGES: u32 = 0x0000_0004;
const LCS_GM_ABS_COLORIMETRIC: u32 = 0x0000_0008;

/// The kind of color space of a V4 or V5 bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ColorSpaceType {
  /// The colorspace is calibrated according to the endpoints and gammas.
  #[default]
  CalibratedRgb,

  /// The usual sRGB colorspace.
  Srgb,

  /// The windows default color space (On windows 10, this is also sRGB).
  WindowsColorSpace,

  /// A profile elsewhere is linked to (by file name). The name is stored
  /// where an embedded profile would be.
  ProfileLinked,

  /// A profile is embedded into the end of the bitmap itself.
  ProfileEmbedded,

  /// The colorspace tag was unknown.
  Unknown(u32),
}
impl ColorSpaceType {
  /// If the bitmap carries profile data (a profile, or a linked profile's
  /// file name).
  #[inline]
  #[must_use]
  pub const fn has_profile_data(self) -> bool {
    matches!(self, Self::ProfileLinked | Self::ProfileEmbedded)
  }
}
impl From<u32> for ColorSpaceType {
  #[inline]
  fn from(value: u32) -> Self {
    match value {
      LCS_CALIBRATED_RGB => Self::CalibratedRgb,
      LCS_sRGB => Self::Srgb,
      LCS_WINDOWS_COLOR_SPACE => Self::WindowsColorSpace,
      PROFILE_LINKED => Self::ProfileLinked,
      PROFILE_EMBEDDED => Self::ProfileEmbedded,
      other => Self::Unknown(other),
    }
  }
}
impl From<ColorSpaceType> for u32 {
  #[inline]
  fn from(t: ColorSpaceType) -> Self {
    match t {
      ColorSpaceType::CalibratedRgb => LCS_CALIBRATED_RGB,
      ColorSpaceType::Srgb => LCS_sRGB,
      ColorSpaceType::WindowsColorSpace => LCS_WINDOWS_COLOR_SPACE,
      ColorSpaceType::ProfileLinked => PROFILE_LINKED,
      ColorSpaceType::ProfileEmbedded => PROFILE_EMBEDDED,
      ColorSpaceType::Unknown(other) => other,
    }
  }
}
impl Wire for ColorSpaceType {
  const SIZE: usize = 4;
  #[inline]
  fn read_from<S: ByteSource>(r: &mut StructReader<S>) -> Result<Self, BmpError> {
    r.read_u32().map(Self::from)
  }
  #[inline]
  fn write_to<K: ByteSink>(&self, w: &mut StructWriter<K>) -> Result<(), BmpError> {
    w.write_u32(u32::from(*self))
  }
}

wire_record! {
  /// A CIE XYZ color, each coordinate a 2.30 fixed point value.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
  #[allow(missing_docs)]
  pub struct CieXyz {
    pub x: u32,
    pub y: u32,
    pub z: u32,
  }
}

wire_record! {
  /// The CIE XYZ endpoints of the red, green, and blue primaries.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
  #[allow(missing_docs)]
  pub struct CieXyzTriple {
    pub red: CieXyz,
    pub green: CieXyz,
    pub blue: CieXyz,
  }
}

wire_record! {
  /// The color space block of V4 and V5 headers.
  ///
  /// The endpoints and gammas are only meaningful for
  /// [ColorSpaceType::CalibratedRgb], but they're kept whatever the type.
  /// Gammas are 16.16 fixed point values.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
  #[allow(missing_docs)]
  pub struct ColorSpace {
    pub kind: ColorSpaceType,
    pub endpoints: CieXyzTriple,
    pub gamma_red: u32,
    pub gamma_green: u32,
    pub gamma_blue: u32,
  }
}
impl ColorSpace {
  /// An sRGB color space block (with zeroed endpoints and gammas).
  pub const SRGB: Self = Self {
    kind: ColorSpaceType::Srgb,
    endpoints: CieXyzTriple {
      red: CieXyz { x: 0, y: 0, z: 0 },
      green: CieXyz { x: 0, y: 0, z: 0 },
      blue: CieXyz { x: 0, y: 0, z: 0 },
    },
    gamma_red: 0,
    gamma_green: 0,
    gamma_blue: 0,
  };
}

/// Converts the `intent` field of a V5 header.
#[inline]
#[must_use]
pub const fn intent_from_raw(value: u32) -> Option<SrgbIntent> {
  match value {
    LCS_GM_ABS_COLORIMETRIC => Some(SrgbIntent::AbsoluteColorimetric),
    LCS_GM_BUSINESS => Some(SrgbIntent::Saturation),
    LCS_GM_GRAPHICS => Some(SrgbIntent::RelativeColorimetric),
    LCS_GM_IMAGES => Some(SrgbIntent::Perceptual),
    _ => None,
  }
}

/// Converts to the `intent` field of a V5 header. `None` is stored as 0.
#[inline]
#[must_use]
pub const fn intent_to_raw(intent: Option<SrgbIntent>) -> u32 {
  match intent {
    Some(SrgbIntent::AbsoluteColorimetric) => LCS_GM_ABS_COLORIMETRIC,
    Some(SrgbIntent::Perceptual) => LCS_GM_IMAGES,
    Some(SrgbIntent::RelativeColorimetric) => LCS_GM_GRAPHICS,
    Some(SrgbIntent::Saturation) => LCS_GM_BUSINESS,
    None => 0,
  }
}

#[test]
fn test_color_space_block() {
  use crate::stream::{Endian, SliceSource};
  use alloc::vec::Vec;

  assert_eq!(<ColorSpace as Wire>::SIZE, 52);
  assert_eq!(ColorSpaceType::from(u32::from_le_bytes(*b"BGRs")), ColorSpaceType::Srgb);
  assert_eq!(ColorSpaceType::from(u32::from_le_bytes(*b"DEBM")), ColorSpaceType::ProfileEmbedded);

  let cs = ColorSpace {
    kind: ColorSpaceType::Unknown(7),
    endpoints: CieXyzTriple { green: CieXyz { x: 1, y: 2, z: 3 }, ..Default::default() },
    gamma_red: 0x0001_0000,
    ..Default::default()
  };
  let mut w = StructWriter::new(Vec::new(), Endian::Little);
  w.write(&cs).unwrap();
  let bytes = w.into_inner();
  assert_eq!(&bytes[0..4], &[7, 0, 0, 0]);
  assert_eq!(&bytes[16..20], &[1, 0, 0, 0]);
  let mut r = StructReader::new(SliceSource::new(&bytes), Endian::Little);
  let back: ColorSpace = r.read().unwrap();
  assert_eq!(back, cs);

  for intent in [
    SrgbIntent::Perceptual,
    SrgbIntent::RelativeColorimetric,
    SrgbIntent::Saturation,
    SrgbIntent::AbsoluteColorimetric,
  ] {
    assert_eq!(intent_from_raw(intent_to_raw(Some(intent))), Some(intent));
  }
  assert_eq!(intent_from_raw(0), None);
}
