//! Picking the right info header, and a single view over all of them.
//!
//! Every info header starts with its own size, and that size is the only way
//! to tell the versions apart. The headers overlap heavily: every Windows
//! header extends the one before it, and OS/2 2.x headers share the layout of
//! the 40 byte header while reading some of the fields differently.

use alloc::vec::Vec;

use super::*;
use crate::{
  error::BmpError,
  stream::{ByteSink, ByteSource, SliceSource, StructReader, StructWriter},
  SrgbIntent,
};

/// The largest info header, in bytes.
pub const MAX_INFO_HEADER_SIZE: usize = 124;

/// Which info header a bitmap uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum HeaderVersion {
  /// 12 bytes, [BitmapCoreHeader].
  CoreV2,
  /// 40 bytes, [BitmapInfoHeader].
  #[default]
  InfoV3,
  /// 52 bytes, [BitmapV2InfoHeader].
  InfoV3Rgb,
  /// 56 bytes, [BitmapV3InfoHeader].
  InfoV3Rgba,
  /// 108 bytes, [BitmapV4Header].
  InfoV4,
  /// 124 bytes, [BitmapV5Header].
  InfoV5,
  /// 16 to 64 bytes, [Os22xBitmapHeader].
  Os2V2 {
    /// The stored header size.
    size: u32,
  },
}
impl HeaderVersion {
  /// Selects the header version from the header's size field.
  ///
  /// The exact Windows sizes win over the OS/2 range.
  #[inline]
  pub const fn from_size(size: u32) -> Result<Self, BmpError> {
    Ok(match size {
      12 => Self::CoreV2,
      40 => Self::InfoV3,
      52 => Self::InfoV3Rgb,
      56 => Self::InfoV3Rgba,
      108 => Self::InfoV4,
      124 => Self::InfoV5,
      16..=64 => Self::Os2V2 { size },
      _ => return Err(BmpError::UnsupportedHeaderSize(size)),
    })
  }

  /// The size of this header in a file.
  #[inline]
  #[must_use]
  pub const fn header_size(self) -> u32 {
    match self {
      Self::CoreV2 => 12,
      Self::InfoV3 => 40,
      Self::InfoV3Rgb => 52,
      Self::InfoV3Rgba => 56,
      Self::InfoV4 => 108,
      Self::InfoV5 => 124,
      Self::Os2V2 { size } => size,
    }
  }

  /// Bytes per palette entry: 3 for the core header, otherwise 4.
  #[inline]
  #[must_use]
  pub const fn palette_entry_width(self) -> usize {
    match self {
      Self::CoreV2 => 3,
      _ => 4,
    }
  }

  /// Bytes of bitmasks stored right after the header.
  ///
  /// Only the 40 byte header does this. Larger Windows headers hold the masks
  /// themselves.
  #[inline]
  #[must_use]
  pub const fn trailing_mask_bytes(self, compression: BmpCompression) -> usize {
    match (self, compression) {
      (Self::InfoV3, BmpCompression::Bitfields) => 12,
      (Self::InfoV3, BmpCompression::AlphaBitfields) => 16,
      _ => 0,
    }
  }

  /// If the header can describe a top-down image.
  #[inline]
  #[must_use]
  pub const fn has_signed_height(self) -> bool {
    !matches!(self, Self::CoreV2 | Self::Os2V2 { .. })
  }
}

/// Where a V5 header says the profile data is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ProfileLocation {
  /// Offset from the start of the info header.
  pub offset: u32,
  /// Size in bytes.
  pub size: u32,
}

/// An info header of any version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum DibHeader {
  CoreV2(BitmapCoreHeader),
  InfoV3(BitmapInfoHeader),
  InfoV3Rgb(BitmapV2InfoHeader),
  InfoV3Rgba(BitmapV3InfoHeader),
  InfoV4(BitmapV4Header),
  InfoV5(BitmapV5Header),
  Os2V2(Os22xBitmapHeader),
}

/// The fields of any info header, in one version-agnostic form.
///
/// Heights are always positive here, with orientation given separately by
/// `top_down`. Fields that a header version doesn't have are zero or `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeaderView {
  /// The header version this came from (or will be written as).
  pub version: HeaderVersion,
  /// Width in pixels.
  pub width: u32,
  /// Height in pixels.
  pub height: u32,
  /// If the first row stored is the top row.
  pub top_down: bool,
  /// Should be 1.
  pub planes: u16,
  /// Bits per pixel.
  pub bits_per_pixel: u16,
  /// Compression of the pixel data.
  pub compression: BmpCompression,
  /// Declared size of the pixel data (0 is allowed for uncompressed data).
  pub image_size: u32,
  /// Horizontal resolution.
  pub x_pixels_per_meter: i32,
  /// Vertical resolution.
  pub y_pixels_per_meter: i32,
  /// Declared palette length (0 means "the default").
  pub colors_used: u32,
  /// How many palette entries are important (0 means all).
  pub colors_important: u32,
  /// Bitmasks held in the header itself, when the compression uses them.
  pub bitmasks: Option<Bitmasks>,
  /// The V4/V5 color space block.
  pub color_space: Option<ColorSpace>,
  /// The V5 rendering intent.
  pub intent: Option<SrgbIntent>,
  /// The V5 profile data location, when the color space uses profile data.
  pub profile: Option<ProfileLocation>,
  /// The OS/2 2.x extension fields.
  pub os2: Option<Os2Info>,
}
impl HeaderView {
  /// A view with the given size and depth, and everything else defaulted.
  #[inline]
  #[must_use]
  pub const fn new(version: HeaderVersion, width: u32, height: u32, bits_per_pixel: u16) -> Self {
    Self {
      version,
      width,
      height,
      top_down: false,
      planes: 1,
      bits_per_pixel,
      compression: BmpCompression::Rgb,
      image_size: 0,
      x_pixels_per_meter: 0,
      y_pixels_per_meter: 0,
      colors_used: 0,
      colors_important: 0,
      bitmasks: None,
      color_space: None,
      intent: None,
      profile: None,
      os2: None,
    }
  }

  /// Checks the rules that every header version shares.
  pub fn validate(&self) -> Result<(), BmpError> {
    const MAX_DIMENSION: u32 = i32::MAX as u32;
    if self.width == 0 {
      return Err(BmpError::InvalidHeader("width must be positive"));
    }
    if self.height == 0 {
      return Err(BmpError::InvalidHeader("height must not be zero"));
    }
    if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
      return Err(BmpError::InvalidHeader("dimensions must fit in an i32"));
    }
    if self.planes != 1 {
      return Err(BmpError::InvalidHeader("planes must be 1"));
    }
    if !matches!(self.bits_per_pixel, 0 | 1 | 2 | 4 | 8 | 16 | 24 | 32) {
      return Err(BmpError::InvalidHeader("unknown bits per pixel"));
    }
    if self.top_down && !self.compression.allows_top_down() {
      return Err(BmpError::InconsistentOrientation(self.compression));
    }
    Ok(())
  }
}

fn view_of_info(version: HeaderVersion, info: &BitmapInfoHeader) -> Result<HeaderView, BmpError> {
  let signed = version.has_signed_height();
  let compression = BmpCompression::from_raw(info.compression, !signed)?;
  if signed && info.width < 0 {
    return Err(BmpError::InvalidHeader("width must be positive"));
  }
  let (height, top_down) = if signed && info.height < 0 {
    (info.height.unsigned_abs(), true)
  } else {
    (info.height as u32, false)
  };
  Ok(HeaderView {
    version,
    width: info.width as u32,
    height,
    top_down,
    planes: info.planes,
    bits_per_pixel: info.bits_per_pixel,
    compression,
    image_size: info.image_size,
    x_pixels_per_meter: info.x_pixels_per_meter,
    y_pixels_per_meter: info.y_pixels_per_meter,
    colors_used: info.colors_used,
    colors_important: info.colors_important,
    bitmasks: None,
    color_space: None,
    intent: None,
    profile: None,
    os2: None,
  })
}

fn masks_if_used(view: &HeaderView, masks: Bitmasks) -> Option<Bitmasks> {
  if view.compression.uses_bitmasks() {
    Some(masks)
  } else {
    None
  }
}

impl DibHeader {
  /// Reads an info header of any version.
  ///
  /// The size field is read first and picks the version. OS/2 2.x headers
  /// shorter than 64 bytes are read as if the rest of the header was zeroes.
  pub fn read_from<S: ByteSource>(r: &mut StructReader<S>) -> Result<Self, BmpError> {
    let mut buf = [0_u8; MAX_INFO_HEADER_SIZE];
    r.read_raw(&mut buf[..4])?;
    let size = StructReader::new(SliceSource::new(&buf[..4]), r.endian()).read_u32()?;
    let version = HeaderVersion::from_size(size)?;
    if let HeaderVersion::Os2V2 { size: 17..=39 | 41..=51 | 53..=55 | 57..=63 } = version {
      log::warn!("unusual info header size {size}, reading it as an OS/2 2.x header");
    }
    r.read_raw(&mut buf[4..size as usize])?;
    // Everything is now in `buf`. For short OS/2 headers the unread tail stays
    // zeroed, which gives the missing fields their zero default.
    let mut body = StructReader::new(SliceSource::new(&buf), r.endian());
    let header = match version {
      HeaderVersion::CoreV2 => Self::CoreV2(body.read()?),
      HeaderVersion::InfoV3 => Self::InfoV3(body.read()?),
      HeaderVersion::InfoV3Rgb => Self::InfoV3Rgb(body.read()?),
      HeaderVersion::InfoV3Rgba => Self::InfoV3Rgba(body.read()?),
      HeaderVersion::InfoV4 => Self::InfoV4(body.read()?),
      HeaderVersion::InfoV5 => Self::InfoV5(body.read()?),
      HeaderVersion::Os2V2 { .. } => Self::Os2V2(body.read()?),
    };
    log::trace!("info header: {header:?}");
    Ok(header)
  }

  /// Writes the header. OS/2 headers are cut down to their stored size.
  pub fn write_to<K: ByteSink>(&self, w: &mut StructWriter<K>) -> Result<(), BmpError> {
    match self {
      Self::CoreV2(h) => w.write(h),
      Self::InfoV3(h) => w.write(h),
      Self::InfoV3Rgb(h) => w.write(h),
      Self::InfoV3Rgba(h) => w.write(h),
      Self::InfoV4(h) => w.write(h),
      Self::InfoV5(h) => w.write(h),
      Self::Os2V2(h) => {
        let mut full = StructWriter::new(Vec::new(), w.endian());
        full.write(h)?;
        let bytes = full.into_inner();
        let size = (h.info.size as usize).clamp(16, bytes.len());
        w.write_raw(&bytes[..size])
      }
    }
  }

  /// The version of this header.
  #[inline]
  #[must_use]
  pub const fn version(&self) -> HeaderVersion {
    match self {
      Self::CoreV2(_) => HeaderVersion::CoreV2,
      Self::InfoV3(_) => HeaderVersion::InfoV3,
      Self::InfoV3Rgb(_) => HeaderVersion::InfoV3Rgb,
      Self::InfoV3Rgba(_) => HeaderVersion::InfoV3Rgba,
      Self::InfoV4(_) => HeaderVersion::InfoV4,
      Self::InfoV5(_) => HeaderVersion::InfoV5,
      Self::Os2V2(h) => HeaderVersion::Os2V2 { size: h.info.size },
    }
  }

  /// Gets the version-agnostic view of the header, checking the rules shared
  /// by all versions.
  pub fn view(&self) -> Result<HeaderView, BmpError> {
    let version = self.version();
    let view = match self {
      Self::CoreV2(h) => HeaderView {
        planes: h.planes,
        ..HeaderView::new(version, u32::from(h.width), u32::from(h.height), h.bits_per_pixel)
      },
      Self::InfoV3(h) => view_of_info(version, h)?,
      Self::InfoV3Rgb(h) => {
        let v = view_of_info(version, &h.info)?;
        HeaderView { bitmasks: masks_if_used(&v, h.masks.into()), ..v }
      }
      Self::InfoV3Rgba(h) => {
        let v = view_of_info(version, &h.info)?;
        HeaderView { bitmasks: masks_if_used(&v, h.masks), ..v }
      }
      Self::InfoV4(h) => {
        let v = view_of_info(version, &h.info)?;
        HeaderView {
          bitmasks: masks_if_used(&v, h.masks),
          color_space: Some(h.color_space),
          ..v
        }
      }
      Self::InfoV5(h) => {
        let v4 = &h.v4;
        let v = view_of_info(version, &v4.info)?;
        let profile = if v4.color_space.kind.has_profile_data() && h.profile_size > 0 {
          Some(ProfileLocation { offset: h.profile_data, size: h.profile_size })
        } else {
          None
        };
        HeaderView {
          bitmasks: masks_if_used(&v, v4.masks),
          color_space: Some(v4.color_space),
          intent: intent_from_raw(h.intent),
          profile,
          ..v
        }
      }
      Self::Os2V2(h) => {
        HeaderView { os2: Some(Os2Info::from(h)), ..view_of_info(version, &h.info)? }
      }
    };
    view.validate()?;
    Ok(view)
  }

  /// Builds the header described by a view.
  ///
  /// Fields the version can't hold are dropped. The profile location is
  /// written as given, so callers must fill it in with the real layout.
  pub fn from_view(view: &HeaderView) -> Result<Self, BmpError> {
    let too_large = BmpError::InvalidHeader("dimensions too large for this header version");
    let version = view.version;
    let width = i32::try_from(view.width).map_err(|_| too_large.clone())?;
    let height = i32::try_from(view.height).map_err(|_| too_large.clone())?;
    let info = BitmapInfoHeader {
      size: version.header_size(),
      width,
      height: if view.top_down { -height } else { height },
      planes: view.planes,
      bits_per_pixel: view.bits_per_pixel,
      compression: view.compression.to_raw(),
      image_size: view.image_size,
      x_pixels_per_meter: view.x_pixels_per_meter,
      y_pixels_per_meter: view.y_pixels_per_meter,
      colors_used: view.colors_used,
      colors_important: view.colors_important,
    };
    let masks = view.bitmasks.unwrap_or_default();
    let color_space = view.color_space.unwrap_or(ColorSpace::SRGB);
    let v4 = BitmapV4Header { info, masks, color_space };
    Ok(match version {
      HeaderVersion::CoreV2 => Self::CoreV2(BitmapCoreHeader {
        size: 12,
        width: u16::try_from(view.width).map_err(|_| too_large.clone())?,
        height: u16::try_from(view.height).map_err(|_| too_large)?,
        planes: view.planes,
        bits_per_pixel: view.bits_per_pixel,
      }),
      HeaderVersion::InfoV3 => Self::InfoV3(info),
      HeaderVersion::InfoV3Rgb => Self::InfoV3Rgb(BitmapV2InfoHeader { info, masks: masks.rgb() }),
      HeaderVersion::InfoV3Rgba => Self::InfoV3Rgba(BitmapV3InfoHeader { info, masks }),
      HeaderVersion::InfoV4 => Self::InfoV4(v4),
      HeaderVersion::InfoV5 => {
        let profile = view.profile.unwrap_or_default();
        Self::InfoV5(BitmapV5Header {
          v4,
          intent: intent_to_raw(view.intent),
          profile_data: profile.offset,
          profile_size: profile.size,
          reserved: 0,
        })
      }
      HeaderVersion::Os2V2 { size } => {
        let os2 = view.os2.unwrap_or_default();
        let (halftoning_algorithm, halftoning_param1, halftoning_param2) =
          os2.halftoning.to_fields();
        Self::Os2V2(Os22xBitmapHeader {
          info: BitmapInfoHeader { size, ..info },
          resolution_units: os2.resolution_units,
          reserved: 0,
          origin: os2.origin,
          halftoning_algorithm,
          halftoning_param1,
          halftoning_param2,
          color_encoding: os2.color_encoding,
          identifier: os2.identifier,
        })
      }
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::stream::Endian;

  fn header_bytes(size: u32, rest: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&size.to_le_bytes());
    v.extend_from_slice(rest);
    v.resize(size as usize, 0);
    v
  }

  fn read(bytes: &[u8]) -> Result<DibHeader, BmpError> {
    DibHeader::read_from(&mut StructReader::new(SliceSource::new(bytes), Endian::Little))
  }

  #[test]
  fn test_header_size_resolution() {
    assert_eq!(HeaderVersion::from_size(12), Ok(HeaderVersion::CoreV2));
    assert_eq!(HeaderVersion::from_size(40), Ok(HeaderVersion::InfoV3));
    assert_eq!(HeaderVersion::from_size(52), Ok(HeaderVersion::InfoV3Rgb));
    assert_eq!(HeaderVersion::from_size(56), Ok(HeaderVersion::InfoV3Rgba));
    assert_eq!(HeaderVersion::from_size(108), Ok(HeaderVersion::InfoV4));
    assert_eq!(HeaderVersion::from_size(124), Ok(HeaderVersion::InfoV5));
    assert_eq!(HeaderVersion::from_size(16), Ok(HeaderVersion::Os2V2 { size: 16 }));
    assert_eq!(HeaderVersion::from_size(64), Ok(HeaderVersion::Os2V2 { size: 64 }));
    for bad in [0, 4, 11, 13, 15, 65, 100, 107, 123, 125, u32::MAX] {
      assert_eq!(HeaderVersion::from_size(bad), Err(BmpError::UnsupportedHeaderSize(bad)));
    }
  }

  #[test]
  fn test_core_header_view() {
    // width 3, height 2, planes 1, 8bpp
    let h = read(&header_bytes(12, &[3, 0, 2, 0, 1, 0, 8, 0])).unwrap();
    assert_eq!(h.version(), HeaderVersion::CoreV2);
    let v = h.view().unwrap();
    assert_eq!((v.width, v.height, v.top_down, v.bits_per_pixel), (3, 2, false, 8));
    assert_eq!(v.compression, BmpCompression::Rgb);
  }

  #[test]
  fn test_short_os2_header_defaults_to_zero() {
    // width 5, height 7, planes 1, 4bpp, and then nothing else
    let h = read(&header_bytes(16, &[5, 0, 0, 0, 7, 0, 0, 0, 1, 0, 4, 0])).unwrap();
    let DibHeader::Os2V2(os2) = h else { panic!("expected an OS/2 header, got {h:?}") };
    assert_eq!(os2.info.size, 16);
    assert_eq!(os2.info.compression, 0);
    assert_eq!(os2.info.colors_used, 0);
    assert_eq!(os2.halftoning_algorithm, 0);
    let v = h.view().unwrap();
    assert_eq!((v.width, v.height, v.bits_per_pixel), (5, 7, 4));
    assert_eq!(v.os2.map(|o| o.header_size), Some(16));

    // writing it back gives only the stored 16 bytes
    let mut w = StructWriter::new(Vec::new(), Endian::Little);
    h.write_to(&mut w).unwrap();
    assert_eq!(w.into_inner(), header_bytes(16, &[5, 0, 0, 0, 7, 0, 0, 0, 1, 0, 4, 0]));
  }

  #[test]
  fn test_os2_compression_meanings() {
    let mut rest = [0_u8; 36];
    rest[0] = 1; // width
    rest[4] = 1; // height
    rest[8] = 1; // planes
    rest[10] = 24; // bpp
    rest[12] = 4; // compression
    let h = read(&header_bytes(64, &rest)).unwrap();
    assert_eq!(h.view().unwrap().compression, BmpCompression::Rle24);
    let h = read(&header_bytes(40, &rest)).unwrap();
    assert_eq!(h.view().unwrap().compression, BmpCompression::Jpeg);
  }

  #[test]
  fn test_top_down_rules() {
    let mut rest = [0_u8; 36];
    rest[0] = 4;
    rest[4..8].copy_from_slice(&(-3_i32).to_le_bytes());
    rest[8] = 1;
    rest[10] = 8;
    let h = read(&header_bytes(40, &rest)).unwrap();
    let v = h.view().unwrap();
    assert!(v.top_down);
    assert_eq!(v.height, 3);

    rest[12] = 1; // RLE8
    let h = read(&header_bytes(40, &rest)).unwrap();
    assert_eq!(h.view(), Err(BmpError::InconsistentOrientation(BmpCompression::Rle8)));

    rest[4..8].copy_from_slice(&0_i32.to_le_bytes());
    let h = read(&header_bytes(40, &rest)).unwrap();
    assert_eq!(h.view(), Err(BmpError::InvalidHeader("height must not be zero")));
  }

  #[test]
  fn test_truncated_header() {
    let bytes = header_bytes(40, &[1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 24, 0]);
    assert_eq!(read(&bytes[..20]), Err(BmpError::TruncatedStream { offset: 4, needed: 20 }));
    assert_eq!(read(&bytes[..2]), Err(BmpError::TruncatedStream { offset: 0, needed: 2 }));
  }

  #[test]
  fn test_view_round_trip_every_version() {
    for version in [
      HeaderVersion::CoreV2,
      HeaderVersion::InfoV3,
      HeaderVersion::InfoV3Rgb,
      HeaderVersion::InfoV3Rgba,
      HeaderVersion::InfoV4,
      HeaderVersion::InfoV5,
      HeaderVersion::Os2V2 { size: 64 },
      HeaderVersion::Os2V2 { size: 24 },
    ] {
      let view = HeaderView::new(version, 17, 5, 8);
      let h = DibHeader::from_view(&view).unwrap();
      let mut w = StructWriter::new(Vec::new(), Endian::Little);
      h.write_to(&mut w).unwrap();
      let bytes = w.into_inner();
      assert_eq!(bytes.len(), version.header_size() as usize, "failed version:{version:?}");
      let back = read(&bytes).unwrap();
      assert_eq!(back, h, "failed version:{version:?}");
      let v = back.view().unwrap();
      assert_eq!((v.version, v.width, v.height, v.bits_per_pixel), (version, 17, 5, 8));
    }
  }
}
