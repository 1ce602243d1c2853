use alloc::vec::Vec;

use super::*;
use crate::{
  error::BmpError,
  image::{try_filled_vec, PixelGrid},
  options::DecodeOptions,
  pixel::Bgra32,
  stream::{ByteSink, ByteSource, Endian, SliceSource, StructReader, StructWriter},
  SrgbIntent,
};

const FILE_HEADER_SIZE: u64 = 14;

/// Everything about a bitmap other than its pixels.
///
/// Decoding fills this in from the file. For encoding, start with
/// [Metadata::new] and adjust the rest with the `with_*` methods or by
/// setting fields directly. Fields that the chosen header version can't hold
/// are ignored when encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Metadata {
  /// Width in pixels.
  pub width: u32,
  /// Height in pixels.
  pub height: u32,
  /// If rows are stored top row first.
  pub top_down: bool,
  /// Bits per pixel.
  pub bits_per_pixel: u16,
  /// The info header version.
  pub version: HeaderVersion,
  /// Compression of the pixel data.
  pub compression: BmpCompression,
  /// Channel masks, for bitfields compression.
  pub bitmasks: Option<Bitmasks>,
  /// Horizontal resolution.
  pub x_pixels_per_meter: i32,
  /// Vertical resolution.
  pub y_pixels_per_meter: i32,
  /// How many palette entries are important (0 means all).
  pub important_colors: u32,
  /// The V4/V5 color space block.
  pub color_space: Option<ColorSpace>,
  /// The V5 rendering intent.
  pub intent: Option<SrgbIntent>,
  /// The V5 ICC profile data (or linked profile file name), as stored.
  pub profile: Option<Vec<u8>>,
  /// The palette of a direct color image, if it has one.
  pub device_palette: Vec<Bgra32>,
  /// The OS/2 2.x extension fields.
  pub os2: Option<Os2Info>,
  /// The file size declared in the file header. Ignored when encoding.
  pub declared_file_size: u32,
}
impl Metadata {
  /// Metadata for an uncompressed, bottom-up bitmap with a 40 byte header.
  #[inline]
  #[must_use]
  pub const fn new(width: u32, height: u32, bits_per_pixel: u16) -> Self {
    Self {
      width,
      height,
      top_down: false,
      bits_per_pixel,
      version: HeaderVersion::InfoV3,
      compression: BmpCompression::Rgb,
      bitmasks: None,
      x_pixels_per_meter: 0,
      y_pixels_per_meter: 0,
      important_colors: 0,
      color_space: None,
      intent: None,
      profile: None,
      device_palette: Vec::new(),
      os2: None,
      declared_file_size: 0,
    }
  }

  /// Sets the header version.
  #[inline]
  #[must_use]
  pub fn with_version(self, version: HeaderVersion) -> Self {
    Self { version, ..self }
  }

  /// Sets the compression.
  #[inline]
  #[must_use]
  pub fn with_compression(self, compression: BmpCompression) -> Self {
    Self { compression, ..self }
  }

  /// Sets the channel masks.
  #[inline]
  #[must_use]
  pub fn with_bitmasks(self, bitmasks: Bitmasks) -> Self {
    Self { bitmasks: Some(bitmasks), ..self }
  }

  /// Sets the row order.
  #[inline]
  #[must_use]
  pub fn with_top_down(self, top_down: bool) -> Self {
    Self { top_down, ..self }
  }

  /// Sets the color space block.
  #[inline]
  #[must_use]
  pub fn with_color_space(self, color_space: ColorSpace) -> Self {
    Self { color_space: Some(color_space), ..self }
  }

  /// Sets the profile data.
  #[inline]
  #[must_use]
  pub fn with_profile(self, profile: Vec<u8>) -> Self {
    Self { profile: Some(profile), ..self }
  }
}

/// Decodes a bitmap with no resource limits.
///
/// See [decode_with_options].
#[inline]
pub fn decode<S: ByteSource>(source: S) -> Result<(PixelGrid, Metadata), BmpError> {
  decode_with_options(source, &DecodeOptions::default())
}

/// Decodes a bitmap held in memory.
#[inline]
pub fn decode_bytes(bytes: &[u8]) -> Result<(PixelGrid, Metadata), BmpError> {
  decode(SliceSource::new(bytes))
}

/// Decodes a bitmap starting at the current position of `source`.
///
/// Offsets within the file are taken to be relative to where the stream was
/// when this was called.
pub fn decode_with_options<S: ByteSource>(
  source: S, options: &DecodeOptions,
) -> Result<(PixelGrid, Metadata), BmpError> {
  let mut r = StructReader::new(source, Endian::Little);
  let start = r.position();
  let file_header: BitmapFileHeader = r.read()?;
  log::trace!("file header: {file_header:?}");
  file_header.check_tag()?;

  let dib_start = r.position();
  let header = DibHeader::read_from(&mut r)?;
  let view = header.view()?;
  options.check_dimensions(view.width, view.height)?;
  view.compression.check_bit_depth(view.bits_per_pixel)?;

  let mask_bytes = view.version.trailing_mask_bytes(view.compression);
  let masks = match mask_bytes {
    12 => Some(Bitmasks::from(r.read::<RgbBitmasks>()?)),
    16 => Some(r.read::<Bitmasks>()?),
    _ => view.bitmasks,
  };
  let masks = if view.compression.uses_bitmasks() {
    Some(effective_bitmasks(view.compression, view.bits_per_pixel, masks)?)
  } else {
    None
  };

  let palette_count = palette_entry_count(&view)?;
  let entry_width = view.version.palette_entry_width();
  let minimum = FILE_HEADER_SIZE
    + u64::from(view.version.header_size())
    + mask_bytes as u64
    + palette_count as u64 * entry_width as u64;
  let pixel_offset = file_header.pixel_data_offset;
  if u64::from(pixel_offset) < minimum {
    return Err(BmpError::PixelOffsetOverlap { offset: pixel_offset, minimum });
  }
  let palette = read_palette(&mut r, palette_count, entry_width)?;
  log::trace!("palette: {} entries of {entry_width} bytes", palette.len());

  let gap = u64::from(pixel_offset) - minimum;
  if gap > 0 {
    log::trace!("skipping a {gap} byte gap before the pixel data");
    r.seek_relative(gap as i64)?;
  }
  let (grid_palette, device_palette) =
    if view.bits_per_pixel <= 8 { (palette, Vec::new()) } else { (Vec::new(), palette) };
  let pixel_start = r.position();
  let grid = decode_pixels(&mut r, &view, masks, grid_palette)?;
  let pixel_bytes = r.position() - pixel_start;
  if !matches!(view.compression, BmpCompression::Rgb) && u64::from(view.image_size) > pixel_bytes {
    log::warn!(
      "the pixel data ended after {pixel_bytes} bytes, but {} were declared",
      view.image_size
    );
  }

  let profile = match view.profile {
    Some(ProfileLocation { offset, size }) => {
      options.check_profile_size(size)?;
      let target = dib_start + u64::from(offset);
      r.seek_relative(target as i64 - r.position() as i64)?;
      let mut bytes = try_filled_vec(size as usize, 0_u8)?;
      r.read_raw(&mut bytes)?;
      log::trace!("read a {size} byte profile at {target}");
      Some(bytes)
    }
    None => None,
  };

  let layout_end = r.position() - start;
  let declared_file_size = file_header.total_file_size;
  if declared_file_size != 0 && u64::from(declared_file_size) < layout_end {
    log::warn!("the file header declares {declared_file_size} bytes, but {layout_end} were used");
  }

  log::debug!(
    "decoded a {}x{} {}bpp {:?} bitmap with a {:?} header",
    view.width,
    view.height,
    view.bits_per_pixel,
    view.compression,
    view.version
  );
  let metadata = Metadata {
    width: view.width,
    height: view.height,
    top_down: view.top_down,
    bits_per_pixel: view.bits_per_pixel,
    version: view.version,
    compression: view.compression,
    bitmasks: masks,
    x_pixels_per_meter: view.x_pixels_per_meter,
    y_pixels_per_meter: view.y_pixels_per_meter,
    important_colors: view.colors_important,
    color_space: view.color_space,
    intent: view.intent,
    profile,
    device_palette,
    os2: view.os2,
    declared_file_size,
  };
  Ok((grid, metadata))
}

/// Checks that the header version can store the image as described.
fn check_version_support(meta: &Metadata) -> Result<(), BmpError> {
  use BmpCompression::*;
  let compression = meta.compression;
  match meta.version {
    HeaderVersion::CoreV2 => {
      if compression != Rgb {
        return Err(BmpError::UnsupportedCompression(compression));
      }
      if !matches!(meta.bits_per_pixel, 1 | 4 | 8 | 24) {
        return Err(BmpError::IllegalBitDepth { bits_per_pixel: meta.bits_per_pixel, compression });
      }
      if meta.width > u32::from(u16::MAX) || meta.height > u32::from(u16::MAX) {
        return Err(BmpError::InvalidHeader("dimensions too large for this header version"));
      }
    }
    HeaderVersion::Os2V2 { size } => {
      if HeaderVersion::from_size(size)? != meta.version {
        return Err(BmpError::UnsupportedHeaderSize(size));
      }
      // the compression field ends at byte 20
      if !matches!(compression, Rgb | Rle8 | Rle4) || (size < 20 && compression != Rgb) {
        return Err(BmpError::UnsupportedCompression(compression));
      }
    }
    HeaderVersion::InfoV3Rgb => {
      if compression == AlphaBitfields {
        return Err(BmpError::UnsupportedCompression(compression));
      }
    }
    _ => (),
  }
  // only the rgb masks get stored for plain bitfields with these headers
  let rgb_masks_only = matches!(meta.version, HeaderVersion::InfoV3 | HeaderVersion::InfoV3Rgb);
  if compression == Bitfields && rgb_masks_only {
    if let Some(Bitmasks { alpha, .. }) = meta.bitmasks.filter(|m| m.alpha != 0) {
      return Err(BmpError::InvalidBitmask(alpha));
    }
  }
  if meta.top_down && !meta.version.has_signed_height() {
    return Err(BmpError::InvalidHeader("this header version can't store a top-down image"));
  }
  Ok(())
}

/// If the header stores the palette length (rather than always implying the
/// full `2**bits_per_pixel` entries).
const fn stores_palette_length(version: HeaderVersion) -> bool {
  match version {
    HeaderVersion::CoreV2 => false,
    HeaderVersion::Os2V2 { size } => size >= 36,
    _ => true,
  }
}

/// Encodes a bitmap.
///
/// The grid must agree with the metadata: the same dimensions, indexed pixels
/// for 8 bits per pixel or less (with every index inside the palette), and
/// direct color otherwise. The file size, offsets, palette length, and image
/// size are all computed here.
pub fn encode<K: ByteSink>(grid: &PixelGrid, meta: &Metadata, sink: K) -> Result<(), BmpError> {
  let Metadata { width, height, bits_per_pixel, version, compression, top_down, .. } = *meta;
  if grid.width() != width || grid.height() != height {
    return Err(BmpError::GridMismatch("grid and metadata dimensions differ"));
  }
  check_sample_count(grid)?;
  check_version_support(meta)?;
  compression.check_bit_depth(bits_per_pixel)?;
  if top_down && !compression.allows_top_down() {
    return Err(BmpError::InconsistentOrientation(compression));
  }
  let masks = if compression.uses_bitmasks() {
    Some(effective_bitmasks(compression, bits_per_pixel, meta.bitmasks)?)
  } else {
    None
  };

  let mut palette = match grid {
    PixelGrid::Indexed(image) => {
      if bits_per_pixel > 8 {
        return Err(BmpError::GridMismatch("indexed pixels need 8 bits per pixel or less"));
      }
      let max = 1_usize << bits_per_pixel;
      if image.palette.is_empty() || image.palette.len() > max {
        return Err(BmpError::MalformedPalette { entries: image.palette.len(), bits_per_pixel });
      }
      if image.indexes.iter().any(|&i| usize::from(i) >= image.palette.len()) {
        return Err(BmpError::GridMismatch("an index is past the end of the palette"));
      }
      image.palette.clone()
    }
    PixelGrid::Direct(_) => {
      if bits_per_pixel <= 8 {
        return Err(BmpError::GridMismatch("direct color needs 16, 24, or 32 bits per pixel"));
      }
      meta.device_palette.clone()
    }
  };
  if !stores_palette_length(version) {
    if bits_per_pixel <= 8 {
      palette.try_reserve((1 << bits_per_pixel) - palette.len())?;
      palette.resize(1 << bits_per_pixel, Bgra32::default());
    } else if !palette.is_empty() {
      log::warn!("a {version:?} header can't store a device palette, dropping it");
      palette.clear();
    }
  }

  let rle = match grid {
    PixelGrid::Indexed(image) => rle_payload(image, compression)?,
    PixelGrid::Direct(_) => None,
  };
  let pixel_bytes = match &rle {
    Some(bytes) => bytes.len() as u64,
    None => uncompressed_size(width, height, bits_per_pixel)?,
  };

  let profile = match &meta.profile {
    Some(bytes) if !bytes.is_empty() => {
      let linked = meta.color_space.is_some_and(|cs| cs.kind.has_profile_data());
      if version != HeaderVersion::InfoV5 || !linked {
        return Err(BmpError::InvalidHeader(
          "profile data needs a V5 header with a linked or embedded color space",
        ));
      }
      Some(bytes.as_slice())
    }
    _ => None,
  };

  let header_size = u64::from(version.header_size());
  let mask_bytes = version.trailing_mask_bytes(compression);
  let entry_width = version.palette_entry_width();
  let palette_bytes = (palette.len() * entry_width) as u64;
  let pixel_offset = FILE_HEADER_SIZE + header_size + mask_bytes as u64 + palette_bytes;
  let profile_len = profile.map_or(0, |p| p.len() as u64);
  let total = pixel_offset + pixel_bytes + profile_len;
  let too_big = BmpError::InvalidHeader("the file would be larger than 4 GiB");
  let total = u32::try_from(total).map_err(|_| too_big.clone())?;
  let profile_location = match profile {
    Some(p) => Some(ProfileLocation {
      offset: u32::try_from(pixel_offset - FILE_HEADER_SIZE + pixel_bytes)
        .map_err(|_| too_big.clone())?,
      size: u32::try_from(p.len()).map_err(|_| too_big)?,
    }),
    None => None,
  };

  let view = HeaderView {
    version,
    width,
    height,
    top_down,
    planes: 1,
    bits_per_pixel,
    compression,
    image_size: pixel_bytes as u32,
    x_pixels_per_meter: meta.x_pixels_per_meter,
    y_pixels_per_meter: meta.y_pixels_per_meter,
    colors_used: palette.len() as u32,
    colors_important: meta.important_colors,
    bitmasks: masks,
    color_space: meta.color_space,
    intent: meta.intent,
    profile: profile_location,
    os2: meta.os2,
  };
  view.validate()?;
  let header = DibHeader::from_view(&view)?;

  let mut w = StructWriter::new(sink, Endian::Little);
  w.write(&BitmapFileHeader::new(total, pixel_offset as u32))?;
  header.write_to(&mut w)?;
  match (mask_bytes, masks) {
    (12, Some(m)) => w.write(&m.rgb())?,
    (16, Some(m)) => w.write(&m)?,
    _ => (),
  }
  write_palette(&mut w, &palette, entry_width)?;
  match (&rle, grid) {
    (Some(bytes), _) => w.write_raw(bytes)?,
    (None, grid) => encode_pixels(&mut w, grid, bits_per_pixel, compression, masks, top_down)?,
  }
  if let Some(p) = profile {
    w.write_raw(p)?;
  }
  log::debug!(
    "encoded a {width}x{height} {bits_per_pixel}bpp {compression:?} bitmap with a {version:?} \
     header, {total} bytes"
  );
  Ok(())
}

/// Encodes a bitmap into a new `Vec`.
#[inline]
pub fn encode_to_vec(grid: &PixelGrid, meta: &Metadata) -> Result<Vec<u8>, BmpError> {
  let mut out = Vec::new();
  encode(grid, meta, &mut out)?;
  Ok(out)
}
