//! Uncompressed pixel rows, in every bit depth.
//!
//! Each row is padded to a multiple of 4 bytes. Rows are stored bottom row
//! first unless the header marks the image as top-down.
//!
//! When the bits per pixel is less than 8 the indexes are packed within a
//! byte, with the leftmost pixel in the highest bits.

use alloc::vec::Vec;

use bitfrob::U8BitIterHigh;

use super::{decode_rle, encode_rle, BitfieldCodec, Bitmasks, BmpCompression, HeaderView, RleKind};
use crate::{
  error::BmpError,
  image::{try_filled_vec, Bitmap, Palmap, PixelGrid},
  pixel::{Bgr24, Bgra32},
  stream::{ByteSink, ByteSource, StructReader, StructWriter},
};

/// Bytes per row of uncompressed data, including the padding.
#[inline]
pub fn row_stride(width: u32, bits_per_pixel: u16) -> Result<usize, BmpError> {
  let bits = u64::from(width) * u64::from(bits_per_pixel);
  usize::try_from((bits + 31) / 32 * 4).map_err(|_| BmpError::Alloc)
}

/// Bytes of uncompressed pixel data for a whole image.
#[inline]
pub fn uncompressed_size(width: u32, height: u32, bits_per_pixel: u16) -> Result<u64, BmpError> {
  let stride = row_stride(width, bits_per_pixel)? as u64;
  stride.checked_mul(u64::from(height)).ok_or(BmpError::Alloc)
}

/// The grid row that the `i`th stored row goes to.
#[inline]
const fn grid_row(i: usize, height: usize, top_down: bool) -> usize {
  if top_down {
    i
  } else {
    height - 1 - i
  }
}

const fn rle_kind(compression: BmpCompression) -> Option<RleKind> {
  match compression {
    BmpCompression::Rle8 => Some(RleKind::Rle8),
    BmpCompression::Rle4 => Some(RleKind::Rle4),
    _ => None,
  }
}

/// The masks that 16bpp and 32bpp data is decoded (or encoded) with.
///
/// Uncompressed data has implied masks. Bitfields data must have been given
/// masks, which are checked for contiguity and fit.
pub fn effective_bitmasks(
  compression: BmpCompression, bits_per_pixel: u16, given: Option<Bitmasks>,
) -> Result<Bitmasks, BmpError> {
  let masks = if compression.uses_bitmasks() {
    given.ok_or(BmpError::InvalidHeader("bitfields compression needs bitmasks"))?
  } else {
    Bitmasks::default_for(bits_per_pixel)
      .ok_or(BmpError::IllegalBitDepth { bits_per_pixel, compression })?
  };
  masks.validate(bits_per_pixel)?;
  Ok(masks)
}

/// Decodes the pixel data of an image.
///
/// The stream must be at the start of the pixel data. Indexed images get the
/// palette attached, and are otherwise left as raw indexes (they're not
/// checked against the palette length).
pub fn decode_pixels<S: ByteSource>(
  r: &mut StructReader<S>, view: &HeaderView, masks: Option<Bitmasks>, palette: Vec<Bgra32>,
) -> Result<PixelGrid, BmpError> {
  let HeaderView { width, height, top_down, bits_per_pixel, compression, .. } = *view;
  compression.check_bit_depth(bits_per_pixel)?;
  if let Some(kind) = rle_kind(compression) {
    let indexes = decode_rle(r, kind, width, height)?;
    return Ok(PixelGrid::Indexed(Palmap { width, height, indexes, palette }));
  }

  let w = width as usize;
  let h = height as usize;
  let mut row = try_filled_vec(row_stride(width, bits_per_pixel)?, 0_u8)?;
  match bits_per_pixel {
    1 | 2 | 4 | 8 => {
      let mut image = Palmap::try_new(width, height, 0_u8, palette)?;
      let count = u32::from(bits_per_pixel);
      for i in 0..h {
        r.read_raw(&mut row)?;
        let y = grid_row(i, h, top_down);
        let out = &mut image.indexes[y * w..(y + 1) * w];
        let unpacked = row.iter().flat_map(|&bits| U8BitIterHigh::from_count_and_bits(count, bits));
        for (slot, index) in out.iter_mut().zip(unpacked) {
          *slot = index;
        }
      }
      Ok(PixelGrid::Indexed(image))
    }
    24 => {
      let mut image = Bitmap::try_new(width, height, Bgra32::default())?;
      for i in 0..h {
        r.read_raw(&mut row)?;
        let y = grid_row(i, h, top_down);
        let bgr: &[Bgr24] = bytemuck::cast_slice(&row[..w * 3]);
        for (slot, p) in image.pixels[y * w..(y + 1) * w].iter_mut().zip(bgr) {
          *slot = Bgra32::from(*p);
        }
      }
      Ok(PixelGrid::Direct(image))
    }
    _ => {
      let codec = BitfieldCodec::new(effective_bitmasks(compression, bits_per_pixel, masks)?);
      let mut image = Bitmap::try_new(width, height, Bgra32::default())?;
      for i in 0..h {
        r.read_raw(&mut row)?;
        let y = grid_row(i, h, top_down);
        let out = &mut image.pixels[y * w..(y + 1) * w];
        if bits_per_pixel == 16 {
          for (slot, c) in out.iter_mut().zip(row.chunks_exact(2)) {
            *slot = codec.unpack(u32::from(u16::from_le_bytes([c[0], c[1]])));
          }
        } else {
          for (slot, c) in out.iter_mut().zip(row.chunks_exact(4)) {
            *slot = codec.unpack(u32::from_le_bytes([c[0], c[1], c[2], c[3]]));
          }
        }
      }
      Ok(PixelGrid::Direct(image))
    }
  }
}

/// Builds the RLE payload of an indexed image, or `None` for other
/// compressions.
pub fn rle_payload(
  image: &Palmap<u8, Bgra32>, compression: BmpCompression,
) -> Result<Option<Vec<u8>>, BmpError> {
  match rle_kind(compression) {
    None => Ok(None),
    Some(kind) => {
      let w = (image.width as usize).max(1);
      encode_rle(image.indexes.chunks_exact(w).rev(), kind).map(Some)
    }
  }
}

/// Checks that the grid holds exactly `width * height` samples.
pub fn check_sample_count(grid: &PixelGrid) -> Result<(), BmpError> {
  let samples = match grid {
    PixelGrid::Indexed(image) => image.indexes.len(),
    PixelGrid::Direct(image) => image.pixels.len(),
  };
  if samples as u64 == u64::from(grid.width()) * u64::from(grid.height()) {
    Ok(())
  } else {
    Err(BmpError::GridMismatch("sample count doesn't match the dimensions"))
  }
}

/// Writes uncompressed pixel data.
///
/// The grid must be indexed for 8 bits per pixel or less and direct color
/// otherwise.
pub fn encode_pixels<K: ByteSink>(
  w: &mut StructWriter<K>, grid: &PixelGrid, bits_per_pixel: u16, compression: BmpCompression,
  masks: Option<Bitmasks>, top_down: bool,
) -> Result<(), BmpError> {
  check_sample_count(grid)?;
  let width = grid.width();
  let wu = width as usize;
  let h = grid.height() as usize;
  let mut row = try_filled_vec(row_stride(width, bits_per_pixel)?, 0_u8)?;
  match (grid, bits_per_pixel) {
    (PixelGrid::Indexed(image), 1 | 2 | 4 | 8) => {
      let bits = usize::from(bits_per_pixel);
      let per_byte = 8 / bits;
      let index_mask = ((1_u16 << bits) - 1) as u8;
      for i in 0..h {
        row.fill(0);
        let y = grid_row(i, h, top_down);
        for (x, &index) in image.indexes[y * wu..(y + 1) * wu].iter().enumerate() {
          let shift = 8 - bits * (x % per_byte + 1);
          row[x / per_byte] |= (index & index_mask) << shift;
        }
        w.write_raw(&row)?;
      }
    }
    (PixelGrid::Direct(image), 24) => {
      for i in 0..h {
        let y = grid_row(i, h, top_down);
        let bgr: &mut [Bgr24] = bytemuck::cast_slice_mut(&mut row[..wu * 3]);
        for (slot, p) in bgr.iter_mut().zip(&image.pixels[y * wu..(y + 1) * wu]) {
          *slot = Bgr24::from(*p);
        }
        w.write_raw(&row)?;
      }
    }
    (PixelGrid::Direct(image), 16 | 32) => {
      let codec = BitfieldCodec::new(effective_bitmasks(compression, bits_per_pixel, masks)?);
      for i in 0..h {
        let y = grid_row(i, h, top_down);
        let pixels = &image.pixels[y * wu..(y + 1) * wu];
        if bits_per_pixel == 16 {
          for (c, p) in row.chunks_exact_mut(2).zip(pixels) {
            c.copy_from_slice(&(codec.pack(*p) as u16).to_le_bytes());
          }
        } else {
          for (c, p) in row.chunks_exact_mut(4).zip(pixels) {
            c.copy_from_slice(&codec.pack(*p).to_le_bytes());
          }
        }
        w.write_raw(&row)?;
      }
    }
    (PixelGrid::Indexed(_), _) => {
      return Err(BmpError::GridMismatch("indexed pixels need 8 bits per pixel or less"))
    }
    (PixelGrid::Direct(_), _) => {
      return Err(BmpError::GridMismatch("direct color needs 16, 24, or 32 bits per pixel"))
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    bmp::HeaderVersion,
    stream::{Endian, SliceSource},
  };
  use alloc::vec;

  fn decode(
    bytes: &[u8], view: &HeaderView, masks: Option<Bitmasks>,
  ) -> Result<PixelGrid, BmpError> {
    let mut r = StructReader::new(SliceSource::new(bytes), Endian::Little);
    decode_pixels(&mut r, view, masks, vec![])
  }

  fn encode(grid: &PixelGrid, view: &HeaderView, masks: Option<Bitmasks>) -> Vec<u8> {
    let mut w = StructWriter::new(Vec::new(), Endian::Little);
    encode_pixels(&mut w, grid, view.bits_per_pixel, view.compression, masks, view.top_down)
      .unwrap();
    w.into_inner()
  }

  #[test]
  fn test_row_stride() {
    assert_eq!(row_stride(9, 1), Ok(4));
    assert_eq!(row_stride(33, 1), Ok(8));
    assert_eq!(row_stride(3, 24), Ok(12));
    assert_eq!(row_stride(1, 24), Ok(4));
    assert_eq!(row_stride(5, 4), Ok(4));
    assert_eq!(uncompressed_size(3, 2, 16), Ok(16));
  }

  #[test]
  fn test_1bpp_bottom_up() {
    let view = HeaderView::new(HeaderVersion::InfoV3, 9, 2, 1);
    // bottom row: 1 then eight 0s, top row: eight 0s then 1
    let bytes = [0b1000_0000, 0, 0, 0, 0, 0b1000_0000, 0, 0];
    let grid = decode(&bytes, &view, None).unwrap();
    let PixelGrid::Indexed(image) = &grid else { panic!() };
    assert_eq!(image.indexes, [0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(encode(&grid, &view, None), bytes);
  }

  #[test]
  fn test_4bpp_top_down() {
    let view = HeaderView { top_down: true, ..HeaderView::new(HeaderVersion::InfoV3, 3, 2, 4) };
    let bytes = [0x12, 0x30, 0, 0, 0x45, 0x60, 0, 0];
    let grid = decode(&bytes, &view, None).unwrap();
    let PixelGrid::Indexed(image) = &grid else { panic!() };
    assert_eq!(image.indexes, [1, 2, 3, 4, 5, 6]);
    assert_eq!(encode(&grid, &view, None), bytes);
  }

  #[test]
  fn test_24bpp() {
    let view = HeaderView::new(HeaderVersion::InfoV3, 1, 2, 24);
    let bytes = [1, 2, 3, 0, 4, 5, 6, 0];
    let grid = decode(&bytes, &view, None).unwrap();
    let PixelGrid::Direct(image) = &grid else { panic!() };
    let top = Bgra32 { b: 4, g: 5, r: 6, a: 255 };
    let bottom = Bgra32 { b: 1, g: 2, r: 3, a: 255 };
    assert_eq!(image.pixels, [top, bottom]);
    assert_eq!(encode(&grid, &view, None), bytes);
  }

  #[test]
  fn test_32bpp_rgb_ignores_fourth_byte() {
    let view = HeaderView::new(HeaderVersion::InfoV3, 1, 1, 32);
    let grid = decode(&[1, 2, 3, 99], &view, None).unwrap();
    let PixelGrid::Direct(image) = &grid else { panic!() };
    assert_eq!(image.pixels, [Bgra32 { b: 1, g: 2, r: 3, a: 255 }]);
    assert_eq!(encode(&grid, &view, None), [1, 2, 3, 0]);
  }

  #[test]
  fn test_16bpp_bitfields() {
    let view = HeaderView {
      compression: BmpCompression::Bitfields,
      ..HeaderView::new(HeaderVersion::InfoV3, 2, 1, 16)
    };
    let masks = Some(Bitmasks::RGB565);
    let grid = decode(&[0x00, 0xF8, 0x1F, 0x00], &view, masks).unwrap();
    let PixelGrid::Direct(image) = &grid else { panic!() };
    let red = Bgra32 { b: 0, g: 0, r: 255, a: 255 };
    let blue = Bgra32 { b: 255, g: 0, r: 0, a: 255 };
    assert_eq!(image.pixels, [red, blue]);
    assert_eq!(encode(&grid, &view, masks), [0x00, 0xF8, 0x1F, 0x00]);

    assert_eq!(
      decode(&[0; 4], &view, Some(Bitmasks { red: 0xF0F0, ..Bitmasks::RGB565 })),
      Err(BmpError::InvalidBitmask(0xF0F0))
    );
  }

  #[test]
  fn test_truncated_rows() {
    let view = HeaderView::new(HeaderVersion::InfoV3, 2, 2, 24);
    assert_eq!(
      decode(&[0; 12], &view, None),
      Err(BmpError::TruncatedStream { offset: 8, needed: 4 })
    );
  }

  #[test]
  fn test_grid_mismatch() {
    let grid = PixelGrid::Direct(Bitmap::try_new(1, 1, Bgra32::default()).unwrap());
    let mut w = StructWriter::new(Vec::new(), Endian::Little);
    assert!(matches!(
      encode_pixels(&mut w, &grid, 8, BmpCompression::Rgb, None, false),
      Err(BmpError::GridMismatch(_))
    ));
  }
}
