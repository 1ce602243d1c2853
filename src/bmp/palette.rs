//! The color table.
//!
//! Indexed images (8 bits per pixel or less) must have a palette. The default
//! length is `2**bits_per_pixel`, but the header can declare a shorter one.
//! Direct color images can still carry a palette, which was meant as a hint
//! for displays with a limited number of colors, and is otherwise unused.
//!
//! Entries are `[b, g, r]` with the core header and `[b, g, r, reserved]`
//! with every other header. Files are supposed to list the most important
//! colors first.

use alloc::vec::Vec;

use super::HeaderView;
use crate::{
  error::BmpError,
  pixel::Bgra32,
  stream::{ByteSink, ByteSource, StructReader, StructWriter},
};

/// How many palette entries a bitmap with this header has.
///
/// Fails if an indexed image declares more entries than its indexes can reach.
pub fn palette_entry_count(view: &HeaderView) -> Result<usize, BmpError> {
  let bits_per_pixel = view.bits_per_pixel;
  let declared = view.colors_used as usize;
  if (1..=8).contains(&bits_per_pixel) {
    let max = 1_usize << bits_per_pixel;
    if declared == 0 {
      Ok(max)
    } else if declared > max {
      Err(BmpError::MalformedPalette { entries: declared, bits_per_pixel })
    } else {
      Ok(declared)
    }
  } else {
    Ok(declared)
  }
}

/// Reads `count` palette entries, each `entry_width` (3 or 4) bytes.
///
/// 3-byte entries get an alpha of 0, the same as the usual reserved byte.
pub fn read_palette<S: ByteSource>(
  r: &mut StructReader<S>, count: usize, entry_width: usize,
) -> Result<Vec<Bgra32>, BmpError> {
  let mut palette = Vec::new();
  palette.try_reserve(count.min(256))?;
  for _ in 0..count {
    let entry = if entry_width == 3 {
      let [b, g, r] = r.read::<[u8; 3]>()?;
      Bgra32 { b, g, r, a: 0 }
    } else {
      let [b, g, r, a] = r.read::<[u8; 4]>()?;
      Bgra32 { b, g, r, a }
    };
    palette.push(entry);
  }
  Ok(palette)
}

/// Writes palette entries, each `entry_width` (3 or 4) bytes.
pub fn write_palette<K: ByteSink>(
  w: &mut StructWriter<K>, palette: &[Bgra32], entry_width: usize,
) -> Result<(), BmpError> {
  for &Bgra32 { b, g, r, a } in palette {
    if entry_width == 3 {
      w.write(&[b, g, r])?;
    } else {
      w.write(&[b, g, r, a])?;
    }
  }
  Ok(())
}

/// The palette with alpha fixed up for display.
///
/// The fourth byte of an entry is normally reserved and left as 0. If every
/// entry has 0 there, the palette is taken to be fully opaque. Otherwise the
/// values are used as alpha.
#[must_use]
pub fn opaque_palette(palette: &[Bgra32]) -> Vec<Bgra32> {
  if palette.iter().all(|p| p.a == 0) {
    palette.iter().map(|&p| Bgra32 { a: 255, ..p }).collect()
  } else {
    palette.to_vec()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    bmp::HeaderVersion,
    stream::{Endian, SliceSource},
  };

  #[test]
  fn test_palette_entry_count() {
    let mut view = HeaderView::new(HeaderVersion::InfoV3, 1, 1, 4);
    assert_eq!(palette_entry_count(&view), Ok(16));
    view.colors_used = 3;
    assert_eq!(palette_entry_count(&view), Ok(3));
    view.colors_used = 17;
    assert_eq!(
      palette_entry_count(&view),
      Err(BmpError::MalformedPalette { entries: 17, bits_per_pixel: 4 })
    );
    let mut view = HeaderView::new(HeaderVersion::InfoV3, 1, 1, 24);
    assert_eq!(palette_entry_count(&view), Ok(0));
    view.colors_used = 300;
    assert_eq!(palette_entry_count(&view), Ok(300));
  }

  #[test]
  fn test_three_and_four_byte_entries() {
    let bytes = [1, 2, 3, 4, 5, 6];
    let mut r = StructReader::new(SliceSource::new(&bytes), Endian::Little);
    let pal = read_palette(&mut r, 2, 3).unwrap();
    assert_eq!(pal, [Bgra32 { b: 1, g: 2, r: 3, a: 0 }, Bgra32 { b: 4, g: 5, r: 6, a: 0 }]);

    let mut w = StructWriter::new(Vec::new(), Endian::Little);
    write_palette(&mut w, &pal, 4).unwrap();
    assert_eq!(w.into_inner(), [1, 2, 3, 0, 4, 5, 6, 0]);

    let mut r = StructReader::new(SliceSource::new(&bytes), Endian::Little);
    assert!(matches!(read_palette(&mut r, 2, 4), Err(BmpError::TruncatedStream { .. })));
  }

  #[test]
  fn test_opaque_palette() {
    let pal = [Bgra32 { b: 1, g: 2, r: 3, a: 0 }];
    assert_eq!(opaque_palette(&pal)[0].a, 255);
    let pal = [Bgra32 { b: 1, g: 2, r: 3, a: 0 }, Bgra32 { b: 1, g: 2, r: 3, a: 7 }];
    assert_eq!(opaque_palette(&pal), pal);
  }
}
