#![forbid(unsafe_code)]

//! Provides heap-allocated image types.
//!
//! Rows are always stored top row first, whatever the orientation of the file
//! that the image came from (or will go to).

use alloc::vec::Vec;

use crate::{
  error::BmpError,
  pixel::{Bgra32, PixelFormat},
};

/// Converts an `(x,y)` position within a given `width` 2D space into a linear
/// index.
///
/// You don't ever need to call this function yourself, but it's how the image
/// containers convert 2d coordinates into index values within their payload
/// vectors.
#[inline]
#[must_use]
pub const fn xy_width_to_index(x: u32, y: u32, width: u32) -> usize {
  (y as usize * width as usize) + x as usize
}

/// Allocates `count` copies of `fill`, reporting allocation failure as an
/// error instead of aborting.
pub(crate) fn try_filled_vec<T: Clone>(count: usize, fill: T) -> Result<Vec<T>, BmpError> {
  let mut v = Vec::new();
  v.try_reserve(count)?;
  v.resize(count, fill);
  Ok(v)
}

fn checked_area(width: u32, height: u32) -> Result<usize, BmpError> {
  (width as usize).checked_mul(height as usize).ok_or(BmpError::Alloc)
}

/// A direct-color image.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub struct Bitmap<P = Bgra32> {
  pub width: u32,
  pub height: u32,
  pub pixels: Vec<P>,
}
impl<P: Clone> Bitmap<P> {
  /// Makes an image with every pixel set to `fill`.
  pub fn try_new(width: u32, height: u32, fill: P) -> Result<Self, BmpError> {
    let pixels = try_filled_vec(checked_area(width, height)?, fill)?;
    Ok(Self { width, height, pixels })
  }
}
impl<P> Bitmap<P> {
  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get(&self, x: u32, y: u32) -> Option<&P> {
    if x < self.width && y < self.height {
      self.pixels.get(xy_width_to_index(x, y, self.width))
    } else {
      None
    }
  }

  /// Gets the pixel at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut P> {
    if x < self.width && y < self.height {
      self.pixels.get_mut(xy_width_to_index(x, y, self.width))
    } else {
      None
    }
  }

  /// Sets the pixel at the position. Returns `false` if the position is out of
  /// bounds.
  #[inline]
  pub fn set(&mut self, x: u32, y: u32, p: P) -> bool {
    match self.get_mut(x, y) {
      Some(slot) => {
        *slot = p;
        true
      }
      None => false,
    }
  }

  /// The pixels of row `y` (0 is the top row).
  #[inline]
  #[must_use]
  pub fn row(&self, y: u32) -> Option<&[P]> {
    let w = self.width as usize;
    let start = (y as usize).checked_mul(w)?;
    self.pixels.get(start..start.checked_add(w)?)
  }

  /// Flips the image top to bottom.
  #[inline]
  pub fn vertical_flip(&mut self) {
    vertical_flip(&mut self.pixels, self.width, self.height)
  }
}
impl<P: PixelFormat> Bitmap<P> {
  /// Converts every pixel to another format.
  #[must_use]
  pub fn convert<Q: PixelFormat>(&self) -> Bitmap<Q> {
    Bitmap {
      width: self.width,
      height: self.height,
      pixels: self.pixels.iter().map(|p| p.convert()).collect(),
    }
  }
}

/// An indexed-color image.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub struct Palmap<I = u8, P = Bgra32> {
  pub width: u32,
  pub height: u32,
  pub indexes: Vec<I>,
  pub palette: Vec<P>,
}
impl<I: Clone, P> Palmap<I, P> {
  /// Makes an image with every index set to `fill`.
  pub fn try_new(width: u32, height: u32, fill: I, palette: Vec<P>) -> Result<Self, BmpError> {
    let indexes = try_filled_vec(checked_area(width, height)?, fill)?;
    Ok(Self { width, height, indexes, palette })
  }
}
impl<I, P> Palmap<I, P> {
  /// Gets the index at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get(&self, x: u32, y: u32) -> Option<&I> {
    if x < self.width && y < self.height {
      self.indexes.get(xy_width_to_index(x, y, self.width))
    } else {
      None
    }
  }

  /// Gets the index at the position, or `None` if the position is out of
  /// bounds.
  #[inline]
  #[must_use]
  pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut I> {
    if x < self.width && y < self.height {
      self.indexes.get_mut(xy_width_to_index(x, y, self.width))
    } else {
      None
    }
  }

  /// Sets the index at the position. Returns `false` if the position is out of
  /// bounds.
  #[inline]
  pub fn set(&mut self, x: u32, y: u32, i: I) -> bool {
    match self.get_mut(x, y) {
      Some(slot) => {
        *slot = i;
        true
      }
      None => false,
    }
  }

  /// The indexes of row `y` (0 is the top row).
  #[inline]
  #[must_use]
  pub fn row(&self, y: u32) -> Option<&[I]> {
    let w = self.width as usize;
    let start = (y as usize).checked_mul(w)?;
    self.indexes.get(start..start.checked_add(w)?)
  }

  /// Flips the image top to bottom.
  #[inline]
  pub fn vertical_flip(&mut self) {
    vertical_flip(&mut self.indexes, self.width, self.height)
  }
}

fn vertical_flip<T>(data: &mut [T], width: u32, height: u32) {
  let mut data = data;
  let mut temp_height = height;
  while temp_height > 1 {
    let (low, mid) = data.split_at_mut(width as usize);
    let (mid, high) = mid.split_at_mut(mid.len() - width as usize);
    low.swap_with_slice(high);
    data = mid;
    temp_height -= 2;
  }
}

/// The pixels of a decoded bitmap, or the pixels to encode.
///
/// Images of 8 bits per pixel or less are indexed, and the rest are direct
/// color.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PixelGrid {
  /// Palette indexes, along with the palette.
  Indexed(Palmap<u8, Bgra32>),
  /// Direct color values.
  Direct(Bitmap<Bgra32>),
}
impl PixelGrid {
  /// Width in pixels.
  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    match self {
      Self::Indexed(p) => p.width,
      Self::Direct(b) => b.width,
    }
  }

  /// Height in pixels.
  #[inline]
  #[must_use]
  pub const fn height(&self) -> u32 {
    match self {
      Self::Indexed(p) => p.height,
      Self::Direct(b) => b.height,
    }
  }

  /// Resolves the grid into direct color of any format.
  ///
  /// If every palette entry has an alpha of 0 the palette is taken to be fully
  /// opaque, since that's what the reserved byte of a BMP palette usually
  /// holds.
  #[must_use]
  pub fn to_bitmap<Q: PixelFormat>(&self) -> Bitmap<Q> {
    match self {
      Self::Direct(b) => b.convert(),
      Self::Indexed(p) => {
        let palette = crate::bmp::opaque_palette(&p.palette);
        Bitmap {
          width: p.width,
          height: p.height,
          pixels: p
            .indexes
            .iter()
            .map(|&i| palette.get(usize::from(i)).copied().unwrap_or_default().convert())
            .collect(),
        }
      }
    }
  }
}

#[test]
fn test_vertical_flip() {
  use alloc::vec;
  let mut b = Bitmap { width: 2, height: 3, pixels: vec![1, 2, 3, 4, 5, 6] };
  b.vertical_flip();
  assert_eq!(b.pixels, vec![5, 6, 3, 4, 1, 2]);
  assert_eq!(b.row(0), Some(&[5, 6][..]));
  assert_eq!(b.row(3), None);
}

#[test]
fn test_palmap_to_bitmap() {
  use alloc::vec;
  let palette = vec![Bgra32 { b: 1, g: 2, r: 3, a: 0 }, Bgra32 { b: 4, g: 5, r: 6, a: 0 }];
  let mut p = Palmap::try_new(2, 1, 0_u8, palette).unwrap();
  assert!(p.set(1, 0, 1));
  assert!(!p.set(2, 0, 1));
  let grid = PixelGrid::Indexed(p);
  let rgba: Bitmap<crate::pixel::Rgba32> = grid.to_bitmap();
  assert_eq!(rgba.pixels[0], crate::pixel::Rgba32 { r: 3, g: 2, b: 1, a: 255 });
  assert_eq!(rgba.pixels[1], crate::pixel::Rgba32 { r: 6, g: 5, b: 4, a: 255 });
}
