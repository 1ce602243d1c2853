//! The BMP format's run-length encoding system.
//!
//! The pixel data is pulled off two bytes at a time. If the first byte of a
//! pair is **non-zero** it's the number of times that the second byte appears
//! in the output. If the first byte is **zero** the pair is an escape, and the
//! second byte gives the details:
//!
//! * 0: end of row
//! * 1: end of bitmap
//! * 2: delta, the *next* two bytes are unsigned offsets to the right and up
//!   of where the output should move to (RLE data always has a bottom-left
//!   origin).
//! * 3+: literal, the second byte is how many indexes follow with no
//!   repetition. The literal data is padded to an even number of bytes.
//!
//! RLE4 works the same way, except that each output byte is really two
//! outputs (upper bits then lower bits). A run alternates between the two
//! nibbles of its byte.

use alloc::vec::Vec;
use core::num::NonZeroU8;

use crate::{
  error::BmpError,
  image::try_filled_vec,
  stream::{ByteSource, StructReader},
};

/// Which RLE flavor some data uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RleKind {
  /// One index per byte.
  Rle8,
  /// Two indexes per byte, high nibble first.
  Rle4,
}
impl RleKind {
  /// How many bytes `count` literal indexes take, before padding.
  #[inline]
  #[must_use]
  pub const fn literal_bytes(self, count: usize) -> usize {
    match self {
      Self::Rle8 => count,
      Self::Rle4 => (count + 1) / 2,
    }
  }

  /// The index at position `i` of literal data.
  #[inline]
  fn nth_index(self, bytes: &[u8], i: usize) -> u8 {
    match self {
      Self::Rle8 => bytes[i],
      Self::Rle4 => {
        let byte = bytes[i / 2];
        if i % 2 == 0 {
          byte >> 4
        } else {
          byte & 0b1111
        }
      }
    }
  }
}

/// Run-length encoded operations.
///
/// RLE decoding always starts at (0,0), with the origin in the lower left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RleOp {
  /// A run of `count` indexes made from `value`.
  Run {
    /// How many indexes.
    count: NonZeroU8,
    /// The index (RLE8) or pair of indexes (RLE4).
    value: u8,
  },
  /// x = 0, y += 1.
  EndOfRow,
  /// End of the RLE sequence.
  EndOfBitmap,
  /// Adjust the current position right and up as specified.
  Delta {
    /// Added to x.
    right: u8,
    /// Added to y.
    up: u8,
  },
  /// `count` literal indexes follow in the stream (3 or more).
  Literal {
    /// How many indexes.
    count: u8,
  },
}

/// Reads the next operation, not including any literal data.
pub fn read_rle_op<S: ByteSource>(r: &mut StructReader<S>) -> Result<RleOp, BmpError> {
  let [a, b] = r.read::<[u8; 2]>()?;
  Ok(match NonZeroU8::new(a) {
    Some(count) => RleOp::Run { count, value: b },
    None => match b {
      0 => RleOp::EndOfRow,
      1 => RleOp::EndOfBitmap,
      2 => {
        let [right, up] = r.read::<[u8; 2]>()?;
        RleOp::Delta { right, up }
      }
      count => RleOp::Literal { count },
    },
  })
}

/// Decodes RLE data into palette indexes, top row first.
///
/// Stops at the end-of-bitmap escape. Pixels that are skipped over by a delta
/// or an early end of row are left as index 0.
pub fn decode_rle<S: ByteSource>(
  r: &mut StructReader<S>, kind: RleKind, width: u32, height: u32,
) -> Result<Vec<u8>, BmpError> {
  let w = width as usize;
  let h = height as usize;
  let mut indexes = try_filled_vec(w.checked_mul(h).ok_or(BmpError::Alloc)?, 0_u8)?;
  let mut literal = [0_u8; 255];
  let (mut x, mut y) = (0_usize, 0_usize);
  loop {
    let offset = r.position();
    let bad_record = BmpError::InvalidRleRecord { offset };
    let op = read_rle_op(r)?;
    match op {
      RleOp::Run { count, value } => {
        let count = usize::from(count.get());
        if y >= h || x + count > w {
          return Err(bad_record);
        }
        let fill = match kind {
          RleKind::Rle8 => [value, value],
          RleKind::Rle4 => [value >> 4, value & 0b1111],
        };
        let row_start = (h - 1 - y) * w + x;
        for (i, out) in indexes[row_start..row_start + count].iter_mut().enumerate() {
          *out = fill[i % 2];
        }
        x += count;
      }
      RleOp::EndOfRow => {
        x = 0;
        y += 1;
      }
      RleOp::EndOfBitmap => break,
      RleOp::Delta { right, up } => {
        x += usize::from(right);
        y += usize::from(up);
        if x > w || y > h {
          return Err(bad_record);
        }
      }
      RleOp::Literal { count } => {
        let count = usize::from(count);
        if y >= h || x + count > w {
          return Err(bad_record);
        }
        let byte_count = kind.literal_bytes(count);
        let bytes = &mut literal[..byte_count];
        r.read_raw(bytes)?;
        if byte_count % 2 != 0 {
          r.read::<u8>()?;
        }
        let row_start = (h - 1 - y) * w + x;
        for (i, out) in indexes[row_start..row_start + count].iter_mut().enumerate() {
          *out = kind.nth_index(bytes, i);
        }
        x += count;
      }
    }
  }
  log::trace!("RLE data ended at x:{x}, y:{y}");
  Ok(indexes)
}

/// Encodes rows of palette indexes as RLE data.
///
/// Rows must be given in file order (bottom row first). Each row ends with an
/// end-of-row escape, and the data ends with an end-of-bitmap escape. RLE4
/// indexes must be less than 16.
pub fn encode_rle<'a, I>(rows: I, kind: RleKind) -> Result<Vec<u8>, BmpError>
where
  I: IntoIterator<Item = &'a [u8]>,
{
  let mut out = Vec::new();
  for row in rows {
    encode_row(&mut out, row, kind)?;
    push(&mut out, &[0, 0])?;
  }
  push(&mut out, &[0, 1])?;
  Ok(out)
}

fn push(out: &mut Vec<u8>, bytes: &[u8]) -> Result<(), BmpError> {
  out.try_reserve(bytes.len())?;
  out.extend_from_slice(bytes);
  Ok(())
}

fn run_byte(kind: RleKind, index: u8) -> u8 {
  match kind {
    RleKind::Rle8 => index,
    RleKind::Rle4 => (index & 0b1111) << 4 | (index & 0b1111),
  }
}

fn encode_row(out: &mut Vec<u8>, row: &[u8], kind: RleKind) -> Result<(), BmpError> {
  const MAX: usize = u8::MAX as usize;
  let starts_repeat = |j: usize| j + 1 < row.len() && row[j] == row[j + 1];
  let mut i = 0;
  while i < row.len() {
    let v = row[i];
    let run = row[i..].iter().take(MAX).take_while(|&&p| p == v).count();
    if run >= 2 {
      push(out, &[run as u8, run_byte(kind, v)])?;
      i += run;
      continue;
    }
    let mut j = i + 1;
    while j < row.len() && j - i < MAX && !starts_repeat(j) {
      j += 1;
    }
    let stretch = &row[i..j];
    if stretch.len() >= 3 {
      push(out, &[0, stretch.len() as u8])?;
      let start = out.len();
      match kind {
        RleKind::Rle8 => push(out, stretch)?,
        RleKind::Rle4 => {
          for pair in stretch.chunks(2) {
            let hi = pair[0] & 0b1111;
            let lo = pair.get(1).map_or(0, |p| p & 0b1111);
            push(out, &[hi << 4 | lo])?;
          }
        }
      }
      if (out.len() - start) % 2 != 0 {
        push(out, &[0])?;
      }
    } else {
      for &p in stretch {
        push(out, &[1, run_byte(kind, p)])?;
      }
    }
    i = j;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::stream::{Endian, SliceSource};
  use alloc::vec;

  fn reader(bytes: &[u8]) -> StructReader<SliceSource<'_>> {
    StructReader::new(SliceSource::new(bytes), Endian::Little)
  }

  #[test]
  fn test_read_rle_op() {
    let three = NonZeroU8::new(3).unwrap();
    assert_eq!(read_rle_op(&mut reader(&[3, 9])), Ok(RleOp::Run { count: three, value: 9 }));
    assert_eq!(read_rle_op(&mut reader(&[0, 0])), Ok(RleOp::EndOfRow));
    assert_eq!(read_rle_op(&mut reader(&[0, 1])), Ok(RleOp::EndOfBitmap));
    assert_eq!(read_rle_op(&mut reader(&[0, 2, 5, 1])), Ok(RleOp::Delta { right: 5, up: 1 }));
    assert_eq!(read_rle_op(&mut reader(&[0, 3])), Ok(RleOp::Literal { count: 3 }));
    assert!(matches!(
      read_rle_op(&mut reader(&[0, 2, 5])),
      Err(BmpError::TruncatedStream { .. })
    ));
  }

  #[test]
  fn test_rle8_run_then_end() {
    // three of index 9, end of row (nothing more), end of bitmap
    let bytes = [3, 9, 0, 0, 0, 1, 0xAA, 0xBB];
    let mut r = reader(&bytes);
    let indexes = decode_rle(&mut r, RleKind::Rle8, 4, 2).unwrap();
    // the bottom row is written first, the top row is untouched
    assert_eq!(indexes, [0, 0, 0, 0, 9, 9, 9, 0]);
    // decoding stopped after end-of-bitmap
    assert_eq!(r.position(), 6);
  }

  #[test]
  fn test_rle8_literal_and_delta() {
    // literal 1,2,3 (padded), delta right 0 up 1, one 7, end of bitmap
    let bytes = [0, 3, 1, 2, 3, 0, 0, 2, 0, 1, 1, 7, 0, 1];
    let indexes = decode_rle(&mut reader(&bytes), RleKind::Rle8, 4, 2).unwrap();
    assert_eq!(indexes, [0, 0, 0, 7, 1, 2, 3, 0]);
  }

  #[test]
  fn test_rle4_nibbles() {
    // run of 5 alternating 1,2; end of row; literal 3,4,5 (padded); end
    let bytes = [5, 0x12, 0, 0, 0, 3, 0x34, 0x50, 0, 1];
    let indexes = decode_rle(&mut reader(&bytes), RleKind::Rle4, 5, 2).unwrap();
    assert_eq!(indexes, [3, 4, 5, 0, 0, 1, 2, 1, 2, 1]);
  }

  #[test]
  fn test_rle_errors() {
    // run too long for the row
    assert_eq!(
      decode_rle(&mut reader(&[0, 0, 5, 1, 0, 1]), RleKind::Rle8, 4, 2),
      Err(BmpError::InvalidRleRecord { offset: 2 })
    );
    // delta out of the image
    assert_eq!(
      decode_rle(&mut reader(&[0, 2, 0, 3, 0, 1]), RleKind::Rle8, 4, 2),
      Err(BmpError::InvalidRleRecord { offset: 0 })
    );
    // pixels past the top row
    assert_eq!(
      decode_rle(&mut reader(&[0, 0, 0, 0, 1, 1]), RleKind::Rle8, 4, 2),
      Err(BmpError::InvalidRleRecord { offset: 4 })
    );
    // no end of bitmap
    assert!(matches!(
      decode_rle(&mut reader(&[2, 1, 0, 0]), RleKind::Rle8, 4, 2),
      Err(BmpError::TruncatedStream { .. })
    ));
  }

  #[test]
  fn test_encode_rle8() {
    let row: &[u8] = &[7, 7, 7, 1, 2, 3, 4, 5, 5, 9];
    let out = encode_rle([row], RleKind::Rle8).unwrap();
    assert_eq!(out, [3, 7, 0, 4, 1, 2, 3, 4, 2, 5, 1, 9, 0, 0, 0, 1]);
    let back = decode_rle(&mut reader(&out), RleKind::Rle8, 10, 1).unwrap();
    assert_eq!(back, row);
  }

  #[test]
  fn test_encode_rle4_round_trip() {
    let rows: [&[u8]; 2] = [&[1, 2, 3, 3, 3, 3, 0, 15, 4], &[5, 6, 5, 6, 5, 6, 5, 6, 5]];
    let out = encode_rle(rows, RleKind::Rle4).unwrap();
    assert_eq!(out.len() % 2, 0);
    let back = decode_rle(&mut reader(&out), RleKind::Rle4, 9, 2).unwrap();
    // file order is bottom-up, the grid is top-down
    let mut expected = vec![];
    expected.extend_from_slice(rows[1]);
    expected.extend_from_slice(rows[0]);
    assert_eq!(back, expected);
  }
}
