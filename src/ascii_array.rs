use core::fmt::Write;

use crate::{
  error::BmpError,
  stream::{ByteSink, ByteSource, StructReader, StructWriter, Wire},
};

/// An array of bytes expected to contain ascii data.
///
/// There's no enforced encoding. The `Debug` and `Display` impls just `as` cast
/// each byte into a character, which is what you want for the two-letter tags
/// at the start of a bitmap file, and still safe when the file is garbage.
///
/// On the wire this is an opaque blob: it's never byte swapped.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct AsciiArray<const N: usize>(pub [u8; N]);

impl<const N: usize> Default for AsciiArray<N> {
  #[inline]
  fn default() -> Self {
    Self([0; N])
  }
}

impl<const N: usize> core::fmt::Debug for AsciiArray<N> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_char('\"')?;
    core::fmt::Display::fmt(self, f)?;
    f.write_char('\"')
  }
}
impl<const N: usize> core::fmt::Display for AsciiArray<N> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    for ch in self.0.iter().copied().map(|u| u as char) {
      f.write_char(ch)?;
    }
    Ok(())
  }
}

impl<const N: usize> From<[u8; N]> for AsciiArray<N> {
  #[inline]
  fn from(array: [u8; N]) -> Self {
    Self(array)
  }
}

impl<const N: usize> Wire for AsciiArray<N> {
  const SIZE: usize = N;
  #[inline]
  fn read_from<S: ByteSource>(r: &mut StructReader<S>) -> Result<Self, BmpError> {
    <[u8; N]>::read_from(r).map(Self)
  }
  #[inline]
  fn write_to<K: ByteSink>(&self, w: &mut StructWriter<K>) -> Result<(), BmpError> {
    self.0.write_to(w)
  }
}

#[test]
fn test_ascii_array_fmt() {
  use std::format;
  let tag = AsciiArray(*b"BM");
  assert_eq!(format!("{tag}"), "BM");
  assert_eq!(format!("{tag:?}"), "\"BM\"");
}
