//! Byte streams, and endian-aware reading and writing of fixed-layout records.
//!
//! The codec only needs a tiny amount from a stream: read (or write) an exact
//! number of bytes, report the current position, and (for reading) skip
//! around relative to the current position. That's what [ByteSource] and
//! [ByteSink] provide.
//!
//! On top of those, [StructReader] and [StructWriter] are given a declared
//! [Endian] for the stream. Each scalar that goes through them is byte swapped
//! only when that declared endianness differs from the host's, so on a little
//! endian machine reading a little endian file the swap compiles away.
//!
//! Records (file headers, info headers, bitmasks, and so on) implement [Wire].
//! The [wire_record!](crate::wire_record) macro declares a struct and its
//! field list together, so the field order used for (de)serialization is
//! written down exactly once and nested records just recurse.

use core::mem::size_of;

use alloc::vec::Vec;

use crate::error::BmpError;

/// The byte order of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
  /// Least significant byte first. All BMP data is little endian.
  Little,
  /// Most significant byte first.
  Big,
}
impl Endian {
  /// The byte order of the machine we're running on.
  #[cfg(target_endian = "little")]
  pub const NATIVE: Self = Self::Little;
  /// The byte order of the machine we're running on.
  #[cfg(target_endian = "big")]
  pub const NATIVE: Self = Self::Big;

  /// If values in this byte order must be swapped to be used on this machine.
  #[inline]
  #[must_use]
  pub const fn needs_swap(self) -> bool {
    !matches!((self, Self::NATIVE), (Self::Little, Self::Little) | (Self::Big, Self::Big))
  }
}

/// A readable, seekable stream of bytes.
pub trait ByteSource {
  /// Fills all of `buf`, or fails.
  ///
  /// If this fails the position of the stream is unspecified.
  fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), BmpError>;

  /// The current position, in bytes.
  fn position(&self) -> u64;

  /// Moves the position forward (or backward, with a negative delta).
  fn seek_relative(&mut self, delta: i64) -> Result<(), BmpError>;
}
impl<S: ByteSource + ?Sized> ByteSource for &mut S {
  #[inline]
  fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), BmpError> {
    (**self).read_bytes(buf)
  }
  #[inline]
  fn position(&self) -> u64 {
    (**self).position()
  }
  #[inline]
  fn seek_relative(&mut self, delta: i64) -> Result<(), BmpError> {
    (**self).seek_relative(delta)
  }
}

/// A writable stream of bytes.
pub trait ByteSink {
  /// Writes all of `bytes`, or fails.
  fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BmpError>;

  /// The current position, in bytes.
  fn position(&self) -> u64;
}
impl<K: ByteSink + ?Sized> ByteSink for &mut K {
  #[inline]
  fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BmpError> {
    (**self).write_bytes(bytes)
  }
  #[inline]
  fn position(&self) -> u64 {
    (**self).position()
  }
}
impl ByteSink for Vec<u8> {
  #[inline]
  fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BmpError> {
    self.try_reserve(bytes.len())?;
    self.extend_from_slice(bytes);
    Ok(())
  }
  #[inline]
  fn position(&self) -> u64 {
    self.len() as u64
  }
}

/// A [ByteSource] over bytes already in memory.
#[derive(Debug, Clone)]
pub struct SliceSource<'b> {
  bytes: &'b [u8],
  pos: usize,
}
impl<'b> SliceSource<'b> {
  /// Starts reading at the beginning of `bytes`.
  #[inline]
  #[must_use]
  pub const fn new(bytes: &'b [u8]) -> Self {
    Self { bytes, pos: 0 }
  }

  /// The bytes that haven't been read yet.
  #[inline]
  #[must_use]
  pub fn remaining(&self) -> &'b [u8] {
    self.bytes.get(self.pos..).unwrap_or_default()
  }
}
impl ByteSource for SliceSource<'_> {
  #[inline]
  fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), BmpError> {
    let available = self.bytes.len().saturating_sub(self.pos);
    if buf.len() > available {
      return Err(BmpError::TruncatedStream {
        offset: self.pos as u64,
        needed: buf.len() - available,
      });
    }
    let end = self.pos + buf.len();
    buf.copy_from_slice(&self.bytes[self.pos..end]);
    self.pos = end;
    Ok(())
  }

  #[inline]
  fn position(&self) -> u64 {
    self.pos as u64
  }

  #[inline]
  fn seek_relative(&mut self, delta: i64) -> Result<(), BmpError> {
    let target = self.pos as i64 + delta;
    if target < 0 {
      return Err(BmpError::StreamFailure { offset: self.pos as u64 });
    }
    let target = target as u64;
    let len = self.bytes.len() as u64;
    if target > len {
      return Err(BmpError::TruncatedStream { offset: len, needed: (target - len) as usize });
    }
    self.pos = target as usize;
    Ok(())
  }
}

/// A [ByteSource] over any `std::io` reader that can also seek.
///
/// Positions are counted from where the reader was when it was wrapped.
#[cfg(feature = "std")]
#[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
#[derive(Debug)]
pub struct IoSource<R> {
  inner: R,
  pos: u64,
}
#[cfg(feature = "std")]
impl<R: std::io::Read + std::io::Seek> IoSource<R> {
  /// Wraps a reader.
  #[inline]
  pub const fn new(inner: R) -> Self {
    Self { inner, pos: 0 }
  }
  /// Unwraps the reader.
  #[inline]
  pub fn into_inner(self) -> R {
    self.inner
  }
}
#[cfg(feature = "std")]
impl<R: std::io::Read + std::io::Seek> ByteSource for IoSource<R> {
  fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), BmpError> {
    match self.inner.read_exact(buf) {
      Ok(()) => {
        self.pos += buf.len() as u64;
        Ok(())
      }
      Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
        Err(BmpError::TruncatedStream { offset: self.pos, needed: buf.len() })
      }
      Err(_) => Err(BmpError::StreamFailure { offset: self.pos }),
    }
  }

  #[inline]
  fn position(&self) -> u64 {
    self.pos
  }

  fn seek_relative(&mut self, delta: i64) -> Result<(), BmpError> {
    let target = self.pos as i64 + delta;
    if target < 0 {
      return Err(BmpError::StreamFailure { offset: self.pos });
    }
    self
      .inner
      .seek(std::io::SeekFrom::Current(delta))
      .map_err(|_| BmpError::StreamFailure { offset: self.pos })?;
    self.pos = target as u64;
    Ok(())
  }
}

/// A [ByteSink] over any `std::io` writer.
#[cfg(feature = "std")]
#[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
#[derive(Debug)]
pub struct IoSink<W> {
  inner: W,
  pos: u64,
}
#[cfg(feature = "std")]
impl<W: std::io::Write> IoSink<W> {
  /// Wraps a writer.
  #[inline]
  pub const fn new(inner: W) -> Self {
    Self { inner, pos: 0 }
  }
  /// Unwraps the writer.
  #[inline]
  pub fn into_inner(self) -> W {
    self.inner
  }
}
#[cfg(feature = "std")]
impl<W: std::io::Write> ByteSink for IoSink<W> {
  fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BmpError> {
    self.inner.write_all(bytes).map_err(|_| BmpError::StreamFailure { offset: self.pos })?;
    self.pos += bytes.len() as u64;
    Ok(())
  }
  #[inline]
  fn position(&self) -> u64 {
    self.pos
  }
}

/// A value with a fixed binary layout.
///
/// Scalars swap their bytes as needed, byte arrays pass through untouched, and
/// records (see [wire_record!](crate::wire_record)) handle each field in order.
pub trait Wire: Sized {
  /// The exact number of bytes this takes in a stream.
  const SIZE: usize;

  /// Reads a value, advancing the stream by exactly [Wire::SIZE] bytes.
  fn read_from<S: ByteSource>(r: &mut StructReader<S>) -> Result<Self, BmpError>;

  /// Writes a value, advancing the stream by exactly [Wire::SIZE] bytes.
  fn write_to<K: ByteSink>(&self, w: &mut StructWriter<K>) -> Result<(), BmpError>;
}

macro_rules! impl_wire_for_int {
  ($($t:ty),* $(,)?) => {
    $(
      impl Wire for $t {
        const SIZE: usize = size_of::<$t>();
        #[inline]
        fn read_from<S: ByteSource>(r: &mut StructReader<S>) -> Result<Self, BmpError> {
          let mut bytes = [0_u8; size_of::<$t>()];
          r.read_raw(&mut bytes)?;
          let v = <$t>::from_ne_bytes(bytes);
          Ok(if r.endian().needs_swap() { v.swap_bytes() } else { v })
        }
        #[inline]
        fn write_to<K: ByteSink>(&self, w: &mut StructWriter<K>) -> Result<(), BmpError> {
          let v = if w.endian().needs_swap() { self.swap_bytes() } else { *self };
          w.write_raw(&v.to_ne_bytes())
        }
      }
    )*
  };
}
impl_wire_for_int!(u8, i8, u16, i16, u32, i32, u64, i64);

macro_rules! impl_wire_for_float {
  ($($t:ty => $bits:ty),* $(,)?) => {
    $(
      impl Wire for $t {
        const SIZE: usize = size_of::<$t>();
        #[inline]
        fn read_from<S: ByteSource>(r: &mut StructReader<S>) -> Result<Self, BmpError> {
          <$bits>::read_from(r).map(<$t>::from_bits)
        }
        #[inline]
        fn write_to<K: ByteSink>(&self, w: &mut StructWriter<K>) -> Result<(), BmpError> {
          self.to_bits().write_to(w)
        }
      }
    )*
  };
}
impl_wire_for_float!(f32 => u32, f64 => u64);

impl<const N: usize> Wire for [u8; N] {
  const SIZE: usize = N;
  #[inline]
  fn read_from<S: ByteSource>(r: &mut StructReader<S>) -> Result<Self, BmpError> {
    let mut a = [0_u8; N];
    r.read_raw(&mut a)?;
    Ok(a)
  }
  #[inline]
  fn write_to<K: ByteSink>(&self, w: &mut StructWriter<K>) -> Result<(), BmpError> {
    w.write_raw(self)
  }
}

/// Declares a struct along with its [Wire] impl.
///
/// Fields are read and written in the order they're declared. Every field type
/// must itself be [Wire], which includes other records declared this way.
///
/// ```
/// dibkit::wire_record! {
///   #[derive(Debug, Clone, Copy, PartialEq, Eq)]
///   pub struct Pair {
///     pub a: u16,
///     pub b: u32,
///   }
/// }
/// assert_eq!(<Pair as dibkit::stream::Wire>::SIZE, 6);
/// ```
#[macro_export]
macro_rules! wire_record {
  (
    $(#[$struct_meta:meta])*
    $vis:vis struct $name:ident {
      $(
        $(#[$field_meta:meta])*
        $field_vis:vis $field:ident : $field_ty:ty
      ),* $(,)?
    }
  ) => {
    $(#[$struct_meta])*
    $vis struct $name {
      $(
        $(#[$field_meta])*
        $field_vis $field : $field_ty,
      )*
    }
    impl $crate::stream::Wire for $name {
      const SIZE: usize = 0 $( + <$field_ty as $crate::stream::Wire>::SIZE )*;
      #[inline]
      fn read_from<S: $crate::stream::ByteSource>(
        r: &mut $crate::stream::StructReader<S>,
      ) -> ::core::result::Result<Self, $crate::BmpError> {
        ::core::result::Result::Ok(Self {
          $( $field: <$field_ty as $crate::stream::Wire>::read_from(r)?, )*
        })
      }
      #[inline]
      fn write_to<K: $crate::stream::ByteSink>(
        &self,
        w: &mut $crate::stream::StructWriter<K>,
      ) -> ::core::result::Result<(), $crate::BmpError> {
        $( <$field_ty as $crate::stream::Wire>::write_to(&self.$field, w)?; )*
        ::core::result::Result::Ok(())
      }
    }
  };
}

/// Reads scalars and records from a [ByteSource] with a declared byte order.
#[derive(Debug)]
pub struct StructReader<S> {
  source: S,
  endian: Endian,
}
impl<S: ByteSource> StructReader<S> {
  /// Reads from `source`, which holds data in the `endian` byte order.
  #[inline]
  pub const fn new(source: S, endian: Endian) -> Self {
    Self { source, endian }
  }

  /// The declared byte order of the stream.
  #[inline]
  #[must_use]
  pub const fn endian(&self) -> Endian {
    self.endian
  }

  /// The position of the underlying stream.
  #[inline]
  #[must_use]
  pub fn position(&self) -> u64 {
    self.source.position()
  }

  /// Reads any [Wire] value.
  #[inline]
  pub fn read<T: Wire>(&mut self) -> Result<T, BmpError> {
    T::read_from(self)
  }

  /// Reads bytes with no byte order processing.
  #[inline]
  pub fn read_raw(&mut self, buf: &mut [u8]) -> Result<(), BmpError> {
    self.source.read_bytes(buf)
  }

  /// Reads a `u8`.
  #[inline]
  pub fn read_u8(&mut self) -> Result<u8, BmpError> {
    self.read()
  }
  /// Reads a `u16`.
  #[inline]
  pub fn read_u16(&mut self) -> Result<u16, BmpError> {
    self.read()
  }
  /// Reads a `u32`.
  #[inline]
  pub fn read_u32(&mut self) -> Result<u32, BmpError> {
    self.read()
  }
  /// Reads an `i32`.
  #[inline]
  pub fn read_i32(&mut self) -> Result<i32, BmpError> {
    self.read()
  }
  /// Reads a `u64`.
  #[inline]
  pub fn read_u64(&mut self) -> Result<u64, BmpError> {
    self.read()
  }
  /// Reads an `f32`.
  #[inline]
  pub fn read_f32(&mut self) -> Result<f32, BmpError> {
    self.read()
  }
  /// Reads an `f64`.
  #[inline]
  pub fn read_f64(&mut self) -> Result<f64, BmpError> {
    self.read()
  }

  /// Moves the stream relative to the current position.
  #[inline]
  pub fn seek_relative(&mut self, delta: i64) -> Result<(), BmpError> {
    self.source.seek_relative(delta)
  }

  /// Unwraps the source.
  #[inline]
  pub fn into_inner(self) -> S {
    self.source
  }
}

/// Writes scalars and records to a [ByteSink] with a declared byte order.
#[derive(Debug)]
pub struct StructWriter<K> {
  sink: K,
  endian: Endian,
}
impl<K: ByteSink> StructWriter<K> {
  /// Writes to `sink` using the `endian` byte order.
  #[inline]
  pub const fn new(sink: K, endian: Endian) -> Self {
    Self { sink, endian }
  }

  /// The declared byte order of the stream.
  #[inline]
  #[must_use]
  pub const fn endian(&self) -> Endian {
    self.endian
  }

  /// The position of the underlying stream.
  #[inline]
  #[must_use]
  pub fn position(&self) -> u64 {
    self.sink.position()
  }

  /// Writes any [Wire] value.
  #[inline]
  pub fn write<T: Wire>(&mut self, t: &T) -> Result<(), BmpError> {
    t.write_to(self)
  }

  /// Writes bytes with no byte order processing.
  #[inline]
  pub fn write_raw(&mut self, bytes: &[u8]) -> Result<(), BmpError> {
    self.sink.write_bytes(bytes)
  }

  /// Writes `count` zero bytes.
  pub fn write_zeroes(&mut self, mut count: usize) -> Result<(), BmpError> {
    const ZEROES: [u8; 64] = [0; 64];
    while count > 0 {
      let n = count.min(ZEROES.len());
      self.write_raw(&ZEROES[..n])?;
      count -= n;
    }
    Ok(())
  }

  /// Writes a `u16`.
  #[inline]
  pub fn write_u16(&mut self, v: u16) -> Result<(), BmpError> {
    self.write(&v)
  }
  /// Writes a `u32`.
  #[inline]
  pub fn write_u32(&mut self, v: u32) -> Result<(), BmpError> {
    self.write(&v)
  }
  /// Writes an `i32`.
  #[inline]
  pub fn write_i32(&mut self, v: i32) -> Result<(), BmpError> {
    self.write(&v)
  }
  /// Writes an `f32`.
  #[inline]
  pub fn write_f32(&mut self, v: f32) -> Result<(), BmpError> {
    self.write(&v)
  }
  /// Writes an `f64`.
  #[inline]
  pub fn write_f64(&mut self, v: f64) -> Result<(), BmpError> {
    self.write(&v)
  }

  /// Unwraps the sink.
  #[inline]
  pub fn into_inner(self) -> K {
    self.sink
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use alloc::vec;

  crate::wire_record! {
    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Inner {
      tag: [u8; 2],
      value: u32,
    }
  }
  crate::wire_record! {
    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Outer {
      a: u16,
      inner: Inner,
      scale: f32,
      big: i64,
    }
  }

  const SAMPLE: Outer = Outer {
    a: 0x0102,
    inner: Inner { tag: *b"XY", value: 0x0304_0506 },
    scale: 1.5,
    big: -2,
  };

  #[test]
  fn test_record_size_is_sum_of_fields() {
    assert_eq!(Inner::SIZE, 6);
    assert_eq!(Outer::SIZE, 2 + 6 + 4 + 8);
  }

  #[test]
  fn test_big_endian_writes_swap_scalars_but_not_blobs() {
    let mut w = StructWriter::new(Vec::new(), Endian::Big);
    w.write(&SAMPLE).unwrap();
    let bytes = w.into_inner();
    assert_eq!(bytes.len(), Outer::SIZE);
    assert_eq!(&bytes[0..2], &[0x01, 0x02]);
    assert_eq!(&bytes[2..4], b"XY");
    assert_eq!(&bytes[4..8], &[0x03, 0x04, 0x05, 0x06]);
    assert_eq!(&bytes[8..12], &1.5_f32.to_be_bytes());
    assert_eq!(&bytes[12..20], &(-2_i64).to_be_bytes());

    let mut r = StructReader::new(SliceSource::new(&bytes), Endian::Big);
    assert_eq!(r.read::<Outer>().unwrap(), SAMPLE);
    assert_eq!(r.position(), Outer::SIZE as u64);
  }

  #[test]
  fn test_little_endian_reads() {
    let bytes = [0x02, 0x01, b'X', b'Y', 0x06, 0x05, 0x04, 0x03];
    let mut r = StructReader::new(SliceSource::new(&bytes), Endian::Little);
    assert_eq!(r.read_u16().unwrap(), 0x0102);
    assert_eq!(r.read::<[u8; 2]>().unwrap(), *b"XY");
    assert_eq!(r.read_u32().unwrap(), 0x0304_0506);
  }

  #[test]
  fn test_short_read_is_truncation() {
    let bytes = [0_u8; 7];
    let mut r = StructReader::new(SliceSource::new(&bytes), Endian::Little);
    r.read_u16().unwrap();
    assert_eq!(r.read::<Inner>(), Err(BmpError::TruncatedStream { offset: 4, needed: 1 }));
  }

  #[test]
  fn test_slice_source_seeking() {
    let bytes = vec![1, 2, 3, 4, 5];
    let mut src = SliceSource::new(&bytes);
    src.seek_relative(3).unwrap();
    assert_eq!(src.remaining(), &[4, 5]);
    src.seek_relative(-2).unwrap();
    assert_eq!(src.position(), 1);
    assert!(src.seek_relative(-2).is_err());
    assert_eq!(src.seek_relative(10), Err(BmpError::TruncatedStream { offset: 5, needed: 6 }));
  }
}
