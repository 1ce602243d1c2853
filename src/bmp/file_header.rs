use crate::{ascii_array::AsciiArray, error::BmpError, wire_record};

/// Two-letter file tags commonly found at the start of a BMP file.
pub const COMMON_BMP_TAGS: &[AsciiArray<2>] = &[
  AsciiArray(*b"BM"),
  AsciiArray(*b"BA"),
  AsciiArray(*b"CI"),
  AsciiArray(*b"CP"),
  AsciiArray(*b"IC"),
  AsciiArray(*b"PT"),
];

/// The tag of an ordinary bitmap file.
pub const BM_TAG: AsciiArray<2> = AsciiArray(*b"BM");

wire_record! {
  /// The header at the start of all BMP files.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
  pub struct BitmapFileHeader {
    /// This is expected to be one of the following
    ///
    /// * BM: win3.1 or later
    /// * BA: OS/2 bitmap array
    /// * CI: OS/2 color icon
    /// * CP: OS/2 color pointer
    /// * IC: OS/2 icon
    /// * PT: OS/2 pointer
    pub tag: AsciiArray<2>,

    /// The total size of the file.
    ///
    /// If this doesn't match the actual size of the file, there might be some
    /// sort of data loss or corruption.
    pub total_file_size: u32,

    /// Application specific, normally 0.
    pub reserved1: u16,

    /// Application specific, normally 0.
    pub reserved2: u16,

    /// The byte index within the file where the bitmap data starts.
    pub pixel_data_offset: u32,
  }
}
impl BitmapFileHeader {
  /// A `BM` file header with the given sizes and zeroed reserved fields.
  #[inline]
  #[must_use]
  pub const fn new(total_file_size: u32, pixel_data_offset: u32) -> Self {
    Self { tag: BM_TAG, total_file_size, reserved1: 0, reserved2: 0, pixel_data_offset }
  }

  /// Checks that this is a plain bitmap, rather than an OS/2 resource file or
  /// something that's not a bitmap at all.
  #[inline]
  pub fn check_tag(&self) -> Result<(), BmpError> {
    if self.tag == BM_TAG {
      Ok(())
    } else if COMMON_BMP_TAGS.contains(&self.tag) {
      Err(BmpError::UnsupportedContainer { tag: self.tag })
    } else {
      Err(BmpError::MagicMismatch { found: self.tag })
    }
  }
}

#[test]
fn test_file_header_layout() {
  use crate::stream::{Endian, SliceSource, StructReader, StructWriter, Wire};
  use alloc::vec::Vec;

  assert_eq!(<BitmapFileHeader as Wire>::SIZE, 14);
  let h = BitmapFileHeader::new(0x11223344, 54);
  let mut w = StructWriter::new(Vec::new(), Endian::Little);
  w.write(&h).unwrap();
  let bytes = w.into_inner();
  assert_eq!(bytes, [b'B', b'M', 0x44, 0x33, 0x22, 0x11, 0, 0, 0, 0, 54, 0, 0, 0]);
  let mut r = StructReader::new(SliceSource::new(&bytes), Endian::Little);
  let back: BitmapFileHeader = r.read().unwrap();
  assert_eq!(back, h);
  assert!(back.check_tag().is_ok());

  let ic = BitmapFileHeader { tag: AsciiArray(*b"IC"), ..h };
  assert_eq!(ic.check_tag(), Err(BmpError::UnsupportedContainer { tag: AsciiArray(*b"IC") }));
  let junk = BitmapFileHeader { tag: AsciiArray(*b"\x89P"), ..h };
  assert!(matches!(junk.check_tag(), Err(BmpError::MagicMismatch { .. })));
}
