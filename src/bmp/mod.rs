#![forbid(unsafe_code)]

//! Module for Windows and OS/2 Bitmap files (BMP).
//!
//! ## The Format
//!
//! Note: All multi-byte values in BMP are little-endian encoded.
//!
//! * A bitmap file starts with a 14 byte [file header](BitmapFileHeader).
//!   * A tag for the kind of file. Only `BM` is an actual bitmap, the other
//!     tags are OS/2 resource files.
//!   * The total size of the file.
//!   * The position of the pixel data within the file.
//! * Next is an "info header". There's many versions of this header, and the
//!   first 4 bytes are always the size of the header. Each version has a
//!   different size, so this picks the version (see [HeaderVersion]).
//! * Next there **might** be bitmasks. If the header is the 40 byte header and
//!   the compression is [BmpCompression::Bitfields] or
//!   [BmpCompression::AlphaBitfields] then 3 or 4 `u32` masks follow, giving
//!   the bits of the R, G, B, and possibly A channels.
//! * Next there **might** be a color table (see [palette](self::palette)).
//! * Next there **might** be a gap. The file header gives the offset of the
//!   pixel data, which is used to skip past it.
//! * Next there is the pixel data. Uncompressed rows are padded to 4 bytes
//!   (see [row_stride]). RLE data is described in [rle](self::rle).
//! * Finally, for a V5 header, there might be ICC profile data. Its location
//!   is given relative to the start of the info header.
//!
//! [decode] and [encode] handle all of this, converting between a file and a
//! [PixelGrid](crate::PixelGrid) plus [Metadata].

mod bitfields;
pub use bitfields::*;

mod colorspace;
pub use colorspace::*;

mod compression;
pub use compression::*;

mod container;
pub use container::*;

mod file_header;
pub use file_header::*;

mod ih_core;
pub use ih_core::*;

mod ih_os2;
pub use ih_os2::*;

mod ih_v3;
pub use ih_v3::*;

mod ih_v5;
pub use ih_v5::*;

mod info_header;
pub use info_header::*;

pub mod palette;
pub use palette::*;

mod pixel_data;
pub use pixel_data::*;

pub mod rle;
pub use rle::*;
