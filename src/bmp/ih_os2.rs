use super::BitmapInfoHeader;
use crate::wire_record;

wire_record! {
  /// Header for OS/2 2.x images.
  ///
  /// The full header is 64 bytes (`OS22XBITMAPHEADER`), but a file can
  /// store any prefix of it that's at least 16 bytes. Fields past the end of
  /// the stored prefix are taken to be zero.
  ///
  /// The first 40 bytes have the same layout as [BitmapInfoHeader], except
  /// that width and height are unsigned and the compression values 3 and 4
  /// mean Huffman 1D and RLE24.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
  pub struct Os22xBitmapHeader {
    /// The common fields. `info.size` is the size actually stored.
    pub info: BitmapInfoHeader,

    /// Always 0, meaning pixels per meter.
    pub resolution_units: u16,

    /// Padding.
    pub reserved: u16,

    /// Always 0, meaning the origin is the lower left.
    pub origin: u16,

    /// See [Halftoning].
    pub halftoning_algorithm: u16,

    /// First halftoning parameter.
    pub halftoning_param1: u32,

    /// Second halftoning parameter.
    pub halftoning_param2: u32,

    /// Always 0, meaning RGB palette entries.
    pub color_encoding: u32,

    /// Application defined.
    pub identifier: u32,
  }
}

/// The halftoning algorithm an OS/2 image was prepared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Halftoning {
  /// No halftoning, the most common style.
  #[default]
  NoHalftoning,

  /// [wikipedia](https://en.wikipedia.org/wiki/Error_diffusion)
  ErrorDiffusion {
    /// 0 indicates that the error is not diffused.
    damping_percentage: u32,
  },

  /// PANDA: Processing Algorithm for Noncoded Document Acquisition.
  #[allow(missing_docs)]
  Panda { x: u32, y: u32 },

  /// Super-circle halftoning.
  #[allow(missing_docs)]
  SuperCircle { x: u32, y: u32 },

  /// An algorithm value with no known meaning. The parameters are kept.
  #[allow(missing_docs)]
  Unknown { algorithm: u16, param1: u32, param2: u32 },
}
impl Halftoning {
  /// Interprets the halftoning fields of a header.
  #[inline]
  #[must_use]
  pub const fn from_fields(algorithm: u16, param1: u32, param2: u32) -> Self {
    match algorithm {
      0 => Self::NoHalftoning,
      1 => Self::ErrorDiffusion { damping_percentage: param1 },
      2 => Self::Panda { x: param1, y: param2 },
      3 => Self::SuperCircle { x: param1, y: param2 },
      _ => Self::Unknown { algorithm, param1, param2 },
    }
  }

  /// The halftoning fields to store in a header.
  #[inline]
  #[must_use]
  pub const fn to_fields(self) -> (u16, u32, u32) {
    match self {
      Self::NoHalftoning => (0, 0, 0),
      Self::ErrorDiffusion { damping_percentage } => (1, damping_percentage, 0),
      Self::Panda { x, y } => (2, x, y),
      Self::SuperCircle { x, y } => (3, x, y),
      Self::Unknown { algorithm, param1, param2 } => (algorithm, param1, param2),
    }
  }
}

/// The OS/2 specific fields of an OS/2 2.x header, along with how much of
/// the header was stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Os2Info {
  /// The stored header size, 16 to 64.
  pub header_size: u32,
  /// Resolution units (0 is pixels per meter).
  pub resolution_units: u16,
  /// Origin of the image (0 is lower left).
  pub origin: u16,
  /// How the image was halftoned.
  pub halftoning: Halftoning,
  /// Palette entry encoding (0 is RGB).
  pub color_encoding: u32,
  /// Application defined.
  pub identifier: u32,
}
impl Default for Os2Info {
  #[inline]
  fn default() -> Self {
    Self {
      header_size: 64,
      resolution_units: 0,
      origin: 0,
      halftoning: Halftoning::NoHalftoning,
      color_encoding: 0,
      identifier: 0,
    }
  }
}
impl From<&Os22xBitmapHeader> for Os2Info {
  #[inline]
  fn from(h: &Os22xBitmapHeader) -> Self {
    Self {
      header_size: h.info.size,
      resolution_units: h.resolution_units,
      origin: h.origin,
      halftoning: Halftoning::from_fields(
        h.halftoning_algorithm,
        h.halftoning_param1,
        h.halftoning_param2,
      ),
      color_encoding: h.color_encoding,
      identifier: h.identifier,
    }
  }
}

#[test]
fn test_halftoning_fields() {
  assert_eq!(Halftoning::from_fields(2, 5, 6), Halftoning::Panda { x: 5, y: 6 });
  assert_eq!(Halftoning::from_fields(1, 40, 9).to_fields(), (1, 40, 0));
  let odd = Halftoning::from_fields(77, 1, 2);
  assert_eq!(odd.to_fields(), (77, 1, 2));
}
