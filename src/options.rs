//! Settings for decoding.

use crate::error::BmpError;

/// Resource limits applied while decoding.
///
/// The limits are checked once the headers are parsed and before any pixel
/// memory is allocated. Every limit defaults to `None` (no limit), though the
/// format itself caps width and height at `i32::MAX`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DecodeOptions {
  /// Largest width allowed.
  pub max_width: Option<u32>,
  /// Largest height allowed.
  pub max_height: Option<u32>,
  /// Largest `width * height` allowed.
  pub max_pixels: Option<u64>,
  /// Largest embedded or linked ICC profile allowed, in bytes.
  pub max_profile_bytes: Option<u32>,
}
impl DecodeOptions {
  /// Sets the maximum width.
  #[inline]
  #[must_use]
  pub const fn with_max_width(mut self, max_width: u32) -> Self {
    self.max_width = Some(max_width);
    self
  }

  /// Sets the maximum height.
  #[inline]
  #[must_use]
  pub const fn with_max_height(mut self, max_height: u32) -> Self {
    self.max_height = Some(max_height);
    self
  }

  /// Sets the maximum pixel count.
  #[inline]
  #[must_use]
  pub const fn with_max_pixels(mut self, max_pixels: u64) -> Self {
    self.max_pixels = Some(max_pixels);
    self
  }

  /// Sets the maximum ICC profile size.
  #[inline]
  #[must_use]
  pub const fn with_max_profile_bytes(mut self, max_profile_bytes: u32) -> Self {
    self.max_profile_bytes = Some(max_profile_bytes);
    self
  }

  /// Checks image dimensions against the limits.
  pub fn check_dimensions(&self, width: u32, height: u32) -> Result<(), BmpError> {
    let too_large = BmpError::DimensionsTooLarge { width, height };
    if self.max_width.is_some_and(|max| width > max) {
      return Err(too_large);
    }
    if self.max_height.is_some_and(|max| height > max) {
      return Err(too_large);
    }
    if self.max_pixels.is_some_and(|max| u64::from(width) * u64::from(height) > max) {
      return Err(too_large);
    }
    Ok(())
  }

  /// Checks an ICC profile size against the limits.
  pub fn check_profile_size(&self, size: u32) -> Result<(), BmpError> {
    if self.max_profile_bytes.is_some_and(|max| size > max) {
      Err(BmpError::InvalidHeader("ICC profile exceeds the decode limits"))
    } else {
      Ok(())
    }
  }
}

#[test]
fn test_check_dimensions() {
  let opts = DecodeOptions::default();
  assert!(opts.check_dimensions(u32::MAX, u32::MAX).is_ok());
  let opts = DecodeOptions::default().with_max_width(10).with_max_pixels(50);
  assert!(opts.check_dimensions(10, 5).is_ok());
  assert_eq!(
    opts.check_dimensions(11, 1),
    Err(BmpError::DimensionsTooLarge { width: 11, height: 1 })
  );
  assert!(opts.check_dimensions(10, 6).is_err());
}
