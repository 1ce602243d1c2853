use dibkit::{
  bmp::{
    BitfieldCodec, Bitmasks, BmpCompression, ColorSpace, ColorSpaceType, HeaderVersion, Os2Info,
  },
  decode_bytes, decode_with_options, encode_to_vec, Bgra32, Bitmap, BmpError, DecodeOptions,
  Metadata, Palmap, PixelGrid, SliceSource,
};
use walkdir::WalkDir;

fn hostile_limits() -> DecodeOptions {
  DecodeOptions::default().with_max_pixels(1 << 20).with_max_profile_bytes(1 << 16)
}

#[test]
fn test_files_do_not_panic_decoder() {
  // iter ALL files in the test folder, even non-bmp files shouldn't panic it.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    if entry.file_type().is_dir() {
      continue;
    }
    println!("{}", entry.path().display());
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(e) => {
        println!("Error reading file: {e:?}");
        continue;
      }
    };
    let _ = decode_with_options(SliceSource::new(&v), &hostile_limits());
  }
  // even totally random data should never panic the decoder!
  for _ in 0..10 {
    let v = super::rand_bytes(1024);
    let _ = decode_with_options(SliceSource::new(&v), &hostile_limits());
  }
}

#[test]
fn test_corrupted_files_do_not_panic_decoder() {
  let palette: Vec<Bgra32> = (0..=255).map(|i| Bgra32 { b: i, g: i, r: i, a: 0 }).collect();
  let image = Palmap::try_new(7, 5, 3_u8, palette).unwrap();
  let good = encode_to_vec(&PixelGrid::Indexed(image), &Metadata::new(7, 5, 8)).unwrap();
  for _ in 0..200 {
    let noise = super::rand_bytes(8);
    let mut v = good.clone();
    // keep the tag, scribble on the rest
    let at = 2 + usize::from(noise[0]) % (v.len() - 2);
    v[at] = noise[1];
    let at = 2 + usize::from(noise[2]) % 60;
    v[at] = noise[3];
    let _ = decode_with_options(SliceSource::new(&v), &hostile_limits());
  }
}

fn random_indexed(width: u32, height: u32, palette_len: usize) -> PixelGrid {
  let palette: Vec<Bgra32> = super::rand_bytes(palette_len * 3)
    .chunks_exact(3)
    .map(|c| Bgra32 { b: c[0], g: c[1], r: c[2], a: 0 })
    .collect();
  let mut image = Palmap::try_new(width, height, 0_u8, palette).unwrap();
  // fewer distinct values than the palette allows, so RLE finds some runs
  let distinct = palette_len.min(3) as u8;
  let noise = super::rand_bytes(image.indexes.len());
  for (slot, r) in image.indexes.iter_mut().zip(noise) {
    *slot = r % distinct;
  }
  PixelGrid::Indexed(image)
}

fn random_direct(width: u32, height: u32, f: impl Fn(&[u8]) -> Bgra32) -> PixelGrid {
  let noise = super::rand_bytes(width as usize * height as usize * 4);
  let pixels = noise.chunks_exact(4).map(f).collect();
  PixelGrid::Direct(Bitmap { width, height, pixels })
}

fn opaque(c: &[u8]) -> Bgra32 {
  Bgra32 { b: c[0], g: c[1], r: c[2], a: 255 }
}

fn with_alpha(c: &[u8]) -> Bgra32 {
  Bgra32 { b: c[0], g: c[1], r: c[2], a: c[3] }
}

fn rgb565(c: &[u8]) -> Bgra32 {
  BitfieldCodec::new(Bitmasks::RGB565).unpack(u32::from(u16::from_le_bytes([c[0], c[1]])))
}

#[test]
fn test_round_trip_every_header_version() {
  let os2 = |size: u32| Some(Os2Info { header_size: size, ..Os2Info::default() });
  let cases: Vec<(PixelGrid, Metadata)> = vec![
    (random_indexed(9, 4, 256), Metadata::new(9, 4, 8).with_version(HeaderVersion::CoreV2)),
    (random_indexed(9, 4, 2), Metadata::new(9, 4, 1).with_version(HeaderVersion::CoreV2)),
    (random_direct(5, 3, opaque), Metadata::new(5, 3, 24).with_version(HeaderVersion::CoreV2)),
    (random_indexed(11, 6, 4), Metadata::new(11, 6, 2).with_top_down(true)),
    (random_indexed(13, 7, 16), Metadata::new(13, 7, 4).with_compression(BmpCompression::Rle4)),
    (random_indexed(13, 7, 200), Metadata::new(13, 7, 8).with_compression(BmpCompression::Rle8)),
    (
      random_direct(6, 3, rgb565),
      Metadata::new(6, 3, 16)
        .with_compression(BmpCompression::Bitfields)
        .with_bitmasks(Bitmasks::RGB565),
    ),
    (
      random_direct(3, 3, with_alpha),
      Metadata::new(3, 3, 32)
        .with_compression(BmpCompression::AlphaBitfields)
        .with_bitmasks(Bitmasks::ARGB8888)
        .with_top_down(true),
    ),
    (
      random_direct(6, 2, rgb565),
      Metadata::new(6, 2, 16)
        .with_version(HeaderVersion::InfoV3Rgb)
        .with_compression(BmpCompression::Bitfields)
        .with_bitmasks(Bitmasks::RGB565),
    ),
    (
      random_direct(4, 4, with_alpha),
      Metadata::new(4, 4, 32)
        .with_version(HeaderVersion::InfoV3Rgba)
        .with_compression(BmpCompression::AlphaBitfields)
        .with_bitmasks(Bitmasks::ARGB8888),
    ),
    (
      random_direct(5, 5, opaque),
      Metadata {
        x_pixels_per_meter: 2835,
        y_pixels_per_meter: 2835,
        ..Metadata::new(5, 5, 24)
          .with_version(HeaderVersion::InfoV4)
          .with_color_space(ColorSpace::SRGB)
      },
    ),
    (
      random_direct(5, 2, opaque),
      Metadata::new(5, 2, 32)
        .with_version(HeaderVersion::InfoV5)
        .with_color_space(ColorSpace { kind: ColorSpaceType::ProfileLinked, ..ColorSpace::SRGB })
        .with_profile(b"C:\\profiles\\monitor.icc\0".to_vec()),
    ),
    (
      random_indexed(10, 3, 100),
      Metadata { os2: os2(64), ..Metadata::new(10, 3, 8) }
        .with_version(HeaderVersion::Os2V2 { size: 64 })
        .with_compression(BmpCompression::Rle8),
    ),
    (
      random_indexed(10, 3, 256),
      Metadata { os2: os2(24), ..Metadata::new(10, 3, 8) }
        .with_version(HeaderVersion::Os2V2 { size: 24 }),
    ),
    (
      random_direct(3, 2, opaque),
      Metadata { os2: os2(16), ..Metadata::new(3, 2, 24) }
        .with_version(HeaderVersion::Os2V2 { size: 16 }),
    ),
  ];
  for (grid, meta) in cases {
    let bytes = encode_to_vec(&grid, &meta).unwrap();
    let (back_grid, back_meta) = decode_bytes(&bytes).unwrap();
    assert_eq!(back_grid, grid, "failed meta:{meta:?}");
    assert_eq!(back_meta, Metadata { declared_file_size: bytes.len() as u32, ..meta });
  }
}

#[test]
fn test_rle8_file() {
  let mut v = Vec::new();
  v.extend_from_slice(b"BM");
  v.extend_from_slice(&0_u32.to_le_bytes());
  v.extend_from_slice(&[0; 4]);
  v.extend_from_slice(&(14_u32 + 40 + 4 * 10).to_le_bytes());
  v.extend_from_slice(&40_u32.to_le_bytes());
  v.extend_from_slice(&4_i32.to_le_bytes()); // width
  v.extend_from_slice(&2_i32.to_le_bytes()); // height
  v.extend_from_slice(&1_u16.to_le_bytes());
  v.extend_from_slice(&8_u16.to_le_bytes());
  v.extend_from_slice(&1_u32.to_le_bytes()); // RLE8
  v.extend_from_slice(&[0; 12]);
  v.extend_from_slice(&10_u32.to_le_bytes()); // colors used
  v.extend_from_slice(&[0; 4]);
  for i in 0..10 {
    v.extend_from_slice(&[i, i, i, 0]);
  }
  v.extend_from_slice(&[0x03, 0x09, 0x00, 0x00, 0x00, 0x01]);
  let (grid, meta) = decode_bytes(&v).unwrap();
  assert_eq!(meta.compression, BmpCompression::Rle8);
  let PixelGrid::Indexed(image) = grid else { panic!("expected indexes") };
  assert_eq!(image.palette.len(), 10);
  assert_eq!(image.indexes, [0, 0, 0, 0, 9, 9, 9, 0]);
}

#[test]
fn test_bitfields_565_full_red() {
  let mut v = Vec::new();
  v.extend_from_slice(b"BM");
  v.extend_from_slice(&(14_u32 + 40 + 12 + 4).to_le_bytes());
  v.extend_from_slice(&[0; 4]);
  v.extend_from_slice(&(14_u32 + 40 + 12).to_le_bytes());
  v.extend_from_slice(&40_u32.to_le_bytes());
  v.extend_from_slice(&1_i32.to_le_bytes());
  v.extend_from_slice(&1_i32.to_le_bytes());
  v.extend_from_slice(&1_u16.to_le_bytes());
  v.extend_from_slice(&16_u16.to_le_bytes());
  v.extend_from_slice(&3_u32.to_le_bytes()); // bitfields
  v.extend_from_slice(&[0; 20]);
  for mask in [0xF800_u32, 0x07E0, 0x001F] {
    v.extend_from_slice(&mask.to_le_bytes());
  }
  v.extend_from_slice(&[0x00, 0xF8, 0, 0]);
  let (grid, meta) = decode_bytes(&v).unwrap();
  assert_eq!(meta.bitmasks, Some(Bitmasks::RGB565));
  let rgba: Bitmap<dibkit::Rgba32> = grid.to_bitmap();
  assert_eq!(rgba.pixels, [dibkit::Rgba32 { r: 255, g: 0, b: 0, a: 255 }]);
}

#[test]
fn test_every_truncation_is_reported() {
  let grid = random_indexed(5, 3, 16);
  let bytes = encode_to_vec(&grid, &Metadata::new(5, 3, 8)).unwrap();
  assert!(decode_bytes(&bytes).is_ok());
  for len in 0..bytes.len() {
    match decode_bytes(&bytes[..len]) {
      Err(BmpError::TruncatedStream { .. }) => (),
      other => panic!("failed len:{len}, got {other:?}"),
    }
  }
}

#[test]
fn test_decode_limits() {
  let grid = random_direct(20, 10, opaque);
  let bytes = encode_to_vec(&grid, &Metadata::new(20, 10, 24)).unwrap();
  let limited = DecodeOptions::default().with_max_width(19);
  assert_eq!(
    decode_with_options(SliceSource::new(&bytes), &limited),
    Err(BmpError::DimensionsTooLarge { width: 20, height: 10 })
  );
  let roomy = DecodeOptions::default().with_max_width(20).with_max_height(10).with_max_pixels(200);
  assert!(decode_with_options(SliceSource::new(&bytes), &roomy).is_ok());
}

#[test]
#[cfg(feature = "std")]
fn test_std_io_adapters() {
  use dibkit::{bmp::decode, bmp::encode, IoSink, IoSource};

  let grid = random_indexed(8, 8, 16);
  let meta = Metadata::new(8, 8, 4).with_compression(BmpCompression::Rle4);
  let mut sink = IoSink::new(Vec::new());
  encode(&grid, &meta, &mut sink).unwrap();
  let bytes = sink.into_inner();
  assert_eq!(bytes, encode_to_vec(&grid, &meta).unwrap());

  // start partway into a stream, offsets are relative to where decoding began
  let mut padded = vec![0xAB; 3];
  padded.extend_from_slice(&bytes);
  let mut cursor = std::io::Cursor::new(padded);
  cursor.set_position(3);
  let (back, _) = decode(IoSource::new(cursor)).unwrap();
  assert_eq!(back, grid);
}
