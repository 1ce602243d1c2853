use dibkit::{Argb32, Bgr24, Bgra32, PixelFormat, Rgb24, Rgba32};

fn random_pixels() -> Vec<Rgba32> {
  super::rand_bytes(4 * 512)
    .chunks_exact(4)
    .map(|c| Rgba32 { r: c[0], g: c[1], b: c[2], a: c[3] })
    .collect()
}

fn opaque(p: Rgba32) -> Rgba32 {
  Rgba32 { a: 255, ..p }
}

fn check_lossless<P: PixelFormat>() {
  for p in random_pixels() {
    let there: P = p.convert();
    let back: Rgba32 = there.convert();
    assert_eq!(back, p, "failed pixel:{p:?} via {there:?}");
  }
}

fn check_alpha_drop<P: PixelFormat>() {
  for p in random_pixels() {
    let there: P = p.convert();
    let back: Rgba32 = there.convert();
    assert_eq!(back, opaque(p), "failed pixel:{p:?} via {there:?}");
  }
}

#[test]
fn test_four_channel_pairs_are_lossless() {
  check_lossless::<Rgba32>();
  check_lossless::<Bgra32>();
  check_lossless::<Argb32>();
  for p in random_pixels() {
    let bgra = Bgra32::from(p);
    assert_eq!(Bgra32::from(Argb32::from(bgra)), bgra);
  }
}

#[test]
fn test_three_channel_pairs_drop_alpha() {
  check_alpha_drop::<Rgb24>();
  check_alpha_drop::<Bgr24>();
  for p in random_pixels() {
    let rgb = Rgb24::from(p);
    assert_eq!(Rgb24::from(Bgr24::from(rgb)), rgb);
    assert_eq!(Rgb24::from(Argb32::from(rgb)), rgb);
  }
}

#[test]
fn test_normalized_round_trips() {
  for p in random_pixels() {
    let bgra = Bgra32::from(p);
    let f = bgra.to_normalized();
    assert_eq!(Bgra32::from_normalized(f), bgra);
    // and again, the trip is stable
    assert_eq!(Bgra32::from_normalized(Bgra32::from_normalized(f).to_normalized()), bgra);

    let bgr = Bgr24::from(p);
    assert_eq!(Bgr24::from_normalized_rgb(bgr.to_normalized_rgb()), bgr);
  }
}
