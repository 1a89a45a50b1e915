//! Grayscale reconstruction regression test
//!
//! Run with:
//! ```
//! cargo test -p scanraster-morph --test reconstruct_reg
//! ```

use scanraster_core::{ConnectivityType, PixelFormat, RasterBuffer};
use scanraster_morph::{
    erode_gray, fill_holes_gray, grayscale_reconstruct, grayscale_reconstruct_with_limit,
};
use scanraster_test::{RegParams, synth};

#[test]
fn reconstruct_reg() {
    let mut rp = RegParams::new("reconstruct");

    let mask = synth::noise_gray(40, 30, 99).unwrap();
    let marker = erode_gray(&mask, 5, 5).unwrap();

    eprintln!("  opening by reconstruction on noise");
    let rec = grayscale_reconstruct(&marker, &mask, ConnectivityType::EightWay).unwrap();
    rp.compare_values(1.0, if rec.converged { 1.0 } else { 0.0 }, 0.0);

    // marker <= result <= mask
    let bounded = rec
        .image
        .data()
        .iter()
        .zip(marker.data())
        .zip(mask.data())
        .all(|((&r, &m), &k)| m.min(k) <= r && r <= k);
    rp.compare_values(1.0, if bounded { 1.0 } else { 0.0 }, 0.0);

    // idempotent: reconstructing the result again changes nothing
    let again = grayscale_reconstruct(&rec.image, &mask, ConnectivityType::EightWay).unwrap();
    rp.compare_raster(&rec.image, &again.image);

    // the capped run agrees with the default once it converges
    let long = grayscale_reconstruct_with_limit(&marker, &mask, ConnectivityType::EightWay, 10_000)
        .unwrap();
    rp.compare_raster(&rec.image, &long.image);

    // a marker equal to the mask is already a fixed point
    let same = grayscale_reconstruct(&mask, &mask, ConnectivityType::FourWay).unwrap();
    rp.compare_raster(&mask, &same.image);
    rp.compare_values(1.0, same.iterations as f64, 0.0);

    // a blank marker reconstructs to zero
    let zero = RasterBuffer::new(40, 30, PixelFormat::Gray8).unwrap();
    let empty = grayscale_reconstruct(&zero, &mask, ConnectivityType::EightWay).unwrap();
    rp.compare_raster(&zero, &empty.image);

    eprintln!("  hole filling");
    let ring = synth::checkerboard(9, 9, 3, 200, 40).unwrap();
    let filled = fill_holes_gray(&ring, ConnectivityType::FourWay).unwrap();
    let never_lower = filled
        .image
        .data()
        .iter()
        .zip(ring.data())
        .all(|(&f, &v)| f >= v);
    rp.compare_values(1.0, if never_lower { 1.0 } else { 0.0 }, 0.0);

    assert!(rp.cleanup(), "reconstruct regression test failed");
}
