//! Hit-miss edge smoothing regression test
//!
//! Run with:
//! ```
//! cargo test -p scanraster-morph --test smooth_reg
//! ```

use scanraster_core::{RasterBuffer, Rect};
use scanraster_morph::smooth_edges;
use scanraster_test::{RegParams, synth};

fn with_pixels(image: &RasterBuffer, pixels: &[(u32, u32, u32)]) -> RasterBuffer {
    let mut m = image.to_mut();
    for &(x, y, v) in pixels {
        m.set_pixel(x, y, v).unwrap();
    }
    m.into()
}

#[test]
fn smooth_reg() {
    let mut rp = RegParams::new("smooth");

    let bar = synth::binary_from_rects(64, 48, &[Rect::new(10, 10, 40, 20).unwrap()]).unwrap();
    rp.compare_values(800.0, bar.count_black().unwrap() as f64, 0.0);

    eprintln!("  clean stroke is left alone");
    let clean = smooth_edges(&bar).unwrap();
    rp.compare_raster(&bar, &clean);

    eprintln!("  notch on the top edge, bump on the bottom edge");
    let rough = with_pixels(&bar, &[(30, 10, 0), (30, 30, 1)]);
    let smoothed = smooth_edges(&rough).unwrap();
    rp.compare_values(1.0, smoothed.get_pixel(30, 10).unwrap() as f64, 0.0);
    rp.compare_values(0.0, smoothed.get_pixel(30, 30).unwrap() as f64, 0.0);
    rp.compare_raster(&bar, &smoothed);

    eprintln!("  same defects on the vertical edges");
    let rough = with_pixels(&bar, &[(10, 20, 0), (50, 15, 1)]);
    let smoothed = smooth_edges(&rough).unwrap();
    rp.compare_raster(&bar, &smoothed);

    eprintln!("  two- and three-pixel defects");
    let rough = with_pixels(
        &bar,
        &[
            (20, 10, 0),
            (21, 10, 0),
            (40, 29, 0),
            (41, 29, 0),
            (42, 29, 0),
            (9, 14, 1),
            (9, 15, 1),
        ],
    );
    let smoothed = smooth_edges(&rough).unwrap();
    rp.compare_raster(&bar, &smoothed);

    // a stray dot is not an edge defect; despeckling owns it
    let dotted = with_pixels(&bar, &[(2, 2, 1)]);
    let smoothed = smooth_edges(&dotted).unwrap();
    rp.compare_raster(&dotted, &smoothed);

    assert!(rp.cleanup(), "smooth regression test failed");
}
