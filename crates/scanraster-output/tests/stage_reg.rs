//! Output stage regression test
//!
//! Run with:
//! ```
//! cargo test -p scanraster-output --test stage_reg
//! ```

use scanraster_core::{Dpi, PixelFormat, RasterBuffer, Rect};
use scanraster_output::{
    CancelToken, MixedOptions, OutputError, OutputMode, OutputStage, PageSettings, StageWarning, Zone, ZoneTag,
    process_page, run_batch,
};
use scanraster_region::DespecklePolicy;
use scanraster_test::{RegParams, synth};
use scanraster_threshold::ThresholdMethod;

/// Text on the left, a noisy photograph on blank paper on the right
fn page_with_photo(photo: Rect) -> RasterBuffer {
    let text = synth::text_page(200, 120, 25, 230).unwrap();
    let noise = synth::noise_gray(photo.w as u32, photo.h as u32, 4242).unwrap();
    let mut page = text.to_mut();
    for y in 0..120u32 {
        for x in 100..200u32 {
            page.set_pixel_unchecked(x, y, 230);
        }
    }
    for y in 0..photo.h as u32 {
        for x in 0..photo.w as u32 {
            page.set_pixel_unchecked(photo.x as u32 + x, photo.y as u32 + y, noise.get_pixel(x, y).unwrap());
        }
    }
    synth::at_dpi(page.into(), 300)
}

fn flag(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

#[test]
fn speck_reg() {
    let mut rp = RegParams::new("stage_speck");

    let mut page = RasterBuffer::new_filled(40, 40, PixelFormat::Gray8, 230)
        .unwrap()
        .with_dpi(Dpi::uniform(300))
        .to_mut();
    page.set_pixel_unchecked(5, 5, 20);
    for y in 20..30 {
        for x in 20..30 {
            page.set_pixel_unchecked(x, y, 20);
        }
    }
    let page: RasterBuffer = page.into();

    for (policy, expected) in [
        (DespecklePolicy::Off, 101.0),
        (DespecklePolicy::Cautious, 100.0),
        (DespecklePolicy::Normal, 100.0),
        (DespecklePolicy::Aggressive, 100.0),
    ] {
        let settings = PageSettings {
            despeckle: policy,
            ..PageSettings::default()
        };
        let out = process_page(&page, &settings).unwrap();
        let black = out.image.count_black().unwrap() as f64;
        eprintln!("  {:?}: {} black, {} removed", policy, black, out.despeckle.removed);
        rp.compare_values(expected, black, 0.0);
    }

    assert!(rp.cleanup(), "stage speck regression test failed");
}

#[test]
fn mixed_photo_reg() {
    let mut rp = RegParams::new("stage_mixed_photo");

    let photo = Rect::new_unchecked(130, 30, 60, 60);
    let page = page_with_photo(photo);
    let settings = PageSettings {
        output_mode: OutputMode::Mixed,
        ..PageSettings::default()
    };
    let out = process_page(&page, &settings).unwrap();
    eprintln!("  picture zones: {:?}", out.picture_zones);

    rp.compare_values(1.0, out.picture_zones.len() as f64, 0.0);
    let mut photo_kept = true;
    for y in photo.y..photo.bottom() {
        for x in photo.x..photo.right() {
            photo_kept &= out.image.get_pixel(x as u32, y as u32) == page.get_pixel(x as u32, y as u32);
        }
    }
    rp.compare_values(1.0, flag(photo_kept), 0.0);
    // glyphs are bi-level black, paper white
    rp.compare_values(0.0, out.image.get_pixel(8, 8).unwrap() as f64, 0.0);
    rp.compare_values(255.0, out.image.get_pixel(4, 4).unwrap() as f64, 0.0);

    // subtracting the photo from every layer turns it back into bi-level output
    let settings = PageSettings {
        output_mode: OutputMode::Mixed,
        zones: vec![Zone::rect(120.0, 20.0, 80.0, 80.0, ZoneTag::PictureSubtractAll)],
        ..PageSettings::default()
    };
    let out = process_page(&page, &settings).unwrap();
    let mut bilevel = true;
    for y in photo.y..photo.bottom() {
        for x in photo.x..photo.right() {
            let v = out.image.get_pixel(x as u32, y as u32).unwrap();
            bilevel &= v == 0 || v == 255;
        }
    }
    rp.compare_values(1.0, flag(bilevel), 0.0);

    assert!(rp.cleanup(), "stage mixed photo regression test failed");
}

#[test]
fn mixed_equalized_reg() {
    let mut rp = RegParams::new("stage_mixed_equalized");

    // light paper on the left, shaded paper on the right, one dot on each
    let mut page = RasterBuffer::new_filled(80, 40, PixelFormat::Gray8, 240).unwrap().to_mut();
    for y in 0..40 {
        for x in 40..80 {
            page.set_pixel_unchecked(x, y, 120);
        }
    }
    for y in 10..14 {
        for x in 10..14 {
            page.set_pixel_unchecked(x, y, 30);
            page.set_pixel_unchecked(x + 50, y, 15);
        }
    }
    let page = synth::at_dpi(page.into(), 300);

    let mixed = PageSettings {
        output_mode: OutputMode::Mixed,
        despeckle: DespecklePolicy::Off,
        mixed: MixedOptions {
            auto_layer: false,
            picture_zones_layer: false,
            foreground_layer: false,
        },
        debug: true,
        ..PageSettings::default()
    };
    let out = process_page(&page, &mixed).unwrap();
    let names: Vec<&str> = out.snapshots.iter().map(|s| s.name).collect();
    rp.compare_values(1.0, flag(names.contains(&"equalized")), 0.0);

    // the shade is gone from the binarization, both dots survive
    rp.compare_values(255.0, out.image.get_pixel(75, 30).unwrap() as f64, 0.0);
    rp.compare_values(0.0, out.image.get_pixel(12, 12).unwrap() as f64, 0.0);
    rp.compare_values(0.0, out.image.get_pixel(62, 12).unwrap() as f64, 0.0);

    // plain black and white binarizes the source gray, shade included
    let bw = PageSettings {
        output_mode: OutputMode::BlackAndWhite,
        ..mixed.clone()
    };
    let out = process_page(&page, &bw).unwrap();
    let names: Vec<&str> = out.snapshots.iter().map(|s| s.name).collect();
    rp.compare_values(0.0, flag(names.contains(&"equalized")), 0.0);
    // 1-bit output, 1 is black
    rp.compare_values(1.0, out.image.get_pixel(75, 30).unwrap() as f64, 0.0);

    assert!(rp.cleanup(), "stage mixed equalized regression test failed");
}

#[test]
fn debug_snapshot_reg() {
    let mut rp = RegParams::new("stage_debug");

    let page = page_with_photo(Rect::new_unchecked(130, 30, 60, 60));
    let base = PageSettings {
        output_mode: OutputMode::Mixed,
        threshold: ThresholdMethod::Sauvola {
            window: 31,
            coefficient: 0.3,
            adjustment: 0,
        },
        normalize_illumination: true,
        mixed: MixedOptions {
            foreground_layer: true,
            ..MixedOptions::default()
        },
        foreground_adjustment: 10,
        ..PageSettings::default()
    };
    let plain = process_page(&page, &base).unwrap();
    let debug = process_page(
        &page,
        &PageSettings {
            debug: true,
            ..base.clone()
        },
    )
    .unwrap();

    rp.compare_raster(&plain.image, &debug.image);
    rp.compare_values(0.0, plain.snapshots.len() as f64, 0.0);

    let names: Vec<&str> = debug.snapshots.iter().map(|s| s.name).collect();
    eprintln!("  snapshots: {:?}", names);
    let expected = [
        "grayscale",
        "equalized",
        "picture-mask",
        "picture-zones",
        "binarization",
        "edges_smoothed",
        "despeckled",
        "foreground-mask",
        "composited",
    ];
    rp.compare_strings(names.join(",").as_bytes(), expected.join(",").as_bytes());
    let all_sized = debug.snapshots.iter().all(|s| s.image.size() == page.size());
    rp.compare_values(1.0, flag(all_sized), 0.0);

    assert!(rp.cleanup(), "stage debug regression test failed");
}

#[test]
fn warnings_and_cancel_reg() {
    let mut rp = RegParams::new("stage_warnings");

    let page = synth::at_dpi(synth::text_page(60, 40, 30, 220).unwrap(), 300);
    let settings = PageSettings {
        output_mode: OutputMode::Mixed,
        zones: vec![
            Zone::rect(0.0, 0.0, 10.0, 10.0, ZoneTag::PictureAdd),
            Zone::polygon(
                vec![
                    scanraster_output::Point::new(0.0, 0.0),
                    scanraster_output::Point::new(1.0, 1.0),
                ],
                ZoneTag::PictureAdd,
            ),
        ],
        ..PageSettings::default()
    };
    let out = process_page(&page, &settings).unwrap();
    let rejected = out
        .warnings
        .iter()
        .filter(|w| matches!(w, StageWarning::InvalidZoneGeometry { index: 1, .. }))
        .count();
    rp.compare_values(1.0, rejected as f64, 0.0);

    let token = CancelToken::new();
    token.cancel();
    let cancelled = OutputStage::new(settings).process(&page, &token);
    rp.compare_values(1.0, flag(matches!(cancelled, Err(OutputError::Cancelled))), 0.0);

    assert!(rp.cleanup(), "stage warnings regression test failed");
}

#[test]
fn settings_file_reg() {
    let mut rp = RegParams::new("stage_settings_file");
    let dir = tempfile::tempdir().unwrap();

    let yaml_path = dir.path().join("page.yaml");
    std::fs::write(
        &yaml_path,
        "output_mode: color_or_grayscale\npicture_sensitivity: 80\nthreshold:\n  method: wolf\n",
    )
    .unwrap();
    let from_yaml = PageSettings::from_file(&yaml_path).unwrap();
    rp.compare_values(80.0, from_yaml.picture_sensitivity as f64, 0.0);
    rp.compare_values(1.0, flag(from_yaml.output_mode == OutputMode::ColorOrGrayscale), 0.0);
    rp.compare_values(1.0, flag(from_yaml.threshold == ThresholdMethod::wolf()), 0.0);

    let json_path = dir.path().join("page.json");
    std::fs::write(&json_path, from_yaml.to_json().unwrap()).unwrap();
    let from_json = PageSettings::from_file(&json_path).unwrap();
    rp.compare_values(1.0, flag(from_json == from_yaml), 0.0);
    rp.write_data_and_check(from_yaml.to_json().unwrap().as_bytes(), "json").unwrap();

    let txt_path = dir.path().join("page.txt");
    std::fs::write(&txt_path, "{}").unwrap();
    let err = PageSettings::from_file(&txt_path);
    rp.compare_values(1.0, flag(matches!(err, Err(OutputError::Settings(_)))), 0.0);

    let missing = PageSettings::from_file(&dir.path().join("absent.json"));
    rp.compare_values(1.0, flag(matches!(missing, Err(OutputError::Io(_)))), 0.0);

    assert!(rp.cleanup(), "settings file regression test failed");
}

#[test]
fn batch_reg() {
    let mut rp = RegParams::new("stage_batch");

    let good = synth::at_dpi(synth::text_page(60, 40, 30, 220).unwrap(), 300);
    let bad = good.clone().with_dpi(Dpi::new(0, 0));
    let settings = PageSettings {
        target_dpi: Some(Dpi::uniform(200)),
        ..PageSettings::default()
    };
    let pages = vec![good.clone(), bad.clone(), good.clone(), bad];
    let report = run_batch(&pages, &settings, &CancelToken::new());

    let failed: Vec<usize> = report.failures.iter().map(|f| f.page).collect();
    let done: Vec<usize> = report.outputs.iter().map(|(i, _)| *i).collect();
    eprintln!("  done {:?}, failed {:?}", done, failed);
    rp.compare_values(1.0, flag(failed == vec![1, 3]), 0.0);
    rp.compare_values(1.0, flag(done == vec![0, 2]), 0.0);

    // parallel output equals sequential output
    let single = process_page(&good, &settings).unwrap();
    if let Some(out) = report.output(0) {
        rp.compare_raster(&single.image, &out.image);
    }

    assert!(rp.cleanup(), "batch regression test failed");
}
