use std::path::Path;

use image::{ColorType, DynamicImage, GrayImage, RgbImage};
use scanraster::{Dpi, PixelFormat, RasterBuffer, color};

use crate::error::{CliError, Result};

/// Read a page image; gray files stay gray, everything else becomes colour.
pub fn read_page(path: &Path, dpi: u32) -> Result<RasterBuffer> {
    let img = image::open(path)?;
    Ok(to_raster(&img)?.with_dpi(Dpi::uniform(dpi)))
}

pub fn to_raster(img: &DynamicImage) -> Result<RasterBuffer> {
    let raster = match img.color() {
        ColorType::L8 | ColorType::L16 | ColorType::La8 | ColorType::La16 => {
            let gray = img.to_luma8();
            RasterBuffer::from_gray_bytes(gray.width(), gray.height(), gray.as_raw())?
        }
        _ => {
            let rgb = img.to_rgb8();
            RasterBuffer::from_rgb_bytes(rgb.width(), rgb.height(), rgb.as_raw())?
        }
    };
    Ok(raster)
}

pub fn to_image(raster: &RasterBuffer) -> Result<DynamicImage> {
    let (w, h) = raster.size();
    let image = match raster.format() {
        PixelFormat::Bit1 => {
            let bytes = raster.data().iter().map(|&v| if v != 0 { 0 } else { 255 }).collect();
            DynamicImage::ImageLuma8(gray_image(w, h, bytes)?)
        }
        PixelFormat::Gray8 => {
            let bytes = raster.data().iter().map(|&v| v as u8).collect();
            DynamicImage::ImageLuma8(gray_image(w, h, bytes)?)
        }
        PixelFormat::Rgb32 => {
            let bytes = raster
                .data()
                .iter()
                .flat_map(|&p| [color::red(p), color::green(p), color::blue(p)])
                .collect();
            let rgb = RgbImage::from_raw(w, h, bytes)
                .ok_or_else(|| CliError::job(format!("Invalid colour buffer for {w}x{h} image")))?;
            DynamicImage::ImageRgb8(rgb)
        }
    };
    Ok(image)
}

fn gray_image(w: u32, h: u32, bytes: Vec<u8>) -> Result<GrayImage> {
    GrayImage::from_raw(w, h, bytes)
        .ok_or_else(|| CliError::job(format!("Invalid gray buffer for {w}x{h} image")))
}

/// Write a page image; the format follows the file extension.
pub fn write_page(path: &Path, raster: &RasterBuffer) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    to_image(raster)?.save(path)?;
    Ok(())
}
