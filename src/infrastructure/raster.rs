// Raster decoding and single-pixel extraction for PNG tiles
use crate::domain::error::NowcastError;
use crate::domain::geo::PixelOffset;
use crate::domain::precipitation::Color;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, RgbaImage};

/// Decode a whole tile and read the pixel at `offset`.
/// The bounds are checked against the decoded raster, since a truncated
/// tile may be smaller than 256x256.
pub fn sample_pixel(bytes: &[u8], offset: PixelOffset) -> Result<Color, NowcastError> {
    let raster = decode(bytes)?;
    let (width, height) = raster.dimensions();
    if offset.x >= width || offset.y >= height {
        return Err(NowcastError::TileDecode(format!(
            "pixel ({}, {}) outside {}x{} raster",
            offset.x, offset.y, width, height
        )));
    }

    let [r, g, b, a] = raster.get_pixel(offset.x, offset.y).0;
    Ok(Color::new(r, g, b, a))
}

fn decode(bytes: &[u8]) -> Result<RgbaImage, NowcastError> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| NowcastError::TileDecode(e.to_string()))
}

/// Encode a single pixel as a 1x1 PNG `data:` URI
pub fn pixel_data_uri(color: Color) -> Result<String, NowcastError> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(
            &[color.r, color.g, color.b, color.a],
            1,
            1,
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| NowcastError::TileDecode(e.to_string()))?;

    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

/// Build an in-memory PNG of a solid raster with one highlighted pixel
#[cfg(test)]
pub fn synthetic_tile(size: u32, at: PixelOffset, color: Color) -> Vec<u8> {
    let mut raster = RgbaImage::from_pixel(size, size, image::Rgba([255, 255, 255, 0]));
    raster.put_pixel(at.x, at.y, image::Rgba([color.r, color.g, color.b, color.a]));

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(raster.as_raw(), size, size, image::ExtendedColorType::Rgba8)
        .unwrap();
    png
}
