//! Image decoding and tensor conversion for the classifier input.

use image::imageops::{self, FilterType};
use service_core::error::AppError;
use tract_onnx::prelude::*;

pub const IMG_WIDTH: u32 = 224;
pub const IMG_HEIGHT: u32 = 224;
pub const IMG_CHANNELS: usize = 3;

/// Decodes raw image bytes into the `[1, 224, 224, 3]` f32 tensor the model
/// expects: RGB, Lanczos-resampled, pixel values scaled to `[0, 1]`.
pub fn image_to_tensor(data: &[u8]) -> Result<Tensor, AppError> {
    let img = image::load_from_memory(data)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("failed to decode image: {}", e)))?;
    let rgb = img.to_rgb8();
    let resized = imageops::resize(&rgb, IMG_WIDTH, IMG_HEIGHT, FilterType::Lanczos3);

    let tensor: Tensor = tract_ndarray::Array4::<f32>::from_shape_fn(
        (1, IMG_HEIGHT as usize, IMG_WIDTH as usize, IMG_CHANNELS),
        |(_, y, x, c)| resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0,
    )
    .into();

    Ok(tensor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn encode_png(color: Rgb<u8>, width: u32, height: u32) -> Vec<u8> {
        let mut img = RgbImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = color;
        }
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn tensor_has_expected_shape() {
        let png = encode_png(Rgb([0, 0, 0]), 50, 30);
        let tensor = image_to_tensor(&png).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
    }

    #[test]
    fn pixels_are_scaled_to_unit_range() {
        let png = encode_png(Rgb([255, 0, 0]), 10, 10);
        let tensor = image_to_tensor(&png).unwrap();
        let view = tensor.to_array_view::<f32>().unwrap();

        // A uniform red image stays uniform through resampling.
        assert!((view[[0, 0, 0, 0]] - 1.0).abs() < 1e-5);
        assert!(view[[0, 0, 0, 1]].abs() < 1e-5);
        assert!(view[[0, 0, 0, 2]].abs() < 1e-5);
        assert!((view[[0, 112, 112, 0]] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn corrupt_bytes_are_rejected() {
        let result = image_to_tensor(b"definitely not an image");
        assert!(result.is_err());
    }
}
