//! Pixel pipeline feeding the vision encoder: decode, resize, scale,
//! normalize, and transpose to the NCHW layout the exported models expect.
//!
//! The constants mirror the preprocessor both exports were traced with:
//! 256x256 input, 1/255 scale, mean and std of 0.5 per channel.

use std::fs;
use std::path::Path;

use image::imageops::FilterType;
use image::RgbImage;
use ndarray::{Array, Array3, Array4};

use crate::error::CheckError;

/// Model input side length in pixels.
pub const INPUT_SIDE: u32 = 256;
/// Per-pixel scale applied before normalization.
pub const PIXEL_SCALE: f32 = 1.0 / 255.0;
/// Per-channel mean subtracted after scaling.
pub const PIXEL_MEAN: f32 = 0.5;
/// Per-channel std divided out after mean subtraction.
pub const PIXEL_STD: f32 = 0.5;

const CHANNELS: usize = 3;

/// Decode raw image bytes into an RGB buffer sized for the model.
///
/// Any format the `image` crate is compiled with is accepted; non-square or
/// differently sized inputs are resized (exact, bilinear) to
/// [`INPUT_SIDE`]x[`INPUT_SIDE`].
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, CheckError> {
    let decoded = image::load_from_memory(bytes)?;
    let decoded = if decoded.width() != INPUT_SIDE || decoded.height() != INPUT_SIDE {
        decoded.resize_exact(INPUT_SIDE, INPUT_SIDE, FilterType::Triangle)
    } else {
        decoded
    };
    Ok(decoded.to_rgb8())
}

/// Scale, normalize, and transpose one RGB image into a `(3, 256, 256)`
/// f32 tensor. Pure function: bytes in, normalized tensor out.
pub fn normalize_image(image: &RgbImage) -> Result<Array3<f32>, CheckError> {
    let (width, height) = image.dimensions();
    if width != INPUT_SIDE || height != INPUT_SIDE {
        return Err(CheckError::Inference(format!(
            "expected a {INPUT_SIDE}x{INPUT_SIDE} image, got {width}x{height}"
        )));
    }

    let side = INPUT_SIDE as usize;
    let mut storage = Vec::with_capacity(CHANNELS * side * side);
    // HWC -> CHW while normalizing, so the output is already model layout.
    for channel in 0..CHANNELS {
        for y in 0..INPUT_SIDE {
            for x in 0..INPUT_SIDE {
                let value = image.get_pixel(x, y)[channel] as f32;
                storage.push((value * PIXEL_SCALE - PIXEL_MEAN) / PIXEL_STD);
            }
        }
    }

    Array::from_shape_vec((CHANNELS, side, side), storage)
        .map_err(|e| CheckError::Inference(e.to_string()))
}

/// Decode and normalize raw bytes in one step.
pub fn prepare_image(bytes: &[u8]) -> Result<Array3<f32>, CheckError> {
    let decoded = decode_image(bytes)?;
    normalize_image(&decoded)
}

/// Load a batch of image files and stack them into a `(B, 3, 256, 256)`
/// tensor, preserving the order of `paths`.
pub fn load_batch<P: AsRef<Path>>(paths: &[P]) -> Result<Array4<f32>, CheckError> {
    let side = INPUT_SIDE as usize;
    let mut storage = Vec::with_capacity(paths.len() * CHANNELS * side * side);
    for path in paths {
        let bytes = fs::read(path.as_ref())?;
        let tensor = prepare_image(&bytes)?;
        storage.extend(tensor.iter().copied());
    }

    Array::from_shape_vec((paths.len(), CHANNELS, side, side), storage)
        .map_err(|e| CheckError::Inference(e.to_string()))
}
