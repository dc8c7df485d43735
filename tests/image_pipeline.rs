//! Listing, selection, and preprocessing over real (synthesized) image
//! files on disk.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;

use embcheck::{list_images, load_batch, prepare_image, select_images};

fn write_image(dir: &Path, name: &str, side: u32, rgb: [u8; 3], format: ImageFormat) {
    let image = RgbImage::from_pixel(side, side, Rgb(rgb));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    std::fs::write(dir.join(name), bytes).unwrap();
}

#[test]
fn mixed_formats_are_listed_in_name_order() {
    let dir = TempDir::new().unwrap();
    write_image(dir.path(), "c.bmp", 4, [1, 1, 1], ImageFormat::Bmp);
    write_image(dir.path(), "a.png", 4, [2, 2, 2], ImageFormat::Png);
    write_image(dir.path(), "b.jpg", 4, [3, 3, 3], ImageFormat::Jpeg);
    std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

    let paths = list_images(dir.path()).unwrap();
    let names: Vec<_> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["a.png", "b.jpg", "c.bmp"]);
}

#[test]
fn selection_then_batch_load_produces_model_ready_tensors() {
    let dir = TempDir::new().unwrap();
    write_image(dir.path(), "0.png", 32, [255, 255, 255], ImageFormat::Png);
    write_image(dir.path(), "1.png", 32, [0, 0, 0], ImageFormat::Png);
    write_image(dir.path(), "2.png", 32, [0, 0, 0], ImageFormat::Png);

    let paths = select_images(dir.path(), 2).unwrap();
    let batch = load_batch(&paths).unwrap();

    assert_eq!(batch.dim(), (2, 3, 256, 256));
    // First selected image is white, second black, both resized up to 256.
    assert!((batch[[0, 0, 128, 128]] - 1.0).abs() < 1e-6);
    assert!((batch[[1, 0, 128, 128]] + 1.0).abs() < 1e-6);
}

#[test]
fn prepare_image_accepts_raw_bytes_from_disk() {
    let dir = TempDir::new().unwrap();
    write_image(dir.path(), "one.webp", 64, [128, 128, 128], ImageFormat::WebP);

    let bytes = std::fs::read(dir.path().join("one.webp")).unwrap();
    let tensor = prepare_image(&bytes).unwrap();
    assert_eq!(tensor.dim(), (3, 256, 256));
    // Mid-gray lands near zero after (x/255 - 0.5) / 0.5.
    assert!(tensor[[1, 10, 10]].abs() < 0.05);
}

#[test]
fn undecodable_file_fails_the_batch() {
    let dir = TempDir::new().unwrap();
    write_image(dir.path(), "good.png", 8, [9, 9, 9], ImageFormat::Png);
    std::fs::write(dir.path().join("bad.png"), b"corrupted bytes").unwrap();

    let paths = select_images(dir.path(), 2).unwrap();
    assert!(load_batch(&paths).is_err());
}
