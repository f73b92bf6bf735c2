//! Integration tests for loading face crops from disk.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use fer_adapters::FsImageSource;
use fer_core::ImageSource;
use image::{GrayImage, Luma, RgbImage};
use std::path::Path;

fn write_gray(path: &Path, size: u32) {
    GrayImage::from_pixel(size, size, Luma([120])).save(path).unwrap();
}

#[test]
fn test_load_png_and_bmp() {
    let dir = tempfile::tempdir().unwrap();
    write_gray(&dir.path().join("a.png"), 48);
    RgbImage::from_pixel(64, 32, image::Rgb([1, 2, 3]))
        .save(dir.path().join("b.bmp"))
        .unwrap();

    let source = FsImageSource::new(vec![dir.path().to_path_buf()], false);
    assert_eq!(source.count_hint(), Some(2));

    let images: Vec<_> = source.images().map(|r| r.expect("should load")).collect();
    assert!(images[0].path.ends_with("a.png"));
    assert_eq!((images[0].width, images[0].height), (48, 48));
    assert!(images[1].path.ends_with("b.bmp"));
    assert_eq!((images[1].width, images[1].height), (64, 32));
}

#[test]
fn test_recursion_is_opt_in() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("nested");
    std::fs::create_dir(&nested).unwrap();
    write_gray(&dir.path().join("top.png"), 48);
    write_gray(&nested.join("inner.png"), 48);
    std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

    let flat = FsImageSource::new(vec![dir.path().to_path_buf()], false);
    assert_eq!(flat.count_hint(), Some(1));

    let deep = FsImageSource::new(vec![dir.path().to_path_buf()], true);
    assert_eq!(deep.count_hint(), Some(2));
}

#[test]
fn test_corrupt_file_is_an_error_item() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"not a png").unwrap();

    let source = FsImageSource::new(vec![path], false);
    let items: Vec<_> = source.images().collect();
    assert_eq!(items.len(), 1);
    let err = items.into_iter().next().unwrap().unwrap_err();
    assert!(format!("{err:#}").contains("broken.png"));
}
