//! Synthetic models and images for testing.

use fer_core::model::{IMAGE_SIZE, NUM_CLASSES, PARAMETER_SHAPES};
use fer_core::{FaceImage, Model, Tensor, TensorStream};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

/// Builder for models with known, reproducible parameters.
pub struct SyntheticModelBuilder {
    fill: Box<dyn Fn(usize, usize) -> f32>,
}

impl SyntheticModelBuilder {
    /// Pseudo-random weights in `[-scale, scale]` derived from `seed`.
    ///
    /// The same seed always gives bit-identical parameters.
    #[must_use]
    pub fn deterministic(seed: u32, scale: f32) -> Self {
        Self {
            fill: Box::new(move |param, j| {
                let h = hash(seed, param, j);
                #[allow(clippy::cast_precision_loss)]
                let unit = (h % 20_001) as f32 / 10_000.0 - 1.0;
                unit * scale
            }),
        }
    }

    /// All weights zero, `fc.bias` set to `logits`.
    ///
    /// Every input then produces exactly `logits`.
    #[must_use]
    pub fn bias_only(logits: [f32; NUM_CLASSES]) -> Self {
        Self {
            fill: Box::new(move |param, j| if param == 5 { logits[j] } else { 0.0 }),
        }
    }

    /// The six flat tensors in stream order.
    #[must_use]
    pub fn tensors(&self) -> Vec<Tensor> {
        PARAMETER_SHAPES
            .iter()
            .enumerate()
            .map(|(i, shape)| {
                let n: usize = shape.iter().product();
                Tensor::flat((0..n).map(|j| (self.fill)(i, j)).collect())
            })
            .collect()
    }

    /// Builds the model.
    ///
    /// # Panics
    ///
    /// Never in practice; the tensors always have the architecture sizes.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn build(&self) -> Model {
        Model::from_stream(TensorStream::new(self.tensors())).expect("synthetic model fits")
    }

    /// Encodes the model as a tensor stream.
    ///
    /// # Panics
    ///
    /// Never in practice; writing to a `Vec` cannot fail.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        TensorStream::new(self.tensors())
            .write(&mut bytes)
            .expect("write to vec");
        bytes
    }
}

#[allow(clippy::cast_possible_truncation)]
fn hash(seed: u32, param: usize, j: usize) -> u32 {
    let mut h = seed ^ 0x9E37_79B9;
    h = h.wrapping_mul(2_654_435_761) ^ (param as u32).wrapping_mul(0x85EB_CA6B);
    h = h.wrapping_mul(2_246_822_519) ^ (j as u32).wrapping_mul(0xC2B2_AE35);
    h ^ (h >> 15)
}

/// Builder for synthetic face crops.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    /// Creates a uniform gray image.
    #[must_use]
    pub fn uniform_gray(width: u32, height: u32, value: u8) -> FaceImage {
        let img = GrayImage::from_pixel(width, height, Luma([value]));
        FaceImage::new("synthetic://uniform_gray", DynamicImage::ImageLuma8(img))
    }

    /// Creates a diagonal gradient, dark at the top left.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn gradient(width: u32, height: u32) -> FaceImage {
        let span = (width + height).saturating_sub(2).max(1);
        let img = GrayImage::from_fn(width, height, |x, y| {
            Luma([((u32::from(u8::MAX) * (x + y)) / span) as u8])
        });
        FaceImage::new("synthetic://gradient", DynamicImage::ImageLuma8(img))
    }

    /// Creates a high-contrast checkerboard.
    #[must_use]
    pub fn checkerboard(width: u32, height: u32, cell_size: u32) -> FaceImage {
        let cell = cell_size.max(1);
        let img = GrayImage::from_fn(width, height, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        FaceImage::new("synthetic://checkerboard", DynamicImage::ImageLuma8(img))
    }

    /// Creates a solid color image, for exercising grayscale conversion.
    #[must_use]
    pub fn solid_rgb(width: u32, height: u32, rgb: [u8; 3]) -> FaceImage {
        let img = RgbImage::from_pixel(width, height, Rgb(rgb));
        FaceImage::new("synthetic://solid_rgb", DynamicImage::ImageRgb8(img))
    }

    /// Renames the image, e.g. to tell records apart.
    #[must_use]
    pub fn named(image: FaceImage, path: &str) -> FaceImage {
        FaceImage {
            path: path.to_string(),
            ..image
        }
    }
}

/// Builds FER-2013 CSV text with a `Usage` column.
///
/// Each row is `(emotion, gray level, usage)`; every pixel of the row gets
/// the same gray level.
#[must_use]
pub fn fer2013_csv(rows: &[(usize, u8, &str)]) -> String {
    let mut csv = String::from("emotion,pixels,Usage\n");
    for (emotion, level, usage) in rows {
        let pixels = vec![level.to_string(); IMAGE_SIZE * IMAGE_SIZE].join(" ");
        csv.push_str(&format!("{emotion},{pixels},{usage}\n"));
    }
    csv
}
