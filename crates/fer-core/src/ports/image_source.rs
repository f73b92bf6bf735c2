//! Where face crops come from.

use crate::domain::FaceImage;

/// Port for loading face crops.
pub trait ImageSource: Send + Sync {
    /// Iterates over the images of this source.
    ///
    /// # Errors
    ///
    /// Individual items are errors when an image cannot be decoded; the
    /// batch runner skips those and keeps going.
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<FaceImage>> + Send + '_>;

    /// Total number of images, if known up front.
    fn count_hint(&self) -> Option<usize>;
}
