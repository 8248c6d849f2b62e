//! Thumbnail and preview loading.
//!
//! Images are fetched through an [`ImageFetcher`], decoded with the `image`
//! crate and kept in a shared [`ImageCache`] keyed by URL. [`SlotBindings`]
//! keeps late loads from landing in a grid cell that has moved on.

mod loader;

pub use loader::{
    DEFAULT_CACHE_SIZE, FsImageFetcher, ImageCache, ImageFetcher, SlotBindings, THUMBNAIL_EDGE,
    ThumbnailLoader,
};

use image::{DynamicImage, GenericImageView};

/// Screen scale used to pick thumbnail sizes.
pub const DEFAULT_SCREEN_SCALE: f32 = 2.0;

/// Short human-readable summary of a decoded image, e.g. `640x480 rgb8`.
pub fn describe(image: &DynamicImage) -> String {
    let (width, height) = image.dimensions();
    let color = format!("{:?}", image.color()).to_lowercase();
    format!("{width}x{height} {color}")
}
