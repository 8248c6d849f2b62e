//! Image loading and caching.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result, bail};
use image::DynamicImage;

/// Default number of decoded images kept in memory.
pub const DEFAULT_CACHE_SIZE: usize = 200;

/// Longest edge of a decoded thumbnail, in pixels.
pub const THUMBNAIL_EDGE: u32 = 256;

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, DynamicImage>,
    order: VecDeque<String>,
}

/// Cache for decoded images, keyed by absolute URL string.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    inner: Arc<Mutex<CacheInner>>,
    max_size: usize,
}

impl ImageCache {
    /// Create a new image cache with the given maximum number of entries.
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner::default())),
            max_size,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Get an image from the cache.
    pub fn get(&self, url: &str) -> Option<DynamicImage> {
        self.lock().entries.get(url).cloned()
    }

    /// Insert an image into the cache.
    pub fn put(&self, url: &str, image: DynamicImage) {
        let mut guard = self.lock();

        if let Some(existing) = guard.entries.get_mut(url) {
            *existing = image;
            return;
        }

        guard.order.push_back(url.to_string());
        guard.entries.insert(url.to_string(), image);

        while guard.entries.len() > self.max_size {
            if let Some(oldest) = guard.order.pop_front() {
                guard.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }

    /// Check if an image is in the cache.
    pub fn contains(&self, url: &str) -> bool {
        self.lock().entries.contains_key(url)
    }

    /// Clear the cache.
    pub fn clear(&self) {
        let mut guard = self.lock();
        guard.entries.clear();
        guard.order.clear();
    }

    /// Get the number of cached images.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fetches raw image bytes for a URL.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Serves `file://` URLs from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageFetcher;

impl FsImageFetcher {
    fn path_for(url: &str) -> Result<PathBuf> {
        let Some(path) = url.strip_prefix("file://") else {
            bail!("unsupported image url {url}");
        };
        Ok(PathBuf::from(path))
    }
}

impl ImageFetcher for FsImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let path = Self::path_for(url)?;
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        if bytes.is_empty() {
            bail!("empty image {}", path.display());
        }
        Ok(bytes)
    }
}

/// Cache-first image loader.
///
/// The cache is consulted before any fetch; freshly decoded images are
/// stored under their URL.
#[derive(Debug)]
pub struct ThumbnailLoader<F> {
    cache: ImageCache,
    fetcher: Arc<F>,
    max_edge: u32,
}

impl<F> Clone for ThumbnailLoader<F> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            fetcher: Arc::clone(&self.fetcher),
            max_edge: self.max_edge,
        }
    }
}

impl<F: ImageFetcher> ThumbnailLoader<F> {
    /// Create a loader producing images no larger than `max_edge` pixels.
    pub fn new(fetcher: F, cache: ImageCache, max_edge: u32) -> Self {
        Self {
            cache,
            fetcher: Arc::new(fetcher),
            max_edge,
        }
    }

    pub const fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Load the image at `url`, using the cache if available.
    ///
    /// Decoding runs on the blocking pool so the event loop keeps draining
    /// messages meanwhile.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be fetched or decoded.
    pub async fn load(&self, url: &str) -> Result<DynamicImage> {
        if let Some(image) = self.cache.get(url) {
            return Ok(image);
        }

        let bytes = self.fetcher.fetch(url).await?;
        let max_edge = self.max_edge;
        let owned_url = url.to_string();
        let image = tokio::task::spawn_blocking(move || decode(&bytes, max_edge, &owned_url))
            .await
            .with_context(|| format!("Decode task for {url} did not finish"))??;
        self.cache.put(url, image.clone());
        Ok(image)
    }
}

fn decode(bytes: &[u8], max_edge: u32, url: &str) -> Result<DynamicImage> {
    let _decode = crate::perf::scope("image.decode");
    let decoded =
        image::load_from_memory(bytes).with_context(|| format!("Failed to decode image {url}"))?;
    if decoded.width() > max_edge || decoded.height() > max_edge {
        Ok(decoded.thumbnail(max_edge, max_edge))
    } else {
        Ok(decoded)
    }
}

/// Remembers which URL each grid slot last asked for.
///
/// A slot may be reused for a different photo before its previous load
/// finishes; only the completion matching the latest binding is shown.
#[derive(Debug, Clone, Default)]
pub struct SlotBindings {
    bound: HashMap<usize, String>,
}

impl SlotBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `slot` to `url`. Returns false if it was already bound to it.
    pub fn bind(&mut self, slot: usize, url: &str) -> bool {
        if self.bound.get(&slot).is_some_and(|bound| bound == url) {
            return false;
        }
        self.bound.insert(slot, url.to_string());
        true
    }

    /// Whether a load of `url` finishing for `slot` should be shown.
    pub fn accepts(&self, slot: usize, url: &str) -> bool {
        self.bound.get(&slot).is_some_and(|bound| bound == url)
    }

    pub fn unbind(&mut self, slot: usize) {
        self.bound.remove(&slot);
    }

    pub fn clear(&mut self) {
        self.bound.clear();
    }
}
