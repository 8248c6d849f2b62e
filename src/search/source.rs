//! Photo sources.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use super::session::{PhotoPage, RawPhoto};

/// The fetch function the coordinator is built around.
///
/// Implementations resolve asynchronously; the coordinator decides on the
/// event-loop thread whether the result still matters.
pub trait PhotoSource: Send + Sync {
    /// Fetch one page (1-based) of results for `term`.
    fn fetch(&self, term: &str, page: u32) -> impl Future<Output = Result<PhotoPage>> + Send;
}

/// One photo in a catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    #[serde(default, alias = "url")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CatalogEntry {
    fn matches(&self, words: &[String]) -> bool {
        let title = self.title.to_lowercase();
        words.iter().all(|word| {
            title.contains(word.as_str())
                || self
                    .tags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(word.as_str()))
        })
    }
}

/// A [`PhotoSource`] over an in-memory catalog, paged like a search API.
#[derive(Debug, Clone)]
pub struct CatalogSource {
    entries: Vec<CatalogEntry>,
    page_size: usize,
    latency: Duration,
}

impl CatalogSource {
    /// Create a source serving `entries` in pages of `page_size`.
    pub fn new(entries: Vec<CatalogEntry>, page_size: usize) -> Self {
        Self {
            entries,
            page_size: page_size.max(1),
            latency: Duration::ZERO,
        }
    }

    /// Delay every fetch, to make in-flight behavior observable.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Load a JSON array of [`CatalogEntry`] values.
    ///
    /// Entries whose URL has no scheme are treated as paths relative to the
    /// catalog file and turned into `file://` URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid catalog.
    pub fn load(path: &Path, page_size: usize) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        let mut entries: Vec<CatalogEntry> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog {}", path.display()))?;

        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        for entry in &mut entries {
            if let Some(url) = entry.source_url.take() {
                entry.source_url = Some(resolve_source(&base_dir, &url));
            }
        }
        tracing::info!(path = %path.display(), entries = entries.len(), "catalog loaded");
        Ok(Self::new(entries, page_size))
    }

    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compute one page synchronously.
    ///
    /// # Errors
    ///
    /// Returns an error for page 0.
    pub fn page(&self, term: &str, page: u32) -> Result<PhotoPage> {
        if page == 0 {
            bail!("page numbers start at 1");
        }
        let words = term
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>();
        if words.is_empty() {
            return Ok(PhotoPage::default());
        }

        let matching = self
            .entries
            .iter()
            .filter(|entry| entry.matches(&words))
            .collect::<Vec<_>>();
        let start = (page as usize - 1).saturating_mul(self.page_size);
        let items = matching
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|entry| RawPhoto {
                title: entry.title.clone(),
                source_url: entry.source_url.clone(),
            })
            .collect();

        Ok(PhotoPage {
            items,
            total_count: matching.len(),
        })
    }
}

impl PhotoSource for CatalogSource {
    async fn fetch(&self, term: &str, page: u32) -> Result<PhotoPage> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.page(term, page)
    }
}

fn resolve_source(base_dir: &Path, url: &str) -> String {
    if url.is_empty() || url.contains("://") {
        return url.to_string();
    }
    let path = Path::new(url);
    let full = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    };
    let full = std::path::absolute(&full).unwrap_or(full);
    format!("file://{}", full.display())
}
