//! Search session data.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::SearchError;

/// Absolute `http`, `https` or `file` URLs are the only ones we can load.
static SOURCE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://[A-Za-z0-9.\-]+(?::\d+)?(?:/\S*)?|file:///\S+)$")
        .unwrap_or_else(|err| panic!("invalid source url pattern: {err}"))
});

/// Static-farm photo URLs: `<base>/<id>_<secret>[_<size>].<ext>`.
static SIZED_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<base>https?://\S+/\d+_[0-9a-f]+)(?:_[a-z0-9])?\.(?P<ext>jpg|jpeg|png|gif)$")
        .unwrap_or_else(|err| panic!("invalid sized url pattern: {err}"))
});

/// Identity of one search session.
///
/// Handles are handed out in increasing order and never reused, so a handle
/// that is no longer current can never become current again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionHandle(u64);

impl SessionHandle {
    pub(super) const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw identity, for logging.
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// A result item as delivered by a [`PhotoSource`](super::PhotoSource).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPhoto {
    pub title: String,
    #[serde(default, alias = "url")]
    pub source_url: Option<String>,
}

impl RawPhoto {
    pub fn new(title: impl Into<String>, source_url: Option<&str>) -> Self {
        Self {
            title: title.into(),
            source_url: source_url.map(ToOwned::to_owned),
        }
    }
}

/// One page of results plus the server's total for the whole search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoPage {
    pub items: Vec<RawPhoto>,
    pub total_count: usize,
}

/// A displayable search result. Always carries a loadable URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    title: String,
    source_url: String,
}

impl Photo {
    /// Build a photo, rejecting URLs that cannot be loaded.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::NoUrl`] when `source_url` is not an absolute
    /// `http`, `https` or `file` URL.
    pub fn new(title: impl Into<String>, source_url: &str) -> Result<Self, SearchError> {
        let url = source_url.trim();
        if !SOURCE_URL.is_match(url) {
            return Err(SearchError::NoUrl);
        }
        Ok(Self {
            title: title.into(),
            source_url: url.to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Full-size image URL, used for the full-screen preview.
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// URL of a thumbnail suited to the given screen scale.
    ///
    /// Static-farm URLs are rewritten to a size suffix (`q` for 1x, `n` for
    /// 2x, `z` beyond); anything else is returned unchanged.
    pub fn thumbnail_url(&self, screen_scale: f32) -> String {
        let Some(caps) = SIZED_URL.captures(&self.source_url) else {
            return self.source_url.clone();
        };
        let suffix = if screen_scale <= 1.0 {
            'q'
        } else if screen_scale <= 2.0 {
            'n'
        } else {
            'z'
        };
        format!("{}_{suffix}.{}", &caps["base"], &caps["ext"])
    }
}

impl TryFrom<RawPhoto> for Photo {
    type Error = SearchError;

    fn try_from(raw: RawPhoto) -> Result<Self, Self::Error> {
        let url = raw.source_url.ok_or(SearchError::NoUrl)?;
        Self::new(raw.title, &url)
    }
}

/// Accumulated results of one search.
///
/// Items only ever grow by appending a fetched page, and never outnumber
/// `total_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSession {
    search_term: String,
    page_number: u32,
    items: Vec<Photo>,
    total_count: usize,
    received: usize,
    exhausted: bool,
}

impl SearchSession {
    /// Start an empty session for `search_term`.
    pub fn new(search_term: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            page_number: 1,
            items: Vec::new(),
            total_count: 0,
            received: 0,
            exhausted: false,
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Next page to request. Starts at 1.
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn items(&self) -> &[Photo] {
        &self.items
    }

    /// Server-reported number of results for the whole search.
    pub const fn total_count(&self) -> usize {
        self.total_count
    }

    /// Whether another page may exist.
    ///
    /// Counts raw items, so a search whose results include URL-less items
    /// still runs out of pages.
    pub const fn has_more(&self) -> bool {
        if self.exhausted {
            return false;
        }
        self.page_number == 1 || self.received < self.total_count
    }

    /// Append a fetched page and return `(old_count, new_count)`.
    pub fn append_page(&mut self, page: PhotoPage) -> (usize, usize) {
        let old_count = self.items.len();
        if page.total_count < old_count {
            tracing::debug!(
                term = %self.search_term,
                reported = page.total_count,
                fetched = old_count,
                "server total shrank below fetched count"
            );
        }
        self.total_count = page.total_count.max(old_count);
        self.received += page.items.len();
        if page.items.is_empty() {
            self.exhausted = true;
        }

        let room = self.total_count - old_count;
        let term = &self.search_term;
        let photos = page
            .items
            .into_iter()
            .filter_map(|raw| {
                let title = raw.title.clone();
                Photo::try_from(raw)
                    .inspect_err(|err| tracing::debug!(%term, %title, "dropping result: {err}"))
                    .ok()
            })
            .take(room);
        self.items.extend(photos);
        self.page_number += 1;

        (old_count, self.items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FARM_URL: &str = "https://farm8.staticflickr.com/7885/46325113415_b0eeaf274b.jpg";

    fn page(count: usize, total: usize) -> PhotoPage {
        PhotoPage {
            items: (0..count)
                .map(|i| RawPhoto::new(format!("photo {i}"), Some(FARM_URL)))
                .collect(),
            total_count: total,
        }
    }

    #[test]
    fn test_new_session_is_empty_on_first_page() {
        let session = SearchSession::new("cat");
        assert_eq!(session.search_term(), "cat");
        assert_eq!(session.page_number(), 1);
        assert!(session.items().is_empty());
        assert_eq!(session.total_count(), 0);
        assert!(session.has_more());
    }

    #[test]
    fn test_append_page_reports_delta_and_advances_page() {
        let mut session = SearchSession::new("cat");
        assert_eq!(session.append_page(page(25, 100)), (0, 25));
        assert_eq!(session.append_page(page(25, 100)), (25, 50));
        assert_eq!(session.page_number(), 3);
        assert_eq!(session.total_count(), 100);
        assert!(session.has_more());
    }

    #[test]
    fn test_items_without_url_are_dropped_but_total_kept() {
        let mut session = SearchSession::new("cat");
        let mut first = page(3, 4);
        first.items.push(RawPhoto::new("no url", None));
        first.items.push(RawPhoto::new("bad url", Some("not a url")));

        assert_eq!(session.append_page(first), (0, 3));
        assert_eq!(session.total_count(), 4);
        assert!(!session.has_more());
    }

    #[test]
    fn test_items_never_exceed_total() {
        let mut session = SearchSession::new("cat");
        assert_eq!(session.append_page(page(30, 20)), (0, 20));
        assert!(session.items().len() <= session.total_count());
    }

    #[test]
    fn test_empty_page_exhausts_session() {
        let mut session = SearchSession::new("cat");
        session.append_page(page(10, 100));
        session.append_page(page(0, 100));
        assert!(!session.has_more());
    }

    #[test]
    fn test_empty_search_has_no_more_pages() {
        let mut session = SearchSession::new("zzz");
        session.append_page(page(0, 0));
        assert!(!session.has_more());
    }

    #[test]
    fn test_photo_rejects_unusable_urls() {
        assert_eq!(Photo::new("a", ""), Err(SearchError::NoUrl));
        assert_eq!(Photo::new("a", "ftp://host/x.jpg"), Err(SearchError::NoUrl));
        assert_eq!(Photo::new("a", "relative/x.jpg"), Err(SearchError::NoUrl));
        assert!(Photo::new("a", FARM_URL).is_ok());
        assert!(Photo::new("a", "file:///tmp/x.png").is_ok());
        assert!(Photo::new("a", "http://localhost:8080/x.png").is_ok());
    }

    #[test]
    fn test_thumbnail_url_picks_size_from_scale() {
        let photo = Photo::new("a", FARM_URL).unwrap();
        assert_eq!(
            photo.thumbnail_url(1.0),
            "https://farm8.staticflickr.com/7885/46325113415_b0eeaf274b_q.jpg"
        );
        assert_eq!(
            photo.thumbnail_url(2.0),
            "https://farm8.staticflickr.com/7885/46325113415_b0eeaf274b_n.jpg"
        );
        assert_eq!(
            photo.thumbnail_url(3.0),
            "https://farm8.staticflickr.com/7885/46325113415_b0eeaf274b_z.jpg"
        );
    }

    #[test]
    fn test_thumbnail_url_replaces_existing_suffix() {
        let photo = Photo::new(
            "a",
            "https://farm8.staticflickr.com/7885/46325113415_b0eeaf274b_b.jpg",
        )
        .unwrap();
        assert_eq!(
            photo.thumbnail_url(1.0),
            "https://farm8.staticflickr.com/7885/46325113415_b0eeaf274b_q.jpg"
        );
    }

    #[test]
    fn test_thumbnail_url_leaves_other_urls_alone() {
        let photo = Photo::new("a", "file:///photos/cat.png").unwrap();
        assert_eq!(photo.thumbnail_url(2.0), "file:///photos/cat.png");
    }

    #[test]
    fn test_raw_photo_accepts_url_alias() {
        let raw: RawPhoto = serde_json::from_str(r#"{"title":"t","url":"file:///a.png"}"#).unwrap();
        assert_eq!(raw.source_url.as_deref(), Some("file:///a.png"));
        let raw: RawPhoto = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert!(raw.source_url.is_none());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn items_grow_monotonically_within_total(
                pages in proptest::collection::vec((0..40usize, 0..200usize, 0..5usize), 1..12),
            ) {
                let mut session = SearchSession::new("q");
                let mut last = 0;
                for (count, total, missing) in pages {
                    let mut next = page(count, total);
                    for _ in 0..missing {
                        next.items.push(RawPhoto::new("missing", None));
                    }
                    let (old, new) = session.append_page(next);
                    prop_assert_eq!(old, last);
                    prop_assert!(new >= old);
                    prop_assert!(session.items().len() <= session.total_count());
                    last = new;
                }
            }
        }
    }
}
