//! Search history.
//!
//! A bounded, duplicate-free, most-recent-first list of search terms.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Number of terms kept.
pub const MAX_HISTORY_ITEMS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHistory {
    terms: Vec<String>,
    max_items: usize,
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new(MAX_HISTORY_ITEMS)
    }
}

impl SearchHistory {
    pub fn new(max_items: usize) -> Self {
        Self {
            terms: Vec::new(),
            max_items,
        }
    }

    /// Build a history from terms listed most recent first.
    ///
    /// Later duplicates and blank terms are dropped and the list is
    /// truncated to the bound.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut history = Self::default();
        for term in terms {
            let term = term.into();
            let term = term.trim();
            if term.is_empty() || history.terms.iter().any(|t| t == term) {
                continue;
            }
            history.terms.push(term.to_string());
        }
        history.terms.truncate(history.max_items);
        history
    }

    /// Record `term` as the most recent search.
    ///
    /// An equal earlier entry is removed first, so re-searching promotes it.
    pub fn add(&mut self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            return;
        }
        self.terms.retain(|t| t != term);
        self.terms.insert(0, term.to_string());
        self.terms.truncate(self.max_items);
    }

    /// All terms, most recent first.
    pub fn all(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Default history file location.
pub fn default_history_path() -> PathBuf {
    crate::config::global_config_path().with_file_name("history.json")
}

/// Load history from a JSON array of strings. A missing file is empty history.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_history(path: &Path) -> Result<SearchHistory> {
    if !path.exists() {
        return Ok(SearchHistory::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read history {}", path.display()))?;
    let terms: Vec<String> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse history {}", path.display()))?;
    Ok(SearchHistory::from_terms(terms))
}

/// Write history as a JSON array of strings.
///
/// # Errors
///
/// Returns an error if the file or its directory cannot be written.
pub fn save_history(path: &Path, history: &SearchHistory) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create history dir {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(history.all())?;
    fs::write(path, format!("{json}\n"))
        .with_context(|| format!("Failed to write history {}", path.display()))
}
