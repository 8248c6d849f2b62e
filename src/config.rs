use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const DEFAULT_COLUMNS: usize = 4;
pub const DEFAULT_ROWS: usize = 5;

/// Flags accepted both on the command line and in config files.
///
/// Numeric options stay `None` until set so that [`ConfigFlags::union`] can
/// tell "not given" from "given as the default".
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub no_thumbnails: bool,
    pub perf: bool,
    pub page_size: Option<usize>,
    pub prefetch_distance: Option<usize>,
    pub columns: Option<usize>,
    pub rows: Option<usize>,
    pub latency_ms: Option<u64>,
    pub history_file: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            no_thumbnails: self.no_thumbnails || other.no_thumbnails,
            perf: self.perf || other.perf,
            page_size: other.page_size.or(self.page_size),
            prefetch_distance: other.prefetch_distance.or(self.prefetch_distance),
            columns: other.columns.or(self.columns),
            rows: other.rows.or(self.rows),
            latency_ms: other.latency_ms.or(self.latency_ms),
            history_file: other
                .history_file
                .clone()
                .or_else(|| self.history_file.clone()),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1)
    }

    pub fn prefetch_distance(&self) -> usize {
        self.prefetch_distance
            .unwrap_or(crate::ui::reconciler::DEFAULT_PREFETCH_DISTANCE)
    }

    pub fn columns(&self) -> usize {
        self.columns.unwrap_or(DEFAULT_COLUMNS).max(1)
    }

    pub fn rows(&self) -> usize {
        self.rows.unwrap_or(DEFAULT_ROWS).max(1)
    }

    pub fn latency_ms(&self) -> u64 {
        self.latency_ms.unwrap_or(0)
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("photogrid").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("photogrid")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("photogrid").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("photogrid")
                .join("config");
        }
    }

    PathBuf::from(".photogridrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".photogridrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# photogrid defaults (saved with --save)".to_string());
    if flags.no_thumbnails {
        lines.push("--no-thumbnails".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(n) = flags.page_size {
        lines.push(format!("--page-size {n}"));
    }
    if let Some(n) = flags.prefetch_distance {
        lines.push(format!("--prefetch-distance {n}"));
    }
    if let Some(n) = flags.columns {
        lines.push(format!("--columns {n}"));
    }
    if let Some(n) = flags.rows {
        lines.push(format!("--rows {n}"));
    }
    if let Some(ms) = flags.latency_ms {
        lines.push(format!("--latency-ms {ms}"));
    }
    if let Some(path) = &flags.history_file {
        lines.push(format!("--history-file {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        match name {
            "--no-thumbnails" => flags.no_thumbnails = true,
            "--perf" => flags.perf = true,
            "--page-size" => flags.page_size = take_number(tokens, &mut i, inline),
            "--prefetch-distance" => flags.prefetch_distance = take_number(tokens, &mut i, inline),
            "--columns" => flags.columns = take_number(tokens, &mut i, inline),
            "--rows" => flags.rows = take_number(tokens, &mut i, inline),
            "--latency-ms" => flags.latency_ms = take_number(tokens, &mut i, inline),
            "--history-file" => {
                flags.history_file = take_value(tokens, &mut i, inline).map(PathBuf::from);
            }
            _ => {}
        }
        i += 1;
    }
    flags
}

/// Value of an option given as `--opt value` or `--opt=value`.
fn take_value<'a>(tokens: &'a [String], i: &mut usize, inline: Option<&'a str>) -> Option<&'a str> {
    if inline.is_some() {
        return inline;
    }
    let next = tokens.get(*i + 1)?;
    *i += 1;
    Some(next.as_str())
}

fn take_number<T: std::str::FromStr>(tokens: &[String], i: &mut usize, inline: Option<&str>) -> Option<T> {
    take_value(tokens, i, inline).and_then(|v| v.parse().ok())
}
