//! `multipick.toml` handling.
//!
//! ```toml
//! [match]
//! keys = ["name", "value"]
//! case = "smart"
//! threshold = 0
//! limit = 200
//!
//! [view]
//! rows = 10
//! row_height = 1
//! overscan = 3
//!
//! [display]
//! prompt = "Select:"
//! placeholder = "Add place..."
//! ```

use crate::error::{Error, Result};
use crate::filter::{CaseMatching, MatchKey, MatchOptions};
use crate::window::{ViewWindow, DEFAULT_OVERSCAN};
use std::fs;
use std::path::Path;
use toml_edit::{DocumentMut, Item as TomlItem};

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "multipick.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    /// Viewport height in rows.
    pub rows: usize,
    pub row_height: usize,
    pub overscan: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            rows: 10,
            row_height: 1,
            overscan: DEFAULT_OVERSCAN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    pub prompt: String,
    pub placeholder: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            prompt: "Select:".to_string(),
            placeholder: "Add place...".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub match_options: MatchOptions,
    pub view: ViewConfig,
    pub display: DisplayConfig,
}

impl Config {
    /// Load `path`, or `multipick.toml` if it exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Path::new(DEFAULT_CONFIG_FILE),
            None => return Ok(Config::default()),
        };
        let text = fs::read_to_string(path)?;
        let config = Config::parse(&text)?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let doc: DocumentMut = text.parse()?;
        let mut config = Config::default();

        if let Some(m) = doc.get("match") {
            if let Some(keys) = m.get("keys") {
                config.match_options.keys = parse_keys(keys)?;
            }
            if let Some(case) = opt_str(m, "match.case")? {
                config.match_options.case = match case {
                    "smart" => CaseMatching::Smart,
                    "ignore" => CaseMatching::Ignore,
                    "respect" => CaseMatching::Respect,
                    other => {
                        return Err(Error::Config(format!(
                            "`match.case` must be \"smart\", \"ignore\" or \"respect\", got \"{other}\""
                        )))
                    }
                };
            }
            if let Some(threshold) = opt_int(m, "match.threshold")? {
                config.match_options.threshold = Some(threshold);
            }
            if let Some(limit) = opt_usize(m, "match.limit")? {
                config.match_options.limit = Some(limit);
            }
        }

        if let Some(v) = doc.get("view") {
            if let Some(rows) = opt_usize(v, "view.rows")? {
                if rows == 0 {
                    return Err(Error::Config("`view.rows` must be at least 1".to_string()));
                }
                config.view.rows = rows;
            }
            if let Some(row_height) = opt_usize(v, "view.row_height")? {
                config.view.row_height = row_height.max(1);
            }
            if let Some(overscan) = opt_usize(v, "view.overscan")? {
                config.view.overscan = overscan;
            }
            if config.view.rows.checked_mul(config.view.row_height).is_none() {
                return Err(Error::Config(
                    "`view.rows` * `view.row_height` is too large".to_string(),
                ));
            }
        }

        if let Some(d) = doc.get("display") {
            if let Some(prompt) = opt_str(d, "display.prompt")? {
                config.display.prompt = prompt.to_string();
            }
            if let Some(placeholder) = opt_str(d, "display.placeholder")? {
                config.display.placeholder = placeholder.to_string();
            }
        }

        Ok(config)
    }

    pub fn window(&self) -> ViewWindow {
        let height = self.view.rows.max(1).saturating_mul(self.view.row_height);
        ViewWindow::new(height, self.view.row_height)
            .with_overscan(self.view.overscan)
    }
}

fn leaf(dotted: &str) -> &str {
    dotted.rsplit('.').next().unwrap_or(dotted)
}

fn opt_str<'a>(table: &'a TomlItem, dotted: &str) -> Result<Option<&'a str>> {
    match table.get(leaf(dotted)) {
        None => Ok(None),
        Some(v) => v
            .as_str()
            .map(Some)
            .ok_or_else(|| Error::Config(format!("`{dotted}` must be a string"))),
    }
}

fn opt_int(table: &TomlItem, dotted: &str) -> Result<Option<i64>> {
    match table.get(leaf(dotted)) {
        None => Ok(None),
        Some(v) => v
            .as_integer()
            .map(Some)
            .ok_or_else(|| Error::Config(format!("`{dotted}` must be an integer"))),
    }
}

fn opt_usize(table: &TomlItem, dotted: &str) -> Result<Option<usize>> {
    match opt_int(table, dotted)? {
        None => Ok(None),
        Some(n) => usize::try_from(n)
            .map(Some)
            .map_err(|_| Error::Config(format!("`{dotted}` must not be negative"))),
    }
}

fn parse_keys(item: &TomlItem) -> Result<Vec<MatchKey>> {
    let array = item
        .as_array()
        .ok_or_else(|| Error::Config("`match.keys` must be an array".to_string()))?;
    array
        .iter()
        .map(|v| match v.as_str() {
            Some("name") => Ok(MatchKey::Name),
            Some("value") => Ok(MatchKey::Value),
            _ => Err(Error::Config(format!(
                "`match.keys` entries must be \"name\" or \"value\", got {}",
                v.to_string().trim()
            ))),
        })
        .collect()
}
