//! Site configuration module.
//!
//! Handles loading, validating, and merging `shelfmark.toml`. Stock defaults
//! are the base layer; a user config file overrides only the keys it sets,
//! and command-line flags override the result.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! catalog_root = "calibre"  # Directory holding the catalog and book folders
//! database = "metadata.db"  # Catalog file inside catalog_root
//! output_dir = "docs"       # Where the site is written
//!
//! [site]
//! title = "Library"
//!
//! [series]
//! delimiter = "."           # Splits "Discworld.City Watch" into two levels
//!
//! [covers]
//! source_name = "cover.jpg" # Cover file inside each book folder
//! dir = "covers"            # Output subdirectory for <book id>.jpg copies
//!
//! [emit]
//! on_error = "fail"         # "fail" or "skip"
//!
//! [colors.light]          # Also [colors.dark]; each key is a --color-* property
//! background = "#fbfaf7"
//! text = "#1f1d1a"
//! muted = "#6b665e"
//! border = "#e4e0d8"
//! link = "#7a3e1d"
//! link_hover = "#4a230f"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const CONFIG_FILENAME: &str = "shelfmark.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `shelfmark.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Catalog directory: holds the database and one folder per book.
    pub catalog_root: PathBuf,
    /// Catalog database file name, relative to `catalog_root`.
    pub database: String,
    /// Output directory for pages and covers.
    pub output_dir: PathBuf,
    pub site: SiteSection,
    pub series: SeriesConfig,
    pub covers: CoversConfig,
    pub emit: EmitConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            catalog_root: PathBuf::from("calibre"),
            database: "metadata.db".to_string(),
            output_dir: PathBuf::from("docs"),
            site: SiteSection::default(),
            series: SeriesConfig::default(),
            covers: CoversConfig::default(),
            emit: EmitConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.is_empty() {
            return Err(ConfigError::Validation("database must not be empty".into()));
        }
        if self.series.delimiter.is_empty() {
            return Err(ConfigError::Validation(
                "series.delimiter must not be empty".into(),
            ));
        }
        if self.covers.source_name.is_empty() {
            return Err(ConfigError::Validation(
                "covers.source_name must not be empty".into(),
            ));
        }
        if self.covers.dir.is_empty() {
            return Err(ConfigError::Validation(
                "covers.dir must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Full path of the catalog database.
    pub fn database_path(&self) -> PathBuf {
        self.catalog_root.join(&self.database)
    }

    /// Output directory for cover copies.
    pub fn covers_dir(&self) -> PathBuf {
        self.output_dir.join(&self.covers.dir)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Shown in the `<title>` and header of every page.
    pub title: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Library".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeriesConfig {
    /// Separator between hierarchy levels in a catalog series name.
    pub delimiter: String,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            delimiter: ".".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoversConfig {
    /// Cover file name inside each book folder.
    pub source_name: String,
    /// Output subdirectory; covers land at `<output_dir>/<dir>/<book id>.jpg`.
    pub dir: String,
}

impl Default for CoversConfig {
    fn default() -> Self {
        Self {
            source_name: "cover.jpg".to_string(),
            dir: "covers".to_string(),
        }
    }
}

/// What a fan-out group does when one of its items fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Let every item finish, then fail the whole group if any item failed.
    #[default]
    Fail,
    /// Log failed items and keep going.
    Skip,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmitConfig {
    pub on_error: FailurePolicy,
}

/// Page palettes, keyed `[colors.light]` and `[colors.dark]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: Palette,
    pub dark: Palette,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: Palette::paper(),
            dark: Palette::ink(),
        }
    }
}

/// One color scheme. Each field becomes a `--color-*` custom property.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Palette {
    pub background: String,
    pub text: String,
    /// Navigation, series indices, author lines.
    pub muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
}

impl Palette {
    fn paper() -> Self {
        Self {
            background: "#fbfaf7".into(),
            text: "#1f1d1a".into(),
            muted: "#6b665e".into(),
            border: "#e4e0d8".into(),
            link: "#7a3e1d".into(),
            link_hover: "#4a230f".into(),
        }
    }

    fn ink() -> Self {
        Self {
            background: "#161412".into(),
            text: "#ece8e1".into(),
            muted: "#a39d93".into(),
            border: "#3a3631".into(),
            link: "#e0a878".into(),
            link_hover: "#f5d3b5".into(),
        }
    }

    /// `(custom property suffix, value)` in stylesheet order.
    fn properties(&self) -> [(&'static str, &str); 6] {
        [
            ("bg", self.background.as_str()),
            ("text", self.text.as_str()),
            ("text-muted", self.muted.as_str()),
            ("border", self.border.as_str()),
            ("link", self.link.as_str()),
            ("link-hover", self.link_hover.as_str()),
        ]
    }

    fn declarations(&self, indent: &str) -> String {
        self.properties()
            .iter()
            .map(|(name, value)| format!("{indent}--color-{name}: {value};\n"))
            .collect()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::paper()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Merge `overlay` on top of `base`, descending into tables.
///
/// Keys only in `base` survive; any non-table overlay value replaces what
/// was there.
pub fn merge_toml(mut base: toml::Value, overlay: toml::Value) -> toml::Value {
    merge_into(&mut base, overlay);
    base
}

fn merge_into(slot: &mut toml::Value, overlay: toml::Value) {
    match (slot, overlay) {
        (toml::Value::Table(table), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match table.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, merged over stock defaults.
///
/// A missing file is not an error: the stock defaults are returned.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `shelfmark.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Shelfmark Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Catalog directory: holds the database and one folder per book.
catalog_root = "calibre"

# Catalog database file, relative to catalog_root.
database = "metadata.db"

# Where pages and covers are written.
output_dir = "docs"

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
# Shown in the page title and header.
title = "Library"

# ---------------------------------------------------------------------------
# Series hierarchy
# ---------------------------------------------------------------------------
[series]
# A series named "Discworld.City Watch" becomes "City Watch" inside
# "Discworld". Segment names are global: every "Discworld" is the same node.
delimiter = "."

# ---------------------------------------------------------------------------
# Covers
# ---------------------------------------------------------------------------
[covers]
# Cover file inside each book folder.
source_name = "cover.jpg"

# Output subdirectory; each cover is copied to <dir>/<book id>.jpg.
dir = "covers"

# ---------------------------------------------------------------------------
# Error handling
# ---------------------------------------------------------------------------
[emit]
# "fail": a missing cover or failed page fails the run once its group ends.
# "skip": failures are logged and the run continues.
on_error = "fail"

# ---------------------------------------------------------------------------
# Colors
# ---------------------------------------------------------------------------
# Light palette; the dark one applies under prefers-color-scheme: dark.
[colors.light]
background = "#fbfaf7"
text = "#1f1d1a"
muted = "#6b665e"         # Navigation, series indices, author lines
border = "#e4e0d8"
link = "#7a3e1d"
link_hover = "#4a230f"

[colors.dark]
background = "#161412"
text = "#ece8e1"
muted = "#a39d93"
border = "#3a3631"
link = "#e0a878"
link_hover = "#f5d3b5"
"##
}

/// Render both palettes as `:root` custom properties, dark behind a media query.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        ":root {{\n{}}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{}    }}\n}}",
        colors.light.declarations("    "),
        colors.dark.declarations("        "),
    )
}
