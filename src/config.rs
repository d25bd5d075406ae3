//! Picker configuration: defaults, the `fontpick.toml` file and CLI flags.
//!
//! Values are resolved in this order: command-line flag, config file,
//! environment (API key only), built-in default.

use crate::errors::ConfigError;
use crate::fonts::{CatalogSource, DEFAULT_FONT};
use crate::picker::SortMode;
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "fontpick.toml";
pub const API_KEY_ENV: &str = "FONTPICK_API_KEY";
pub const DEFAULT_SCRIPTS: &[&str] = &["latin"];
pub const DEFAULT_VARIANTS: &[&str] = &["regular"];
pub const DEFAULT_LIMIT: usize = 50;

/// Immutable configuration of one picker instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerConfig {
    pub api_key: String,
    pub active_font_family: String,
    /// Distinguishes element ids when several pickers share a page.
    pub picker_id: Option<String>,
    pub families: Vec<String>,
    pub categories: Vec<String>,
    pub scripts: Vec<String>,
    pub variants: Vec<String>,
    pub limit: usize,
    pub sort: SortMode,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            active_font_family: DEFAULT_FONT.to_string(),
            picker_id: None,
            families: Vec::new(),
            categories: Vec::new(),
            scripts: to_strings(DEFAULT_SCRIPTS),
            variants: to_strings(DEFAULT_VARIANTS),
            limit: DEFAULT_LIMIT,
            sort: SortMode::default(),
        }
    }
}

impl PickerConfig {
    /// `-<picker id>`, or empty without an id.
    pub fn selector_suffix(&self) -> String {
        self.picker_id
            .as_deref()
            .map(|id| format!("-{id}"))
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(id) = &self.picker_id {
            if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ConfigError::InvalidPickerId(id.clone()));
            }
        }
        Ok(())
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Options shared by `fontpick pick` and `fontpick list`.
#[derive(Args, Debug, Default, Clone)]
pub struct PickerArgs {
    /// Config file (defaults to ./fontpick.toml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Google Fonts Developer API key.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Read the font list from a JSON file in the Google Fonts API format.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Initially active font family.
    #[arg(long = "font")]
    pub active_font_family: Option<String>,

    /// Picker id, letters and digits only.
    #[arg(long)]
    pub picker_id: Option<String>,

    /// Only list these families (comma separated).
    #[arg(long = "family", value_delimiter = ',')]
    pub families: Vec<String>,

    /// Only list these categories, e.g. serif,monospace.
    #[arg(long = "category", value_delimiter = ',')]
    pub categories: Vec<String>,

    /// Required scripts [default: latin].
    #[arg(long = "script", value_delimiter = ',')]
    pub scripts: Vec<String>,

    /// Required variants [default: regular].
    #[arg(long = "variant", value_delimiter = ',')]
    pub variants: Vec<String>,

    /// Maximum number of fonts in the list [default: 50].
    #[arg(long)]
    pub limit: Option<usize>,

    /// List order [default: alphabet].
    #[arg(long, value_enum)]
    pub sort: Option<SortMode>,

    /// Download each selected font into this directory.
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// Write the chosen font back to the config file.
    #[arg(long)]
    pub save: bool,

    /// Log file of the interactive picker.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub picker: PickerConfig,
    pub source: CatalogSource,
    pub download_dir: Option<PathBuf>,
    /// Config file the chosen font is saved to, when `--save` was given.
    pub save_to: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

/// Values found in the config file. `None` means "not set".
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub catalog: Option<PathBuf>,
    pub active_font_family: Option<String>,
    pub picker_id: Option<String>,
    pub families: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub scripts: Option<Vec<String>>,
    pub variants: Option<Vec<String>>,
    pub limit: Option<usize>,
    pub sort: Option<SortMode>,
}

impl PickerArgs {
    pub fn resolve(self) -> Result<Settings, ConfigError> {
        let env_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        self.resolve_with_env(env_key)
    }

    fn resolve_with_env(self, env_api_key: Option<String>) -> Result<Settings, ConfigError> {
        let config_path = match &self.config {
            Some(path) => Some(path.clone()),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
        };
        let file = match &config_path {
            Some(path) => load_file_config(path)?,
            None => FileConfig::default(),
        };

        let defaults = PickerConfig::default();
        let picker = PickerConfig {
            api_key: self
                .api_key
                .or(file.api_key)
                .or(env_api_key)
                .unwrap_or_default(),
            active_font_family: self
                .active_font_family
                .or(file.active_font_family)
                .unwrap_or(defaults.active_font_family),
            picker_id: self.picker_id.or(file.picker_id),
            families: non_empty(self.families).or(file.families).unwrap_or_default(),
            categories: non_empty(self.categories).or(file.categories).unwrap_or_default(),
            scripts: non_empty(self.scripts).or(file.scripts).unwrap_or(defaults.scripts),
            variants: non_empty(self.variants).or(file.variants).unwrap_or(defaults.variants),
            limit: self.limit.or(file.limit).unwrap_or(defaults.limit),
            sort: self.sort.or(file.sort).unwrap_or(defaults.sort),
        };
        picker.validate()?;

        let source = match self.catalog.or(file.catalog) {
            Some(path) => CatalogSource::File(path),
            None if !picker.api_key.is_empty() => CatalogSource::Api {
                api_key: picker.api_key.clone(),
            },
            None => return Err(ConfigError::MissingApiKey),
        };

        let save_to = if self.save {
            Some(config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)))
        } else {
            None
        };

        Ok(Settings {
            picker,
            source,
            download_dir: self.download_dir,
            save_to,
            log_file: self.log_file,
        })
    }
}

fn non_empty(list: Vec<String>) -> Option<Vec<String>> {
    if list.is_empty() {
        None
    } else {
        Some(list)
    }
}

pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded config file");
    parse_file_config(path, &text)
}

pub fn parse_file_config(path: &Path, text: &str) -> Result<FileConfig, ConfigError> {
    let doc: toml_edit::DocumentMut = text.parse().map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let invalid = |key: &str, expected: &'static str| ConfigError::InvalidValue {
        path: path.to_path_buf(),
        key: key.to_string(),
        expected,
    };

    let string = |key: &str| -> Result<Option<String>, ConfigError> {
        match doc.get(key) {
            None => Ok(None),
            Some(item) => item
                .as_str()
                .map(|s| Some(s.to_string()))
                .ok_or_else(|| invalid(key, "a string")),
        }
    };

    let list = |key: &str| -> Result<Option<Vec<String>>, ConfigError> {
        let Some(item) = doc.get(key) else {
            return Ok(None);
        };
        let array = item.as_array().ok_or_else(|| invalid(key, "an array of strings"))?;
        array
            .iter()
            .map(|v| {
                v.as_str()
                    .map(|s| s.to_string())
                    .ok_or_else(|| invalid(key, "an array of strings"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    };

    let limit = match doc.get("limit") {
        None => None,
        Some(item) => {
            let value = item
                .as_integer()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid("limit", "a positive integer"))?;
            Some(usize::try_from(value).map_err(|_| invalid("limit", "a positive integer"))?)
        }
    };

    let sort = match string("sort")? {
        None => None,
        Some(s) => Some(
            s.parse::<SortMode>()
                .map_err(|_| invalid("sort", "\"alphabet\" or \"popularity\""))?,
        ),
    };

    Ok(FileConfig {
        api_key: string("api_key")?,
        catalog: string("catalog")?.map(PathBuf::from),
        active_font_family: string("active_font_family")?,
        picker_id: string("picker_id")?,
        families: list("families")?,
        categories: list("categories")?,
        scripts: list("scripts")?,
        variants: list("variants")?,
        limit,
        sort,
    })
}

/// Store `family` as `active_font_family` in the config file, keeping the
/// rest of the file (comments included) untouched. Creates the file if needed.
pub fn persist_active_family(path: &Path, family: &str) -> Result<(), ConfigError> {
    let text = if path.exists() {
        fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        String::new()
    };

    let mut doc: toml_edit::DocumentMut = text.parse().map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    doc["active_font_family"] = toml_edit::value(family);

    fs::write(path, doc.to_string()).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), family, "saved active font");
    Ok(())
}
