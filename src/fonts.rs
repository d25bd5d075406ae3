//! Google Fonts catalog: loading, filtering and downloading.
//!
//! The catalog comes either from the Google Fonts Developer API or from a
//! local JSON file with the same shape, so the picker also works offline.

use crate::config::PickerConfig;
use crate::errors::{FontError, FontResult};
use crate::picker::font_id;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const GOOGLE_FONTS_API: &str = "https://www.googleapis.com/webfonts/v1/webfonts";

pub const DEFAULT_FONT: &str = "Open Sans";

const LIST_SIZE_LIMIT: u64 = 32 * 1024 * 1024;
const FONT_SIZE_LIMIT: u64 = 16 * 1024 * 1024;

/// One family of the catalog, as described by the Google Fonts API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontMetadata {
    pub family: String,
    #[serde(default)]
    pub category: String,
    /// Scripts the family supports (`subsets` in the API).
    #[serde(default, rename = "subsets")]
    pub scripts: Vec<String>,
    #[serde(default)]
    pub variants: Vec<String>,
    /// Variant name -> font file URL.
    #[serde(default)]
    pub files: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl FontMetadata {
    /// A catalog entry that only knows its family name.
    pub fn bare(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            category: String::new(),
            scripts: Vec::new(),
            variants: Vec::new(),
            files: BTreeMap::new(),
            version: None,
            last_modified: None,
        }
    }
}

#[derive(Deserialize)]
struct WebfontList {
    #[serde(default)]
    items: Vec<FontMetadata>,
}

/// Ordered mapping from family name to metadata.
///
/// Iteration follows insertion order, which for Google Fonts is popularity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    fonts: Vec<FontMetadata>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn get(&self, family: &str) -> Option<&FontMetadata> {
        self.fonts.iter().find(|f| f.family == family)
    }

    /// Insert a font, replacing an existing entry of the same family in place.
    pub fn insert(&mut self, font: FontMetadata) {
        match self.fonts.iter_mut().find(|f| f.family == font.family) {
            Some(existing) => *existing = font,
            None => self.fonts.push(font),
        }
    }

    pub fn values(&self) -> impl Iterator<Item = &FontMetadata> {
        self.fonts.iter()
    }
}

impl FromIterator<FontMetadata> for Catalog {
    fn from_iter<I: IntoIterator<Item = FontMetadata>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for font in iter {
            catalog.insert(font);
        }
        catalog
    }
}

/// Where the unfiltered font list is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Api { api_key: String },
    File(PathBuf),
}

/// Load the full font list, most popular first.
pub fn load_font_list(source: &CatalogSource) -> FontResult<Vec<FontMetadata>> {
    let json = match source {
        CatalogSource::Api { api_key } => fetch_font_list(api_key)?,
        CatalogSource::File(path) => {
            debug!(path = %path.display(), "reading font list from file");
            fs::read_to_string(path)?
        }
    };
    let fonts = parse_font_list(&json)?;
    info!(count = fonts.len(), "font list loaded");
    Ok(fonts)
}

fn fetch_font_list(api_key: &str) -> FontResult<String> {
    debug!(url = GOOGLE_FONTS_API, "fetching font list");
    let response = ureq::get(GOOGLE_FONTS_API)
        .query("sort", "popularity")
        .query("key", api_key)
        .call()
        .map_err(FontError::from_request)?;

    let body = response
        .into_body()
        .with_config()
        .limit(LIST_SIZE_LIMIT)
        .read_to_string()?;
    Ok(body)
}

pub fn parse_font_list(json: &str) -> FontResult<Vec<FontMetadata>> {
    let list: WebfontList = serde_json::from_str(json)?;
    Ok(list.items)
}

/// Whether a font passes the configured family, category, script and variant
/// filters. Empty family/category lists do not restrict; every requested
/// script and variant must be supported.
pub fn matches_filter(font: &FontMetadata, config: &PickerConfig) -> bool {
    (config.families.is_empty() || config.families.contains(&font.family))
        && (config.categories.is_empty() || config.categories.contains(&font.category))
        && config.scripts.iter().all(|s| font.scripts.contains(s))
        && config.variants.iter().all(|v| font.variants.contains(v))
}

/// Build the picker catalog from the full list.
///
/// The active family always comes first, even when the filters would drop it
/// or the list does not know it, followed by matching fonts in list order
/// until `limit` entries are collected.
pub fn filter_catalog(fonts: Vec<FontMetadata>, config: &PickerConfig, active_family: &str) -> Catalog {
    let mut catalog = Catalog::new();
    match fonts.iter().find(|f| f.family == active_family) {
        Some(active) => catalog.insert(active.clone()),
        None => catalog.insert(FontMetadata::bare(active_family)),
    }

    for font in fonts {
        if catalog.len() >= config.limit {
            break;
        }
        if font.family != active_family && matches_filter(&font, config) {
            catalog.insert(font);
        }
    }
    catalog
}

/// Download the regular variant (or the first one listed) into `dir`.
/// Returns the path of the written file.
pub fn download(font: &FontMetadata, dir: &Path) -> FontResult<PathBuf> {
    let url = font
        .files
        .get("regular")
        .or_else(|| font.variants.iter().find_map(|v| font.files.get(v)))
        .or_else(|| font.files.values().next())
        .ok_or_else(|| FontError::MissingFile(font.family.clone()))?;

    let extension = Path::new(url)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("ttf");
    let dest = dir.join(format!("{}.{extension}", font_id(&font.family)));

    info!(family = %font.family, dest = %dest.display(), "downloading font");
    let bytes = ureq::get(url.as_str())
        .call()
        .map_err(FontError::from_request)?
        .into_body()
        .with_config()
        .limit(FONT_SIZE_LIMIT)
        .read_to_vec()?;

    fs::create_dir_all(dir)?;
    fs::write(&dest, bytes)?;
    Ok(dest)
}
