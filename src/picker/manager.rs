use crate::config::PickerConfig;
use crate::errors::{FontError, FontResult};
use crate::fonts::{self, Catalog, CatalogSource, FontMetadata};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Callback notified with the metadata of the newly active font.
///
/// The picker compares callbacks by `Rc` identity, so hosts should keep
/// passing the same `Rc` unless they really mean to replace it.
pub type OnChange = Rc<dyn Fn(&FontMetadata)>;

/// Completion handle of [`FontManager::init`]. Dropping the sender without a
/// value counts as a failure.
pub type Initialization = oneshot::Receiver<FontResult<()>>;

/// The collaborator that owns the catalog and the active font.
pub trait FontManager {
    /// Start loading the catalog. Must not block; completion is reported
    /// through the returned handle.
    fn init(&mut self) -> Initialization;

    /// Snapshot of the current catalog.
    fn fonts(&self) -> Catalog;

    /// Make `family` the active font and notify the change callback.
    /// Activating the family that is already active is a no-op.
    fn set_active_font(&mut self, family: &str) -> FontResult<()>;

    fn set_on_change(&mut self, on_change: OnChange);

    /// Suffix appended to element ids so several pickers can share a page.
    fn selector_suffix(&self) -> &str;
}

/// [`FontManager`] backed by the Google Fonts catalog.
pub struct GoogleFontManager {
    config: PickerConfig,
    source: CatalogSource,
    catalog: Arc<Mutex<Catalog>>,
    active_font_family: String,
    on_change: OnChange,
    selector_suffix: String,
    download_dir: Option<PathBuf>,
}

impl GoogleFontManager {
    pub fn new(config: &PickerConfig, source: CatalogSource, on_change: OnChange) -> Self {
        let mut catalog = Catalog::new();
        catalog.insert(FontMetadata::bare(config.active_font_family.as_str()));

        Self {
            config: config.clone(),
            source,
            catalog: Arc::new(Mutex::new(catalog)),
            active_font_family: config.active_font_family.clone(),
            on_change,
            selector_suffix: config.selector_suffix(),
            download_dir: None,
        }
    }

    /// Download every newly activated font into `dir`.
    pub fn download_to(mut self, dir: Option<PathBuf>) -> Self {
        self.download_dir = dir;
        self
    }

    #[cfg(test)]
    pub fn active_font_family(&self) -> &str {
        &self.active_font_family
    }
}

impl FontManager for GoogleFontManager {
    fn init(&mut self) -> Initialization {
        let (tx, rx) = oneshot::channel();
        let catalog = Arc::clone(&self.catalog);
        let config = self.config.clone();
        let source = self.source.clone();
        let active = self.active_font_family.clone();

        let spawned = thread::Builder::new()
            .name("font-list".to_string())
            .spawn(move || {
                let result = fonts::load_font_list(&source).map(|list| {
                    let filtered = fonts::filter_catalog(list, &config, &active);
                    debug!(count = filtered.len(), "catalog filtered");
                    *catalog.lock().unwrap_or_else(PoisonError::into_inner) = filtered;
                });
                // The picker may already be gone.
                let _ = tx.send(result);
            });

        if let Err(e) = spawned {
            warn!(error = %e, "could not start the font list loader");
        }
        rx
    }

    fn fonts(&self) -> Catalog {
        self.catalog
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_active_font(&mut self, family: &str) -> FontResult<()> {
        if family == self.active_font_family {
            return Ok(());
        }

        let font = self
            .fonts()
            .get(family)
            .cloned()
            .ok_or_else(|| FontError::UnknownFont(family.to_string()))?;

        if let Some(dir) = &self.download_dir {
            let path = fonts::download(&font, dir)?;
            info!(family, path = %path.display(), "font downloaded");
        }

        self.active_font_family = font.family.clone();
        info!(family, "active font changed");
        (self.on_change)(&font);
        Ok(())
    }

    fn set_on_change(&mut self, on_change: OnChange) {
        self.on_change = on_change;
    }

    fn selector_suffix(&self) -> &str {
        &self.selector_suffix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Write;

    const LIST: &str = r#"{"items": [
        {"family": "Roboto", "category": "sans-serif", "subsets": ["latin"], "variants": ["regular"]},
        {"family": "Lobster", "category": "display", "subsets": ["latin"], "variants": ["regular"]}
    ]}"#;

    fn recorder() -> (OnChange, Rc<RefCell<Vec<String>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let on_change: OnChange = Rc::new(move |font: &FontMetadata| {
            sink.borrow_mut().push(font.family.clone());
        });
        (on_change, seen)
    }

    fn loaded_manager(on_change: OnChange) -> (GoogleFontManager, tempfile::NamedTempFile) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LIST.as_bytes()).unwrap();
        let config = PickerConfig {
            active_font_family: "Roboto".to_string(),
            picker_id: Some("side".to_string()),
            ..PickerConfig::default()
        };
        let source = CatalogSource::File(file.path().to_path_buf());
        let mut manager = GoogleFontManager::new(&config, source, on_change);
        let result = manager.init().blocking_recv().unwrap();
        assert!(result.is_ok());
        (manager, file)
    }

    #[test]
    fn catalog_holds_active_font_before_loading() {
        let (on_change, _) = recorder();
        let manager = GoogleFontManager::new(
            &PickerConfig::default(),
            CatalogSource::File(PathBuf::from("unused.json")),
            on_change,
        );
        let families: Vec<_> = manager.fonts().values().map(|f| f.family.clone()).collect();
        assert_eq!(families, vec!["Open Sans"]);
        assert_eq!(manager.selector_suffix(), "");
    }

    #[test]
    fn init_loads_and_filters_the_catalog() {
        let (on_change, _) = recorder();
        let (manager, _file) = loaded_manager(on_change);
        let families: Vec<_> = manager.fonts().values().map(|f| f.family.clone()).collect();
        assert_eq!(families, vec!["Roboto", "Lobster"]);
        assert_eq!(manager.selector_suffix(), "-side");
    }

    #[test]
    fn init_reports_missing_file() {
        let (on_change, _) = recorder();
        let mut manager = GoogleFontManager::new(
            &PickerConfig::default(),
            CatalogSource::File(PathBuf::from("/nonexistent/fonts.json")),
            on_change,
        );
        let result = manager.init().blocking_recv().unwrap();
        assert!(matches!(result, Err(FontError::Io(_))));
    }

    #[test]
    fn activation_notifies_once_and_is_idempotent() {
        let (on_change, seen) = recorder();
        let (mut manager, _file) = loaded_manager(on_change);
        manager.set_active_font("Lobster").unwrap();
        manager.set_active_font("Lobster").unwrap();
        assert_eq!(manager.active_font_family(), "Lobster");
        assert_eq!(*seen.borrow(), vec!["Lobster"]);
    }

    #[test]
    fn unknown_family_is_rejected_without_notifying() {
        let (on_change, seen) = recorder();
        let (mut manager, _file) = loaded_manager(on_change);
        let err = manager.set_active_font("Comic Neue").unwrap_err();
        assert!(matches!(err, FontError::UnknownFont(f) if f == "Comic Neue"));
        assert_eq!(manager.active_font_family(), "Roboto");
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn replaced_callback_receives_later_changes() {
        let (first, first_seen) = recorder();
        let (second, second_seen) = recorder();
        let (mut manager, _file) = loaded_manager(first);
        manager.set_on_change(second);
        manager.set_active_font("Lobster").unwrap();
        assert!(first_seen.borrow().is_empty());
        assert_eq!(*second_seen.borrow(), vec!["Lobster"]);
    }
}
