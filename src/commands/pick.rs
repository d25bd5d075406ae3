use crate::config::{persist_active_family, PickerArgs, Settings};
use crate::fonts::FontMetadata;
use crate::logging::{self, LogTarget};
use crate::picker::{Document, FontPicker, GoogleFontManager, OnChange, PickerProps};
use crate::tui;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{info, warn};

pub fn run(args: PickerArgs) {
    if let Err(e) = run_inner(args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run_inner(args: PickerArgs) -> Result<(), String> {
    let settings = args.resolve().map_err(|e| e.to_string())?;
    logging::init(LogTarget::file_or_default(settings.log_file.clone()))?;
    info!(font = %settings.picker.active_font_family, "starting picker");

    // Filled by the manager's change callback, drained after each event.
    let chosen: Rc<RefCell<Option<String>>> = Rc::default();
    let on_change: OnChange = {
        let chosen = Rc::clone(&chosen);
        Rc::new(move |font: &FontMetadata| {
            *chosen.borrow_mut() = Some(font.family.clone());
        })
    };

    let manager = GoogleFontManager::new(&settings.picker, settings.source.clone(), Rc::clone(&on_change))
        .download_to(settings.download_dir.clone());
    let document = Rc::new(RefCell::new(Document::new()));
    let props = PickerProps {
        active_font_family: settings.picker.active_font_family.clone(),
        on_change,
        sort: settings.picker.sort,
    };
    let mut picker = FontPicker::new(manager, props, Rc::clone(&document));

    tui::run_picker(&mut picker, &document, |picker| {
        let Some(family) = chosen.borrow_mut().take() else {
            return;
        };
        apply_choice(picker, &settings, family);
    })
    .map_err(|e| format!("Terminal error: {e}"))?;

    let family = picker.props().active_font_family.clone();
    drop(picker);
    info!(font = %family, "picker closed");
    tui::print_confirm("Active font:", &family)
}

/// Feed a family reported by the change callback back in as the new prop,
/// and save it when `--save` was given.
fn apply_choice(picker: &mut FontPicker<GoogleFontManager>, settings: &Settings, family: String) {
    let next = PickerProps {
        active_font_family: family.clone(),
        ..picker.props().clone()
    };
    if let Err(e) = picker.update(next) {
        warn!(error = %e, "could not apply chosen font");
    }

    if let Some(path) = &settings.save_to {
        if let Err(e) = persist_active_family(path, &family) {
            warn!(error = %e, "could not save chosen font");
        }
    }
}
