use crate::config::PickerArgs;
use crate::fonts::{Catalog, FontMetadata};
use crate::logging::{self, LogTarget};
use crate::picker::{Document, Element, FontManager, FontPicker, GoogleFontManager, LoadingStatus, OnChange, PickerProps};
use std::cell::RefCell;
use std::rc::Rc;

pub fn run(args: PickerArgs, json: bool) {
    if let Err(e) = run_inner(args, json) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run_inner(args: PickerArgs, json: bool) -> Result<(), String> {
    let settings = args.resolve().map_err(|e| e.to_string())?;
    logging::init(LogTarget::Stderr)?;

    let on_change: OnChange = Rc::new(|_: &FontMetadata| {});
    let manager = GoogleFontManager::new(&settings.picker, settings.source.clone(), Rc::clone(&on_change));
    let props = PickerProps {
        active_font_family: settings.picker.active_font_family.clone(),
        on_change,
        sort: settings.picker.sort,
    };
    let mut picker = FontPicker::new(manager, props, Rc::new(RefCell::new(Document::new())));

    if picker.wait_for_initialization() != LoadingStatus::Finished {
        return Err("Could not load the font list.".to_string());
    }

    let view = picker.render();
    if json {
        let catalog = picker.manager().fonts();
        let fonts = listed_fonts(&view, &catalog);
        let out = serde_json::to_string_pretty(&fonts).map_err(|e| format!("Failed to encode font list: {e}"))?;
        println!("{out}");
    } else {
        for line in listing(&view) {
            println!("{line}");
        }
    }
    Ok(())
}

fn font_buttons(view: &Element) -> impl Iterator<Item = &Element> {
    view.descendants().into_iter().filter(|e| e.has_class("font-button"))
}

/// One line per listed font, in list order: active marker, family, element id.
fn listing(view: &Element) -> Vec<String> {
    font_buttons(view)
        .map(|button| {
            let marker = if button.has_class("active-font") { '*' } else { ' ' };
            format!(
                "{marker} {:<32} {}",
                button.text.as_deref().unwrap_or_default(),
                button.id.as_deref().unwrap_or_default()
            )
        })
        .collect()
}

fn listed_fonts<'a>(view: &Element, catalog: &'a Catalog) -> Vec<&'a FontMetadata> {
    font_buttons(view)
        .filter_map(|button| button.text.as_deref().and_then(|family| catalog.get(family)))
        .collect()
}
