//! Rendered output of the picker: a plain element tree, rebuilt on every render.

use super::controller::LoadingStatus;
use super::dom::Tag;
use super::font_id;
use super::sort::SortMode;
use crate::fonts::{Catalog, FontMetadata};

/// Picker operation an interactive element triggers when activated by a
/// click or a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Toggle,
    Select,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: Tag,
    pub id: Option<String>,
    pub key: Option<String>,
    pub classes: Vec<String>,
    pub text: Option<String>,
    pub handler: Option<Handler>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            id: None,
            key: None,
            classes: Vec::new(),
            text: None,
            handler: None,
            children: Vec::new(),
        }
    }

    pub fn div() -> Self {
        Self::new(Tag::Div)
    }

    pub fn button() -> Self {
        Self::new(Tag::Button)
    }

    pub fn paragraph() -> Self {
        Self::new(Tag::Paragraph)
    }

    pub fn list() -> Self {
        Self::new(Tag::List)
    }

    pub fn list_item() -> Self {
        Self::new(Tag::ListItem)
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn class_if(self, condition: bool, class: &str) -> Self {
        if condition {
            self.class(class)
        } else {
            self
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn on_activate(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Depth-first, pre-order walk over the element and its descendants.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(el) = stack.pop() {
            out.push(el);
            stack.extend(el.children.iter().rev());
        }
        out
    }

    #[cfg(test)]
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.descendants()
            .into_iter()
            .find(|el| el.id.as_deref() == Some(id))
    }
}

/// Everything a render reads.
pub struct RenderInput<'a> {
    pub selector_suffix: &'a str,
    pub active_font_family: &'a str,
    pub expanded: bool,
    pub loading_status: LoadingStatus,
    pub sort: SortMode,
    pub catalog: &'a Catalog,
}

pub fn root_id(selector_suffix: &str) -> String {
    format!("font-picker{selector_suffix}")
}

pub fn font_button_id(family: &str, selector_suffix: &str) -> String {
    format!("font-button-{}{selector_suffix}", font_id(family))
}

/// Render the whole widget. The root and the toggle button are always
/// present; the list only once loading has finished.
pub fn render(input: &RenderInput<'_>) -> Element {
    let toggle = Element::button()
        .class("dropdown-button")
        .on_activate(Handler::Toggle)
        .child(
            Element::paragraph()
                .class("dropdown-font-family")
                .text(input.active_font_family),
        )
        .child(
            Element::paragraph()
                .class("dropdown-icon")
                .class(input.loading_status.as_str()),
        );

    Element::div()
        .id(root_id(input.selector_suffix))
        .class("font-picker")
        .class_if(input.expanded, "expanded")
        .child(toggle)
        .child(font_list(input))
}

fn font_list(input: &RenderInput<'_>) -> Element {
    if input.loading_status != LoadingStatus::Finished {
        return Element::div();
    }

    let mut fonts: Vec<&FontMetadata> = input.catalog.values().collect();
    input.sort.sort(&mut fonts);

    Element::list().class("font-list").children(fonts.into_iter().map(|font| {
        let is_active = font.family == input.active_font_family;
        Element::list_item()
            .key(font_id(&font.family))
            .class("font-list-item")
            .child(
                Element::button()
                    .id(font_button_id(&font.family, input.selector_suffix))
                    .class("font-button")
                    .class_if(is_active, "active-font")
                    .text(font.family.as_str())
                    .on_activate(Handler::Select),
            )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(names: &[&str]) -> Catalog {
        names.iter().map(|n| FontMetadata::bare(*n)).collect()
    }

    fn input<'a>(catalog: &'a Catalog, status: LoadingStatus) -> RenderInput<'a> {
        RenderInput {
            selector_suffix: "",
            active_font_family: "Open Sans",
            expanded: false,
            loading_status: status,
            sort: SortMode::Alphabet,
            catalog,
        }
    }

    fn buttons(view: &Element) -> Vec<&Element> {
        view.descendants()
            .into_iter()
            .filter(|el| el.has_class("font-button"))
            .collect()
    }

    #[test]
    fn placeholder_until_finished() {
        let fonts = catalog(&["Abel"]);
        for status in [LoadingStatus::Loading, LoadingStatus::Error] {
            let view = render(&input(&fonts, status));
            assert_eq!(view.children.len(), 2);
            assert_eq!(view.children[1], Element::div());
            assert!(buttons(&view).is_empty());
        }
    }

    #[test]
    fn icon_carries_loading_status() {
        let fonts = catalog(&[]);
        let view = render(&input(&fonts, LoadingStatus::Error));
        let icon = view
            .descendants()
            .into_iter()
            .find(|el| el.has_class("dropdown-icon"))
            .unwrap();
        assert!(icon.has_class("error"));
    }

    #[test]
    fn list_items_are_addressed_by_font_id() {
        let fonts = catalog(&["Zilla Slab", "Abel", "Open Sans"]);
        let mut render_input = input(&fonts, LoadingStatus::Finished);
        render_input.selector_suffix = "-main";
        let view = render(&render_input);
        assert_eq!(view.id.as_deref(), Some("font-picker-main"));

        let list = &view.children[1];
        let keys: Vec<_> = list.children.iter().map(|li| li.key.as_deref().unwrap()).collect();
        assert_eq!(keys, vec!["abel", "open-sans", "zilla-slab"]);

        let ids: Vec<_> = buttons(&view).iter().map(|b| b.id.clone().unwrap()).collect();
        assert_eq!(
            ids,
            vec!["font-button-abel-main", "font-button-open-sans-main", "font-button-zilla-slab-main"]
        );
    }

    #[test]
    fn active_marker_uses_exact_family() {
        let fonts = catalog(&["Open Sans", "open sans"]);
        let view = render(&input(&fonts, LoadingStatus::Finished));
        let active: Vec<_> = buttons(&view)
            .into_iter()
            .filter(|b| b.has_class("active-font"))
            .map(|b| b.text.clone().unwrap())
            .collect();
        assert_eq!(active, vec!["Open Sans"]);
    }

    #[test]
    fn expanded_marker_on_root() {
        let fonts = catalog(&[]);
        let mut render_input = input(&fonts, LoadingStatus::Loading);
        assert!(!render(&render_input).has_class("expanded"));
        render_input.expanded = true;
        assert!(render(&render_input).has_class("expanded"));
    }
}
