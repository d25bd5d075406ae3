//! The font picker widget: a collapsible dropdown over the font catalog.
//!
//! [`FontPicker`] owns the expansion and loading state and talks to a
//! [`FontManager`], which owns the catalog and the active font. Rendering
//! produces an [`Element`] tree that hosts mount into a [`Document`].

pub mod controller;
pub mod dom;
mod font_id;
pub mod manager;
pub mod sort;
#[cfg(test)]
pub(crate) mod testing;
pub mod view;

pub use controller::{FontPicker, LoadingStatus, PickerProps};
pub use dom::{Document, ListenerId, NodeId, Tag, UiEvent};
pub use font_id::font_id;
pub use manager::{FontManager, GoogleFontManager, Initialization, OnChange};
pub use sort::SortMode;
pub use view::{Element, Handler};
