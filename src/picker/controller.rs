use super::dom::{Document, ListenerId, UiEvent};
use super::manager::{FontManager, Initialization, OnChange};
use super::sort::SortMode;
use super::view::{self, Element, Handler, RenderInput};
use crate::errors::{FontError, FontResult};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, error, warn};

const INIT_FAILED: &str = "Error trying to fetch the list of available fonts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingStatus {
    Loading,
    Finished,
    Error,
}

impl LoadingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LoadingStatus::Loading => "loading",
            LoadingStatus::Finished => "finished",
            LoadingStatus::Error => "error",
        }
    }
}

/// Inputs the host may change between renders.
#[derive(Clone)]
pub struct PickerProps {
    pub active_font_family: String,
    pub on_change: OnChange,
    pub sort: SortMode,
}

impl fmt::Debug for PickerProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickerProps")
            .field("active_font_family", &self.active_font_family)
            .field("sort", &self.sort)
            .finish_non_exhaustive()
    }
}

/// Controller of one picker instance.
///
/// Invariant: a document click listener is registered exactly while the
/// picker is expanded. It is released again on collapse and on drop.
pub struct FontPicker<M: FontManager> {
    manager: M,
    props: PickerProps,
    document: Rc<RefCell<Document>>,
    expanded: bool,
    loading_status: LoadingStatus,
    pending_init: Option<Initialization>,
    click_listener: Option<ListenerId>,
}

impl<M: FontManager> FontPicker<M> {
    /// Take ownership of `manager` and start loading its catalog.
    pub fn new(mut manager: M, props: PickerProps, document: Rc<RefCell<Document>>) -> Self {
        let pending_init = Some(manager.init());
        Self {
            manager,
            props,
            document,
            expanded: false,
            loading_status: LoadingStatus::Loading,
            pending_init,
            click_listener: None,
        }
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut M {
        &mut self.manager
    }

    pub fn props(&self) -> &PickerProps {
        &self.props
    }

    pub fn expanded(&self) -> bool {
        self.expanded
    }

    pub fn loading_status(&self) -> LoadingStatus {
        self.loading_status
    }

    pub fn click_listener(&self) -> Option<ListenerId> {
        self.click_listener
    }

    /// Id of the root element, unique per picker instance.
    pub fn root_id(&self) -> String {
        view::root_id(self.manager.selector_suffix())
    }

    /// Check whether initialization has completed, without blocking.
    pub fn poll_initialization(&mut self) -> LoadingStatus {
        if let Some(pending) = self.pending_init.as_mut() {
            match pending.try_recv() {
                Ok(result) => self.finish_initialization(result),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Closed) => self.finish_initialization(Err(FontError::LoaderGone)),
            }
        }
        self.loading_status
    }

    /// Block until initialization has completed.
    pub fn wait_for_initialization(&mut self) -> LoadingStatus {
        if let Some(pending) = self.pending_init.take() {
            let result = pending.blocking_recv().unwrap_or(Err(FontError::LoaderGone));
            self.finish_initialization(result);
        }
        self.loading_status
    }

    fn finish_initialization(&mut self, result: FontResult<()>) {
        self.pending_init = None;
        match result {
            Ok(()) => {
                debug!(picker = %self.root_id(), "fonts loaded");
                self.loading_status = LoadingStatus::Finished;
            }
            Err(e) => {
                error!(error = %e, "{INIT_FAILED}");
                self.loading_status = LoadingStatus::Error;
            }
        }
    }

    /// Reconcile new props with the previous ones: a changed active family is
    /// pushed into the manager, a changed callback (by `Rc` identity) replaces
    /// the manager's one.
    pub fn update(&mut self, next: PickerProps) -> FontResult<()> {
        let previous = std::mem::replace(&mut self.props, next);

        let mut result = Ok(());
        if previous.active_font_family != self.props.active_font_family {
            let family = self.props.active_font_family.clone();
            result = self.set_active_font_family(&family);
        }
        if !Rc::ptr_eq(&previous.on_change, &self.props.on_change) {
            self.manager.set_on_change(Rc::clone(&self.props.on_change));
        }
        result
    }

    /// Ask the manager to activate `family`. Membership in the catalog is
    /// left to the manager.
    pub fn set_active_font_family(&mut self, family: &str) -> FontResult<()> {
        self.manager.set_active_font(family).inspect_err(|e| {
            warn!(family, error = %e, "could not activate font");
        })
    }

    /// Run the handler an element was rendered with.
    pub fn dispatch(&mut self, handler: Handler, event: &UiEvent) -> FontResult<()> {
        match handler {
            Handler::Toggle => {
                self.toggle_expanded();
                Ok(())
            }
            Handler::Select => self.on_selection(event),
        }
    }

    /// Activate the family named by the event target's text, then collapse.
    /// The collapse happens even when activation fails.
    pub fn on_selection(&mut self, event: &UiEvent) -> FontResult<()> {
        let family = self.document.borrow().text_content(event.target);
        let result = self.set_active_font_family(&family);
        self.set_expanded(false);
        result
    }

    pub fn toggle_expanded(&mut self) {
        self.set_expanded(!self.expanded);
    }

    fn set_expanded(&mut self, expanded: bool) {
        if expanded == self.expanded {
            return;
        }
        let mut document = self.document.borrow_mut();
        if expanded {
            self.click_listener = Some(document.add_click_listener(true));
        } else if let Some(listener) = self.click_listener.take() {
            document.remove_click_listener(listener);
        }
        self.expanded = expanded;
        debug!(expanded, "picker toggled");
    }

    /// Document-wide click: collapse unless the target lies inside the root.
    pub fn on_document_click(&mut self, event: &UiEvent) {
        if !self.expanded {
            return;
        }
        let root_id = self.root_id();
        let inside = {
            let document = self.document.borrow();
            document
                .ancestors(event.target)
                .any(|n| document.node(n).and_then(|node| node.id.as_deref()) == Some(root_id.as_str()))
        };
        if !inside {
            self.toggle_expanded();
        }
    }

    /// Render from the current props, state and a fresh catalog snapshot.
    pub fn render(&self) -> Element {
        let catalog = self.manager.fonts();
        view::render(&RenderInput {
            selector_suffix: self.manager.selector_suffix(),
            active_font_family: &self.props.active_font_family,
            expanded: self.expanded,
            loading_status: self.loading_status,
            sort: self.props.sort,
            catalog: &catalog,
        })
    }
}

impl<M: FontManager> Drop for FontPicker<M> {
    fn drop(&mut self) {
        if let Some(listener) = self.click_listener.take() {
            match self.document.try_borrow_mut() {
                Ok(mut document) => {
                    document.remove_click_listener(listener);
                }
                Err(_) => warn!(?listener, "document busy, click listener not released"),
            }
        }
    }
}
