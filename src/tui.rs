//! Terminal host for the font picker, built on crossterm.
//!
//! The picker's rendered element tree is mounted into a [`Document`] and
//! drawn one element per row. Mouse clicks are hit-tested against those rows
//! and delivered like page clicks: capturing document listeners first, then
//! the nearest handler of the target. Tab and Shift-Tab move focus between
//! interactive elements; Enter or Space activates the focused one.

use crate::errors::FontResult;
use crate::picker::{Document, Element, FontManager, FontPicker, LoadingStatus, NodeId, Tag, UiEvent};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind},
    style::{self, Stylize},
    terminal, ExecutableCommand, QueueableCommand,
};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

const TICK: Duration = Duration::from_millis(100);
const TITLE: &str = "Choose a font";
const HELP: &str = "Tab: move focus  Enter/Space or click: activate  q: quit";

/// Raw mode, alternate screen and mouse capture, undone on drop.
struct RawGuard;

impl RawGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = RawGuard;
        let mut out = io::stdout();
        out.execute(terminal::EnterAlternateScreen)?;
        out.execute(event::EnableMouseCapture)?;
        out.execute(cursor::Hide)?;
        Ok(guard)
    }
}

impl Drop for RawGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        let _ = out.execute(cursor::Show);
        let _ = out.execute(event::DisableMouseCapture);
        let _ = out.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Print the final "✔ prompt value" line after the picker closes.
pub fn print_confirm(prompt: &str, value: &str) -> Result<(), String> {
    print_confirm_inner(prompt, value).map_err(|e| e.to_string())
}

fn print_confirm_inner(prompt: &str, value: &str) -> io::Result<()> {
    let mut out = io::stdout();
    out.queue(style::Print(style::style("✔ ").green().bold()))?;
    out.queue(style::Print(style::style(prompt).bold()))?;
    out.queue(style::Print(" "))?;
    out.queue(style::Print(style::style(value).cyan()))?;
    out.queue(style::Print("\n"))?;
    out.flush()
}

// ── page ────────────────────────────────────────────────────────────────

/// Elements of the host page around the picker.
struct Page {
    header: NodeId,
    host: NodeId,
    status: NodeId,
}

impl Page {
    fn build(doc: &mut Document) -> Self {
        let body = doc.body();
        Page {
            header: doc.mount(body, &Element::paragraph().text(TITLE)),
            host: doc.mount(body, &Element::div()),
            status: doc.mount(body, &Element::paragraph()),
        }
    }
}

enum RowKind {
    Header,
    Toggle,
    Font { active: bool },
    Status { alert: bool },
}

struct Row {
    node: NodeId,
    kind: RowKind,
    text: String,
}

struct Frame {
    rows: Vec<Option<Row>>,
    focusable: Vec<NodeId>,
    list_capacity: usize,
}

impl Frame {
    /// Node drawn on `row`, if any.
    fn hit(&self, row: u16) -> Option<NodeId> {
        self.rows
            .get(usize::from(row))
            .and_then(|r| r.as_ref())
            .map(|r| r.node)
    }
}

fn icon(doc: &Document, icon: NodeId, expanded: bool) -> &'static str {
    let Some(node) = doc.node(icon) else {
        return "";
    };
    if node.has_class("loading") {
        "…"
    } else if node.has_class("error") {
        "!"
    } else if expanded {
        "▴"
    } else {
        "▾"
    }
}

fn place(rows: &mut [Option<Row>], index: usize, row: Row) {
    if let Some(slot) = rows.get_mut(index) {
        *slot = Some(row);
    }
}

/// Lay out the mounted picker. The list is only drawn while the root
/// carries `expanded`.
fn layout(doc: &Document, page: &Page, root: NodeId, height: usize, scroll: &mut usize) -> Frame {
    let mut rows: Vec<Option<Row>> = (0..height).map(|_| None).collect();
    let mut focusable = Vec::new();
    place(&mut rows, 0, Row {
        node: page.header,
        kind: RowKind::Header,
        text: doc.text_content(page.header),
    });

    let expanded = doc.node(root).is_some_and(|n| n.has_class("expanded"));
    let children = doc.children(root).to_vec();

    if let Some(&button) = children.first() {
        focusable.push(button);
        let parts = doc.children(button).to_vec();
        if let (Some(&family), Some(&icon_node)) = (parts.first(), parts.get(1)) {
            place(&mut rows, 2, Row {
                node: button,
                kind: RowKind::Toggle,
                text: format!("{} {}", doc.text_content(family), icon(doc, icon_node, expanded)),
            });
        }
    }

    let list_capacity = height.saturating_sub(5);
    let fonts: Vec<NodeId> = match children.get(1) {
        Some(&list) if expanded && doc.node(list).is_some_and(|n| n.tag == Tag::List) => doc
            .children(list)
            .iter()
            .filter_map(|item| doc.children(*item).first().copied())
            .collect(),
        _ => Vec::new(),
    };
    *scroll = (*scroll).min(fonts.len().saturating_sub(list_capacity));

    for (offset, button) in fonts.iter().skip(*scroll).take(list_capacity).enumerate() {
        place(&mut rows, 3 + offset, Row {
            node: *button,
            kind: RowKind::Font {
                active: doc.node(*button).is_some_and(|n| n.has_class("active-font")),
            },
            text: doc.text_content(*button),
        });
    }
    focusable.extend(fonts);

    if height > 0 {
        let alert = doc.node(page.status).is_some_and(|n| n.has_class("alert"));
        place(&mut rows, height - 1, Row {
            node: page.status,
            kind: RowKind::Status { alert },
            text: doc.text_content(page.status),
        });
    }

    Frame {
        rows,
        focusable,
        list_capacity,
    }
}

fn paint(out: &mut impl Write, frame: &Frame, focused: Option<NodeId>) -> io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    for (index, row) in frame.rows.iter().enumerate() {
        let Some(row) = row else { continue };
        out.queue(cursor::MoveTo(0, index as u16))?;
        let is_focused = focused == Some(row.node);
        match row.kind {
            RowKind::Header => {
                out.queue(style::Print(style::style("? ").green().bold()))?;
                out.queue(style::Print(style::style(&row.text).bold()))?;
                out.queue(style::Print("  "))?;
                out.queue(style::Print(style::style(HELP).dark_grey()))?;
            }
            RowKind::Toggle => {
                let text = format!("  [ {} ]", row.text);
                if is_focused {
                    out.queue(style::Print(style::style(text).blue().bold()))?;
                } else {
                    out.queue(style::Print(style::style(text).bold()))?;
                }
            }
            RowKind::Font { active } => {
                let marker = if active { "✔" } else { " " };
                let text = format!("    {marker} {}", row.text);
                if is_focused {
                    out.queue(style::Print(style::style(text).blue()))?;
                } else if active {
                    out.queue(style::Print(style::style(text).green()))?;
                } else {
                    out.queue(style::Print(text))?;
                }
            }
            RowKind::Status { alert } => {
                let text = format!("  {}", row.text);
                if alert {
                    out.queue(style::Print(style::style(text).red()))?;
                } else {
                    out.queue(style::Print(style::style(text).dark_grey()))?;
                }
            }
        }
    }
    out.flush()
}

// ── events ──────────────────────────────────────────────────────────────

/// A page click: capturing document listeners see it first, then the
/// handler of the target or its nearest interactive ancestor.
fn click<M: FontManager>(
    picker: &mut FontPicker<M>,
    document: &Rc<RefCell<Document>>,
    target: NodeId,
) -> FontResult<()> {
    let event = UiEvent { target };
    let listeners = document.borrow().click_listeners();
    for listener in listeners {
        if picker.click_listener() == Some(listener) {
            picker.on_document_click(&event);
        }
    }

    let handler = {
        let doc = document.borrow();
        doc.ancestors(target)
            .find_map(|n| doc.node(n).and_then(|node| node.handler))
    };
    match handler {
        Some(handler) => picker.dispatch(handler, &event),
        None => Ok(()),
    }
}

/// Key activation of the focused element.
fn activate<M: FontManager>(
    picker: &mut FontPicker<M>,
    document: &Rc<RefCell<Document>>,
    target: NodeId,
) -> FontResult<()> {
    let handler = document.borrow().node(target).and_then(|n| n.handler);
    match handler {
        Some(handler) => picker.dispatch(handler, &UiEvent { target }),
        None => Ok(()),
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        || matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
}

fn status_text<M: FontManager>(picker: &FontPicker<M>, notice: Option<&str>) -> (String, bool) {
    if let Some(notice) = notice {
        return (notice.to_string(), true);
    }
    match picker.loading_status() {
        LoadingStatus::Loading => ("Loading fonts…".to_string(), false),
        LoadingStatus::Error => ("Could not load the font list, see the log for details".to_string(), true),
        LoadingStatus::Finished => (format!("Active font: {}", picker.props().active_font_family), false),
    }
}

/// Run the picker until the user quits.
///
/// `sync_props` runs after every handled event so the host can feed changes
/// (typically from the `on_change` callback) back in through
/// [`FontPicker::update`].
pub fn run_picker<M, F>(
    picker: &mut FontPicker<M>,
    document: &Rc<RefCell<Document>>,
    mut sync_props: F,
) -> io::Result<()>
where
    M: FontManager,
    F: FnMut(&mut FontPicker<M>),
{
    let _guard = RawGuard::enter()?;
    let mut out = io::stdout();
    let page = Page::build(&mut document.borrow_mut());

    let mut focus: usize = 0;
    let mut scroll: usize = 0;
    let mut notice: Option<String> = None;

    loop {
        picker.poll_initialization();
        let view = picker.render();
        let (status, alert) = status_text(picker, notice.as_deref());
        let (_, height) = terminal::size()?;

        let frame = {
            let mut doc = document.borrow_mut();
            let root = doc.render_into(page.host, &view);
            if let Some(node) = doc.node_mut(page.status) {
                node.text = Some(status);
                node.classes = if alert { vec!["alert".to_string()] } else { Vec::new() };
            }
            layout(&doc, &page, root, usize::from(height), &mut scroll)
        };
        focus = focus.min(frame.focusable.len().saturating_sub(1));
        paint(&mut out, &frame, frame.focusable.get(focus).copied())?;

        if !event::poll(TICK)? {
            continue;
        }

        let outcome = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if is_quit(&key) {
                    break;
                }
                match key.code {
                    KeyCode::Tab | KeyCode::BackTab => {
                        let count = frame.focusable.len().max(1);
                        focus = if key.code == KeyCode::Tab {
                            (focus + 1) % count
                        } else {
                            (focus + count - 1) % count
                        };
                        // keep the focused list entry on screen
                        if let Some(index) = focus.checked_sub(1) {
                            if index < scroll {
                                scroll = index;
                            } else if index >= scroll + frame.list_capacity {
                                scroll = index + 1 - frame.list_capacity.max(1);
                            }
                        }
                        None
                    }
                    KeyCode::Enter | KeyCode::Char(' ') => frame
                        .focusable
                        .get(focus)
                        .map(|node| activate(picker, document, *node)),
                    _ => None,
                }
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    let target = frame
                        .hit(mouse.row)
                        .unwrap_or_else(|| document.borrow().body());
                    debug!(row = mouse.row, ?target, "click");
                    Some(click(picker, document, target))
                }
                MouseEventKind::ScrollDown => {
                    scroll += 1;
                    None
                }
                MouseEventKind::ScrollUp => {
                    scroll = scroll.saturating_sub(1);
                    None
                }
                _ => None,
            },
            _ => None,
        };

        if let Some(result) = outcome {
            notice = result.err().map(|e| e.to_string());
        }
        sync_props(picker);
    }

    Ok(())
}
