//! Test doubles for the picker.

use super::manager::{FontManager, Initialization, OnChange};
use crate::errors::{FontError, FontResult};
use crate::fonts::{Catalog, FontMetadata};
use std::fmt::{self, Write as _};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Init,
    SetActiveFont(String),
    SetOnChange,
}

/// Manager whose initialization is completed by the test, recording every
/// call it receives.
pub struct RecordingManager {
    calls: Vec<Call>,
    catalog: Catalog,
    suffix: String,
    init: Option<oneshot::Sender<FontResult<()>>>,
    fail_activation: bool,
}

impl RecordingManager {
    pub fn new(families: &[&str]) -> Self {
        Self {
            calls: Vec::new(),
            catalog: families.iter().map(|f| FontMetadata::bare(*f)).collect(),
            suffix: String::new(),
            init: None,
            fail_activation: false,
        }
    }

    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.clone()
    }

    pub fn add_font(&mut self, family: &str) {
        self.catalog.insert(FontMetadata::bare(family));
    }

    pub fn resolve(&mut self) {
        self.complete(Ok(()));
    }

    pub fn reject(&mut self, error: FontError) {
        self.complete(Err(error));
    }

    /// Drop the sender without reporting anything.
    pub fn abandon(&mut self) {
        self.init = None;
    }

    pub fn fail_activation(&mut self) {
        self.fail_activation = true;
    }

    fn complete(&mut self, result: FontResult<()>) {
        let sender = self.init.take().expect("init was not called");
        let _ = sender.send(result);
    }
}

impl FontManager for RecordingManager {
    fn init(&mut self) -> Initialization {
        self.calls.push(Call::Init);
        let (tx, rx) = oneshot::channel();
        self.init = Some(tx);
        rx
    }

    fn fonts(&self) -> Catalog {
        self.catalog.clone()
    }

    fn set_active_font(&mut self, family: &str) -> FontResult<()> {
        self.calls.push(Call::SetActiveFont(family.to_string()));
        if self.fail_activation {
            return Err(FontError::UnknownFont(family.to_string()));
        }
        Ok(())
    }

    fn set_on_change(&mut self, _on_change: OnChange) {
        self.calls.push(Call::SetOnChange);
    }

    fn selector_suffix(&self) -> &str {
        &self.suffix
    }
}

/// One captured log event.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: Level,
    pub message: String,
    /// Every other field, rendered as `name=value` pairs.
    pub fields: String,
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: String,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, "{}={value:?} ", field.name());
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);
        self.events.lock().expect("log capture lock").push(LogEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

/// Run `f` with a subscriber that records every event emitted on this thread.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<LogEvent>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        events: Arc::clone(&events),
    });
    let result = tracing::subscriber::with_default(subscriber, || {
        tracing::callsite::rebuild_interest_cache();
        f()
    });
    let captured = events.lock().expect("log capture lock").clone();
    (result, captured)
}
