//! Browser surface the page components are written against.
//!
//! Components only ever see these traits. `web` backs them with web-sys;
//! tests back them with the in-memory fakes in `fake`.

use std::any::Any;
use std::rc::Rc;

use serde::Serialize;

use crate::error::PageError;

pub mod web;

#[cfg(test)]
pub mod fake;

pub type Handle = Rc<dyn Node>;
pub type Listener = Box<dyn FnMut(&dyn DomEvent)>;

pub trait DomEvent {
    /// `KeyboardEvent.key`, when the event is a keyboard event.
    fn key(&self) -> Option<String>;
    fn prevent_default(&self);
}

pub trait Node {
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn toggle_class(&self, class: &str, force: bool);
    fn has_class(&self, class: &str) -> bool;

    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str);

    /// Sets an inline style property. An empty value removes it.
    fn set_style(&self, property: &str, value: &str);
    fn style(&self, property: &str) -> Option<String>;

    fn text(&self) -> Option<String>;
    fn set_text(&self, text: &str);

    /// Rendered height in CSS pixels.
    fn offset_height(&self) -> f64;
    /// Top edge relative to the viewport.
    fn viewport_top(&self) -> f64;

    fn query(&self, selector: &str) -> Option<Handle>;
    fn query_all(&self, selector: &str) -> Vec<Handle>;
    fn prepend(&self, child: &Handle);

    fn listen(&self, event: &str, listener: Listener);

    fn as_any(&self) -> &dyn Any;
}

pub trait Document {
    /// Invalid selectors match nothing.
    fn query(&self, selector: &str) -> Option<Handle>;
    fn query_all(&self, selector: &str) -> Vec<Handle>;
    fn body(&self) -> Option<Handle>;
    /// The `<html>` element.
    fn root(&self) -> Option<Handle>;
    fn create_element(&self, tag: &str) -> Option<Handle>;
    fn listen(&self, event: &str, listener: Listener);
}

pub trait Viewport {
    fn scroll_y(&self) -> f64;
    fn inner_height(&self) -> f64;
    fn smooth_scroll_to(&self, top: f64);
    /// Registers a passive scroll listener.
    fn on_scroll(&self, listener: Box<dyn FnMut()>);
}

/// Session-scoped key/value storage.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), PageError>;
}

/// A scheduled task. Dropping it cancels the task unless it was detached.
pub trait Pending {
    fn detach(self: Box<Self>);
}

pub trait Scheduler {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Box<dyn Pending>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchOptions {
    pub root_margin: String,
    pub threshold: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            root_margin: "0px".to_string(),
            threshold: 0.0,
        }
    }
}

/// One-shot visibility subscription: `on_visible` runs on the first
/// intersection and the node is unobserved right after.
pub trait VisibilityWatcher {
    fn observe(&self, node: Handle, on_visible: Box<dyn FnOnce(Handle)>);
}

pub trait WatcherFactory {
    fn create(&self, options: WatchOptions) -> Result<Rc<dyn VisibilityWatcher>, PageError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventParams {
    pub event_category: String,
    pub event_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsEvent {
    pub action: String,
    pub params: EventParams,
}

pub trait Tracker {
    fn send(&self, event: &AnalyticsEvent) -> Result<(), PageError>;
}

pub trait Analytics {
    /// The tracker, if it has loaded. Looked up per event since the tag
    /// script may arrive after startup.
    fn tracker(&self) -> Option<Rc<dyn Tracker>>;
}

/// Feature detection results, taken once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Capabilities {
    pub intersection_observer: bool,
    pub native_lazy_loading: bool,
    pub prefers_reduced_motion: bool,
}

pub struct Platform {
    pub document: Rc<dyn Document>,
    pub viewport: Rc<dyn Viewport>,
    pub session: Option<Rc<dyn SessionStore>>,
    pub scheduler: Rc<dyn Scheduler>,
    pub analytics: Rc<dyn Analytics>,
    /// Present only when `capabilities.intersection_observer` holds.
    pub watchers: Option<Rc<dyn WatcherFactory>>,
    pub capabilities: Capabilities,
}
