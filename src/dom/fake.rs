//! In-memory platform for native tests.
//!
//! Selectors are matched literally: a node registered under `.header` is
//! what `query(".header")` returns.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::{
    Analytics, AnalyticsEvent, Capabilities, Document, DomEvent, Handle, Listener, Node, Pending,
    Platform, Scheduler, SessionStore, Tracker, Viewport, VisibilityWatcher, WatchOptions,
    WatcherFactory,
};
use crate::config::PageConfig;
use crate::error::PageError;
use crate::page::Page;

pub fn same_node(a: &Handle, b: &Handle) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

#[derive(Default)]
pub struct FakeEvent {
    key: Option<String>,
    prevented: Cell<bool>,
}

impl FakeEvent {
    pub fn keydown(key: &str) -> Self {
        Self {
            key: Some(key.to_string()),
            prevented: Cell::new(false),
        }
    }

    pub fn prevented(&self) -> bool {
        self.prevented.get()
    }
}

impl DomEvent for FakeEvent {
    fn key(&self) -> Option<String> {
        self.key.clone()
    }

    fn prevent_default(&self) {
        self.prevented.set(true);
    }
}

#[derive(Default)]
struct Listeners(RefCell<Vec<(String, Listener)>>);

impl Listeners {
    fn add(&self, event: &str, listener: Listener) {
        self.0.borrow_mut().push((event.to_string(), listener));
    }

    fn count(&self, event: &str) -> usize {
        self.0.borrow().iter().filter(|(name, _)| name == event).count()
    }

    fn dispatch(&self, event: &str, payload: &FakeEvent) {
        // Listeners may register more listeners while running.
        let mut listeners = self.0.take();
        for (name, listener) in listeners.iter_mut() {
            if name == event {
                listener(payload);
            }
        }
        let mut added = self.0.take();
        listeners.append(&mut added);
        *self.0.borrow_mut() = listeners;
    }
}

#[derive(Default)]
pub struct FakeNode {
    tag: String,
    classes: RefCell<Vec<String>>,
    attributes: RefCell<HashMap<String, String>>,
    styles: RefCell<HashMap<String, String>>,
    text: RefCell<Option<String>>,
    offset_height: Cell<f64>,
    viewport_top: Cell<f64>,
    children: RefCell<Vec<(String, Rc<FakeNode>)>>,
    prepended: RefCell<Vec<Handle>>,
    listeners: Listeners,
}

impl FakeNode {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_offset_height(&self, height: f64) {
        self.offset_height.set(height);
    }

    pub fn set_viewport_top(&self, top: f64) {
        self.viewport_top.set(top);
    }

    pub fn add_child(&self, selector: &str, child: Rc<FakeNode>) {
        self.children
            .borrow_mut()
            .push((selector.to_string(), child));
    }

    pub fn first_child(&self) -> Option<Handle> {
        self.prepended.borrow().first().cloned()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.count(event)
    }

    pub fn dispatch(&self, event: &str) -> FakeEvent {
        let payload = FakeEvent::default();
        self.listeners.dispatch(event, &payload);
        payload
    }

    pub fn click(&self) -> FakeEvent {
        self.dispatch("click")
    }
}

impl Node for FakeNode {
    fn add_class(&self, class: &str) {
        if !self.has_class(class) {
            self.classes.borrow_mut().push(class.to_string());
        }
    }

    fn remove_class(&self, class: &str) {
        self.classes.borrow_mut().retain(|existing| existing != class);
    }

    fn toggle_class(&self, class: &str, force: bool) {
        if force {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().iter().any(|existing| existing == class)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    fn set_style(&self, property: &str, value: &str) {
        let mut styles = self.styles.borrow_mut();
        if value.is_empty() {
            styles.remove(property);
        } else {
            styles.insert(property.to_string(), value.to_string());
        }
    }

    fn style(&self, property: &str) -> Option<String> {
        self.styles.borrow().get(property).cloned()
    }

    fn text(&self) -> Option<String> {
        self.text.borrow().clone()
    }

    fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = Some(text.to_string());
    }

    fn offset_height(&self) -> f64 {
        self.offset_height.get()
    }

    fn viewport_top(&self) -> f64 {
        self.viewport_top.get()
    }

    fn query(&self, selector: &str) -> Option<Handle> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<Handle> {
        self.children
            .borrow()
            .iter()
            .filter(|(registered, _)| registered == selector)
            .map(|(_, child)| Rc::clone(child) as Handle)
            .collect()
    }

    fn prepend(&self, child: &Handle) {
        self.prepended.borrow_mut().insert(0, Rc::clone(child));
    }

    fn listen(&self, event: &str, listener: Listener) {
        self.listeners.add(event, listener);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Default)]
pub struct FakeDocument {
    nodes: RefCell<Vec<(String, Rc<FakeNode>)>>,
    body: Rc<FakeNode>,
    root: Rc<FakeNode>,
    created: RefCell<Vec<Rc<FakeNode>>>,
    listeners: Listeners,
}

impl FakeDocument {
    pub fn insert(&self, selector: &str, node: Rc<FakeNode>) {
        self.nodes.borrow_mut().push((selector.to_string(), node));
    }

    pub fn node(&self, selector: &str) -> Rc<FakeNode> {
        self.nodes
            .borrow()
            .iter()
            .find(|(registered, _)| registered == selector)
            .map(|(_, node)| Rc::clone(node))
            .unwrap_or_else(|| panic!("no fake node registered for {selector}"))
    }

    pub fn body_node(&self) -> Rc<FakeNode> {
        Rc::clone(&self.body)
    }

    pub fn root_node(&self) -> Rc<FakeNode> {
        Rc::clone(&self.root)
    }

    pub fn created(&self) -> Vec<Rc<FakeNode>> {
        self.created.borrow().clone()
    }

    pub fn dispatch(&self, event: &str, payload: &FakeEvent) {
        self.listeners.dispatch(event, payload);
    }
}

impl Document for FakeDocument {
    fn query(&self, selector: &str) -> Option<Handle> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<Handle> {
        self.nodes
            .borrow()
            .iter()
            .filter(|(registered, _)| registered == selector)
            .map(|(_, node)| Rc::clone(node) as Handle)
            .collect()
    }

    fn body(&self) -> Option<Handle> {
        Some(Rc::clone(&self.body) as Handle)
    }

    fn root(&self) -> Option<Handle> {
        Some(Rc::clone(&self.root) as Handle)
    }

    fn create_element(&self, tag: &str) -> Option<Handle> {
        let node = Rc::new(FakeNode {
            tag: tag.to_string(),
            ..FakeNode::default()
        });
        self.created.borrow_mut().push(Rc::clone(&node));
        Some(node)
    }

    fn listen(&self, event: &str, listener: Listener) {
        self.listeners.add(event, listener);
    }
}

#[derive(Default)]
pub struct FakeViewport {
    scroll_y: Cell<f64>,
    inner_height: Cell<f64>,
    scrolled_to: RefCell<Vec<f64>>,
    listeners: RefCell<Vec<Box<dyn FnMut()>>>,
}

impl FakeViewport {
    pub fn set_inner_height(&self, height: f64) {
        self.inner_height.set(height);
    }

    /// Moves the page and fires scroll listeners.
    pub fn scroll(&self, y: f64) {
        self.scroll_y.set(y);
        let mut listeners = self.listeners.take();
        for listener in listeners.iter_mut() {
            listener();
        }
        let mut added = self.listeners.take();
        listeners.append(&mut added);
        *self.listeners.borrow_mut() = listeners;
    }

    pub fn scrolled_to(&self) -> Vec<f64> {
        self.scrolled_to.borrow().clone()
    }
}

impl Viewport for FakeViewport {
    fn scroll_y(&self) -> f64 {
        self.scroll_y.get()
    }

    fn inner_height(&self) -> f64 {
        self.inner_height.get()
    }

    fn smooth_scroll_to(&self, top: f64) {
        self.scrolled_to.borrow_mut().push(top);
    }

    fn on_scroll(&self, listener: Box<dyn FnMut()>) {
        self.listeners.borrow_mut().push(listener);
    }
}

#[derive(Default)]
pub struct FakeSession {
    values: RefCell<HashMap<String, String>>,
    refuse_writes: Cell<bool>,
}

impl FakeSession {
    pub fn refuse_writes(&self) {
        self.refuse_writes.set(true);
    }
}

impl SessionStore for FakeSession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PageError> {
        if self.refuse_writes.get() {
            return Err(PageError::Js("QuotaExceededError".to_string()));
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

struct Task {
    due: u64,
    seq: u64,
    cancelled: Rc<Cell<bool>>,
    run: Box<dyn FnOnce()>,
}

/// Timers driven by hand through [`FakeScheduler::advance`].
#[derive(Default)]
pub struct FakeScheduler {
    now: Cell<u64>,
    seq: Cell<u64>,
    tasks: RefCell<Vec<Task>>,
}

impl FakeScheduler {
    pub fn pending(&self) -> usize {
        self.tasks
            .borrow()
            .iter()
            .filter(|task| !task.cancelled.get())
            .count()
    }

    /// Runs every task falling due within the next `ms` milliseconds.
    pub fn advance(&self, ms: u64) {
        let target = self.now.get() + ms;
        loop {
            let next = {
                let mut tasks = self.tasks.borrow_mut();
                tasks.retain(|task| !task.cancelled.get());
                let index = tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, task)| task.due <= target)
                    .min_by_key(|(_, task)| (task.due, task.seq))
                    .map(|(index, _)| index);
                index.map(|index| tasks.remove(index))
            };
            let Some(task) = next else {
                break;
            };
            self.now.set(task.due);
            (task.run)();
        }
        self.now.set(target);
    }
}

struct FakePending {
    cancelled: Rc<Cell<bool>>,
    detached: bool,
}

impl Pending for FakePending {
    fn detach(self: Box<Self>) {
        let mut pending = *self;
        pending.detached = true;
    }
}

impl Drop for FakePending {
    fn drop(&mut self) {
        if !self.detached {
            self.cancelled.set(true);
        }
    }
}

impl Scheduler for FakeScheduler {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Box<dyn Pending> {
        let cancelled = Rc::new(Cell::new(false));
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        self.tasks.borrow_mut().push(Task {
            due: self.now.get() + u64::from(delay_ms),
            seq,
            cancelled: Rc::clone(&cancelled),
            run: task,
        });
        Box::new(FakePending {
            cancelled,
            detached: false,
        })
    }
}

pub struct FakeWatcher {
    options: WatchOptions,
    observed: RefCell<Vec<(Handle, Box<dyn FnOnce(Handle)>)>>,
}

impl FakeWatcher {
    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    pub fn is_observing(&self, node: &Handle) -> bool {
        self.observed
            .borrow()
            .iter()
            .any(|(observed, _)| same_node(observed, node))
    }

    /// Reports `node` as intersecting the viewport.
    pub fn intersect(&self, node: &Handle) {
        let hit = {
            let mut observed = self.observed.borrow_mut();
            observed
                .iter()
                .position(|(observed, _)| same_node(observed, node))
                .map(|index| observed.remove(index))
        };
        if let Some((node, on_visible)) = hit {
            on_visible(node);
        }
    }
}

impl VisibilityWatcher for FakeWatcher {
    fn observe(&self, node: Handle, on_visible: Box<dyn FnOnce(Handle)>) {
        self.observed.borrow_mut().push((node, on_visible));
    }
}

#[derive(Default)]
pub struct FakeWatcherFactory {
    watchers: RefCell<Vec<Rc<FakeWatcher>>>,
    refuse: Cell<bool>,
}

impl FakeWatcherFactory {
    pub fn refuse(&self) {
        self.refuse.set(true);
    }

    pub fn watchers(&self) -> Vec<Rc<FakeWatcher>> {
        self.watchers.borrow().clone()
    }

    pub fn only(&self) -> Rc<FakeWatcher> {
        let watchers = self.watchers.borrow();
        assert_eq!(watchers.len(), 1, "expected exactly one watcher");
        Rc::clone(&watchers[0])
    }
}

impl WatcherFactory for FakeWatcherFactory {
    fn create(&self, options: WatchOptions) -> Result<Rc<dyn VisibilityWatcher>, PageError> {
        if self.refuse.get() {
            return Err(PageError::Js("IntersectionObserver is not a constructor".to_string()));
        }
        let watcher = Rc::new(FakeWatcher {
            options,
            observed: RefCell::default(),
        });
        self.watchers.borrow_mut().push(Rc::clone(&watcher));
        Ok(watcher)
    }
}

#[derive(Default)]
pub struct FakeTag {
    events: RefCell<Vec<AnalyticsEvent>>,
    failing: Cell<bool>,
}

impl Tracker for FakeTag {
    fn send(&self, event: &AnalyticsEvent) -> Result<(), PageError> {
        if self.failing.get() {
            return Err(PageError::Js("gtag threw".to_string()));
        }
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }
}

/// A tag that starts loaded and can be taken away or brought back.
pub struct FakeAnalytics {
    tag: Rc<FakeTag>,
    loaded: Cell<bool>,
}

impl Default for FakeAnalytics {
    fn default() -> Self {
        Self {
            tag: Rc::default(),
            loaded: Cell::new(true),
        }
    }
}

impl FakeAnalytics {
    pub fn fail(&self) {
        self.tag.failing.set(true);
    }

    pub fn set_loaded(&self, loaded: bool) {
        self.loaded.set(loaded);
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.tag.events.borrow().clone()
    }
}

impl Analytics for FakeAnalytics {
    fn tracker(&self) -> Option<Rc<dyn Tracker>> {
        self.loaded.get().then(|| Rc::clone(&self.tag) as Rc<dyn Tracker>)
    }
}

/// Every fake collaborator, kept around so tests can poke and inspect them.
pub struct Fakes {
    pub document: Rc<FakeDocument>,
    pub viewport: Rc<FakeViewport>,
    pub session: Rc<FakeSession>,
    pub scheduler: Rc<FakeScheduler>,
    pub analytics: Rc<FakeAnalytics>,
    pub watchers: Rc<FakeWatcherFactory>,
    pub capabilities: Capabilities,
    pub with_session: bool,
}

impl Default for Fakes {
    fn default() -> Self {
        Self {
            document: Rc::default(),
            viewport: Rc::default(),
            session: Rc::default(),
            scheduler: Rc::default(),
            analytics: Rc::default(),
            watchers: Rc::default(),
            capabilities: Capabilities {
                intersection_observer: true,
                native_lazy_loading: false,
                prefers_reduced_motion: false,
            },
            with_session: true,
        }
    }
}

impl Fakes {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page with every element the default config looks for.
    pub fn landing() -> Self {
        let fakes = Self::new();
        let selectors = PageConfig::default().selectors;
        for selector in [
            &selectors.header,
            &selectors.urgency_bar,
            &selectors.mobile_menu_button,
            &selectors.mobile_menu,
            &selectors.floating_cta,
            &selectors.pricing_section,
            &selectors.nav_links,
            &selectors.cta_button,
        ] {
            fakes.element(selector);
        }
        fakes
    }

    pub fn element(&self, selector: &str) -> Rc<FakeNode> {
        let node = FakeNode::new();
        self.document.insert(selector, Rc::clone(&node));
        node
    }

    pub fn node(&self, selector: &str) -> Rc<FakeNode> {
        self.document.node(selector)
    }

    pub fn platform(&self) -> Platform {
        Platform {
            document: self.document.clone(),
            viewport: self.viewport.clone(),
            session: self
                .with_session
                .then(|| self.session.clone() as Rc<dyn SessionStore>),
            scheduler: self.scheduler.clone(),
            analytics: self.analytics.clone(),
            watchers: self
                .capabilities
                .intersection_observer
                .then(|| self.watchers.clone() as Rc<dyn WatcherFactory>),
            capabilities: self.capabilities,
        }
    }

    pub fn page(&self) -> Rc<Page> {
        self.page_with(PageConfig::default())
    }

    pub fn page_with(&self, config: PageConfig) -> Rc<Page> {
        Page::new(self.platform(), config)
    }
}
