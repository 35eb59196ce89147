use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::{Array, Function, Object, Reflect};
use web_sys::{
    AddEventListenerOptions, Element, EventTarget, HtmlElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent, NodeList, ScrollBehavior,
    ScrollToOptions, Storage, Window,
};

use super::{
    Analytics, AnalyticsEvent, Capabilities, Document, DomEvent, Handle, Listener, Node, Pending,
    Platform, Scheduler, SessionStore, Tracker, Viewport, VisibilityWatcher, WatchOptions,
    WatcherFactory,
};
use crate::error::PageError;

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// Wires the browser into a [`Platform`], detecting capabilities once.
pub fn platform() -> Result<Platform, PageError> {
    let window = web_sys::window().ok_or(PageError::MissingGlobal("window"))?;
    let document = window
        .document()
        .ok_or(PageError::MissingGlobal("document"))?;
    let capabilities = detect_capabilities(&window);
    debug!("Detected capabilities: {:?}", capabilities);

    let session = match window.session_storage() {
        Ok(Some(storage)) => Some(Rc::new(WebSession { storage }) as Rc<dyn SessionStore>),
        Ok(None) => None,
        Err(err) => {
            warn!("Session storage unavailable: {}", PageError::from(err));
            None
        }
    };
    let watchers = capabilities
        .intersection_observer
        .then(|| Rc::new(WebWatcherFactory) as Rc<dyn WatcherFactory>);

    Ok(Platform {
        document: Rc::new(WebDocument { document }),
        viewport: Rc::new(WebViewport {
            window: window.clone(),
        }),
        session,
        scheduler: Rc::new(WebScheduler),
        analytics: Rc::new(GlobalTag { window }),
        watchers,
        capabilities,
    })
}

/// Runs `task` once the DOM is parsed.
pub fn when_ready(task: impl FnOnce() + 'static) -> Result<(), PageError> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or(PageError::MissingGlobal("document"))?;
    if document.ready_state() == "loading" {
        let callback = Closure::once_into_js(task);
        document.add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())?;
    } else {
        task();
    }
    Ok(())
}

fn detect_capabilities(window: &Window) -> Capabilities {
    let intersection_observer =
        Reflect::has(window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false);

    let native_lazy_loading = Reflect::get(window, &JsValue::from_str("HTMLImageElement"))
        .and_then(|image| Reflect::get(&image, &JsValue::from_str("prototype")))
        .ok()
        .and_then(|prototype| prototype.dyn_into::<Object>().ok())
        .map(|prototype| Reflect::has(&prototype, &JsValue::from_str("loading")).unwrap_or(false))
        .unwrap_or(false);

    let prefers_reduced_motion = window
        .match_media(REDUCED_MOTION_QUERY)
        .ok()
        .flatten()
        .map(|query| query.matches())
        .unwrap_or(false);

    Capabilities {
        intersection_observer,
        native_lazy_loading,
        prefers_reduced_motion,
    }
}

struct WebEvent(web_sys::Event);

impl DomEvent for WebEvent {
    fn key(&self) -> Option<String> {
        self.0.dyn_ref::<KeyboardEvent>().map(|event| event.key())
    }

    fn prevent_default(&self) {
        self.0.prevent_default();
    }
}

fn listen_on(target: &EventTarget, event: &str, mut listener: Listener) {
    let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        listener(&WebEvent(event));
    });
    if let Err(err) =
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
    {
        warn!("Failed to bind {} listener: {}", event, PageError::from(err));
    }
    // Listeners live as long as the page.
    callback.forget();
}

fn handles(list: Result<NodeList, JsValue>) -> Vec<Handle> {
    let Ok(list) = list else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|index| list.get(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .map(WebNode::handle)
        .collect()
}

pub struct WebNode {
    element: Element,
}

impl WebNode {
    pub fn handle(element: Element) -> Handle {
        Rc::new(WebNode { element })
    }

    fn html(&self) -> Option<&HtmlElement> {
        self.element.dyn_ref::<HtmlElement>()
    }
}

impl Node for WebNode {
    fn add_class(&self, class: &str) {
        let _ = self.element.class_list().add_1(class);
    }

    fn remove_class(&self, class: &str) {
        let _ = self.element.class_list().remove_1(class);
    }

    fn toggle_class(&self, class: &str, force: bool) {
        let _ = self.element.class_list().toggle_with_force(class, force);
    }

    fn has_class(&self, class: &str) -> bool {
        self.element.class_list().contains(class)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let _ = self.element.set_attribute(name, value);
    }

    fn set_style(&self, property: &str, value: &str) {
        let Some(html) = self.html() else {
            return;
        };
        let style = html.style();
        let _ = if value.is_empty() {
            style.remove_property(property).map(|_| ())
        } else {
            style.set_property(property, value)
        };
    }

    fn style(&self, property: &str) -> Option<String> {
        self.html()
            .and_then(|html| html.style().get_property_value(property).ok())
            .filter(|value| !value.is_empty())
    }

    fn text(&self) -> Option<String> {
        self.element.text_content()
    }

    fn set_text(&self, text: &str) {
        self.element.set_text_content(Some(text));
    }

    fn offset_height(&self) -> f64 {
        self.html()
            .map(|html| html.offset_height() as f64)
            .unwrap_or(0.0)
    }

    fn viewport_top(&self) -> f64 {
        self.element.get_bounding_client_rect().top()
    }

    fn query(&self, selector: &str) -> Option<Handle> {
        self.element
            .query_selector(selector)
            .ok()
            .flatten()
            .map(WebNode::handle)
    }

    fn query_all(&self, selector: &str) -> Vec<Handle> {
        handles(self.element.query_selector_all(selector))
    }

    fn prepend(&self, child: &Handle) {
        if let Some(child) = child.as_any().downcast_ref::<WebNode>() {
            let _ = self.element.prepend_with_node_1(&child.element);
        }
    }

    fn listen(&self, event: &str, listener: Listener) {
        listen_on(&self.element, event, listener);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct WebDocument {
    document: web_sys::Document,
}

impl Document for WebDocument {
    fn query(&self, selector: &str) -> Option<Handle> {
        self.document
            .query_selector(selector)
            .ok()
            .flatten()
            .map(WebNode::handle)
    }

    fn query_all(&self, selector: &str) -> Vec<Handle> {
        handles(self.document.query_selector_all(selector))
    }

    fn body(&self) -> Option<Handle> {
        self.document
            .body()
            .map(|body| WebNode::handle(body.into()))
    }

    fn root(&self) -> Option<Handle> {
        self.document.document_element().map(WebNode::handle)
    }

    fn create_element(&self, tag: &str) -> Option<Handle> {
        self.document.create_element(tag).ok().map(WebNode::handle)
    }

    fn listen(&self, event: &str, listener: Listener) {
        listen_on(&self.document, event, listener);
    }
}

struct WebViewport {
    window: Window,
}

impl Viewport for WebViewport {
    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn inner_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|height| height.as_f64())
            .unwrap_or(0.0)
    }

    fn smooth_scroll_to(&self, top: f64) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn on_scroll(&self, mut listener: Box<dyn FnMut()>) {
        let callback = Closure::<dyn FnMut()>::new(move || listener());
        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        if let Err(err) = self
            .window
            .add_event_listener_with_callback_and_add_event_listener_options(
                "scroll",
                callback.as_ref().unchecked_ref(),
                &options,
            )
        {
            warn!("Failed to bind scroll listener: {}", PageError::from(err));
        }
        callback.forget();
    }
}

struct WebSession {
    storage: Storage,
}

impl SessionStore for WebSession {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PageError> {
        self.storage.set_item(key, value)?;
        Ok(())
    }
}

struct WebScheduler;

struct PendingTimeout(Timeout);

impl Pending for PendingTimeout {
    fn detach(self: Box<Self>) {
        let _ = self.0.forget();
    }
}

impl Scheduler for WebScheduler {
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Box<dyn Pending> {
        Box::new(PendingTimeout(Timeout::new(delay_ms, task)))
    }
}

type Subscriptions = Rc<RefCell<Vec<(Element, Box<dyn FnOnce(Handle)>)>>>;

struct WebWatcherFactory;

impl WatcherFactory for WebWatcherFactory {
    fn create(&self, options: WatchOptions) -> Result<Rc<dyn VisibilityWatcher>, PageError> {
        let subscriptions: Subscriptions = Rc::default();
        let callback = {
            let subscriptions = subscriptions.clone();
            Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
                move |entries: Array, observer: IntersectionObserver| {
                    let mut visible = Vec::new();
                    for entry in entries.iter() {
                        let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                            continue;
                        };
                        if !entry.is_intersecting() {
                            continue;
                        }
                        let target = entry.target();
                        observer.unobserve(&target);
                        let mut subscriptions = subscriptions.borrow_mut();
                        if let Some(index) =
                            subscriptions.iter().position(|(element, _)| *element == target)
                        {
                            visible.push(subscriptions.swap_remove(index));
                        }
                    }
                    // Borrow released: callbacks may subscribe again.
                    for (element, on_visible) in visible {
                        on_visible(WebNode::handle(element));
                    }
                },
            )
        };

        let init = IntersectionObserverInit::new();
        init.set_root_margin(&options.root_margin);
        init.set_threshold(&JsValue::from_f64(options.threshold));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        callback.forget();

        Ok(Rc::new(WebWatcher {
            observer,
            subscriptions,
        }))
    }
}

struct WebWatcher {
    observer: IntersectionObserver,
    subscriptions: Subscriptions,
}

impl VisibilityWatcher for WebWatcher {
    fn observe(&self, node: Handle, on_visible: Box<dyn FnOnce(Handle)>) {
        let Some(node) = node.as_any().downcast_ref::<WebNode>() else {
            return;
        };
        self.subscriptions
            .borrow_mut()
            .push((node.element.clone(), on_visible));
        self.observer.observe(&node.element);
    }
}

/// Google's global `gtag`, resolved on every event since it may load late.
struct GlobalTag {
    window: Window,
}

impl Analytics for GlobalTag {
    fn tracker(&self) -> Option<Rc<dyn Tracker>> {
        let gtag = Reflect::get(&self.window, &JsValue::from_str("gtag")).ok()?;
        let gtag = gtag.dyn_into::<Function>().ok()?;
        Some(Rc::new(GtagFunction { gtag }))
    }
}

struct GtagFunction {
    gtag: Function,
}

impl Tracker for GtagFunction {
    fn send(&self, event: &AnalyticsEvent) -> Result<(), PageError> {
        let params = serde_wasm_bindgen::to_value(&event.params)
            .map_err(|err| PageError::Js(err.to_string()))?;
        self.gtag.call3(
            &JsValue::NULL,
            &JsValue::from_str("event"),
            &JsValue::from_str(&event.action),
            &params,
        )?;
        Ok(())
    }
}
