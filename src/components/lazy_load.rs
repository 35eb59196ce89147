use std::rc::Rc;

use log::{debug, warn};

use crate::dom::{Handle, Node, Platform, VisibilityWatcher, WatchOptions};
use crate::page::Page;

pub const DATA_SRC: &str = "data-src";

const NATIVE_LAZY: &str = "img[loading=\"lazy\"]";
const DEFERRED: &str = "img[data-src]";

pub enum LazyStrategy {
    /// The browser defers `loading="lazy"` images itself.
    Native,
    Observe(Rc<dyn VisibilityWatcher>),
    Unavailable,
}

impl LazyStrategy {
    pub fn select(platform: &Platform) -> Self {
        if platform.capabilities.native_lazy_loading {
            return LazyStrategy::Native;
        }
        let Some(watchers) = &platform.watchers else {
            return LazyStrategy::Unavailable;
        };
        match watchers.create(WatchOptions::default()) {
            Ok(watcher) => LazyStrategy::Observe(watcher),
            Err(err) => {
                warn!("Lazy image watcher unavailable: {}", err);
                LazyStrategy::Unavailable
            }
        }
    }
}

/// Copies a non-empty `data-src` into `src`.
pub fn assign_source(image: &dyn Node) {
    if let Some(src) = image.attribute(DATA_SRC).filter(|src| !src.is_empty()) {
        image.set_attribute("src", &src);
    }
}

pub fn init(page: &Rc<Page>) {
    let document = &page.platform.document;
    match LazyStrategy::select(&page.platform) {
        LazyStrategy::Native if page.config.lazy_images.eager_native_assign => {
            for image in document.query_all(NATIVE_LAZY) {
                assign_source(image.as_ref());
            }
        }
        LazyStrategy::Native => debug!("Leaving lazy images to the browser"),
        LazyStrategy::Observe(watcher) => {
            for image in document.query_all(DEFERRED) {
                watcher.observe(image, Box::new(|image: Handle| assign_source(image.as_ref())));
            }
        }
        LazyStrategy::Unavailable => debug!("No lazy image strategy available"),
    }
}
