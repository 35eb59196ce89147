//! Reveal-on-view: `[data-aos]` elements get `aos-animate` the first time
//! they scroll into view, after their optional `data-aos-delay`.

use std::rc::Rc;

use log::{debug, warn};

use crate::dom::{Handle, Node, Platform, VisibilityWatcher, WatchOptions};
use crate::page::Page;

pub const ANIMATE: &str = "aos-animate";
pub const DELAY_ATTRIBUTE: &str = "data-aos-delay";

pub fn watch_options() -> WatchOptions {
    WatchOptions {
        root_margin: "0px 0px -50px 0px".to_string(),
        threshold: 0.1,
    }
}

pub enum RevealStrategy {
    Observe(Rc<dyn VisibilityWatcher>),
    /// No intersection support: everything animates up front.
    Immediate,
}

impl RevealStrategy {
    pub fn select(platform: &Platform) -> Self {
        let Some(watchers) = &platform.watchers else {
            return RevealStrategy::Immediate;
        };
        match watchers.create(watch_options()) {
            Ok(watcher) => RevealStrategy::Observe(watcher),
            Err(err) => {
                warn!("Reveal watcher unavailable, animating immediately: {}", err);
                RevealStrategy::Immediate
            }
        }
    }
}

/// Reads a number the way JavaScript's `Number()` does for what shows up in
/// markup: decimals, exponents and `0x`/`0o`/`0b` integers.
fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let lower = raw.to_ascii_lowercase();
    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = lower.strip_prefix(prefix) {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }
    raw.parse().ok()
}

/// Milliseconds from `data-aos-delay`; anything unparsable counts as 0.
pub fn delay_ms(node: &dyn Node) -> u32 {
    node.attribute(DELAY_ATTRIBUTE)
        .and_then(|value| parse_number(&value))
        .filter(|delay| delay.is_finite() && *delay > 0.0)
        .map(|delay| delay.min(u32::MAX as f64) as u32)
        .unwrap_or(0)
}

pub fn init(page: &Rc<Page>) {
    let elements = &page.elements.animated;
    if elements.is_empty() {
        return;
    }

    match RevealStrategy::select(&page.platform) {
        RevealStrategy::Immediate => {
            debug!("Animating {} elements without observer", elements.len());
            for element in elements {
                element.add_class(ANIMATE);
            }
        }
        RevealStrategy::Observe(watcher) => {
            for element in elements {
                let scheduler = Rc::clone(&page.platform.scheduler);
                watcher.observe(
                    Rc::clone(element),
                    Box::new(move |node: Handle| {
                        let delay = delay_ms(node.as_ref());
                        scheduler
                            .schedule(delay, Box::new(move || node.add_class(ANIMATE)))
                            .detach();
                    }),
                );
            }
        }
    }
}
