//! Everything driven by the page's scroll offset: the header style, the
//! banner tucking away, and the floating call to action.

use std::rc::Rc;

use crate::components::urgency_bar::HIDDEN;
use crate::page::Page;
use crate::timing::Throttle;

pub const SCROLLED: &str = "scrolled";
pub const VISIBLE: &str = "visible";

/// Shown once the visitor is well into the page but before pricing comes
/// into view.
pub fn floating_cta_visible(
    scroll_y: f64,
    pricing_top: f64,
    viewport_height: f64,
    threshold: f64,
) -> bool {
    scroll_y > threshold && pricing_top > viewport_height
}

pub fn handle_scroll(page: &Page) {
    let viewport = &page.platform.viewport;
    let settings = &page.config.scroll;
    let scroll_y = viewport.scroll_y();
    let past_header = scroll_y > settings.header_threshold;

    if let Some(header) = &page.elements.header {
        header.toggle_class(SCROLLED, past_header);
    }

    // Not persisted: scrolling back up brings the banner back.
    let closed = page.state.borrow().urgency_bar_closed;
    if !closed {
        if let Some(bar) = &page.elements.urgency_bar {
            bar.toggle_class(HIDDEN, past_header);
        }
    }

    if let (Some(cta), Some(pricing)) =
        (&page.elements.floating_cta, &page.elements.pricing_section)
    {
        let visible = floating_cta_visible(
            scroll_y,
            pricing.viewport_top(),
            viewport.inner_height(),
            settings.floating_cta_threshold,
        );
        cta.toggle_class(VISIBLE, visible);
    }

    page.state.borrow_mut().last_scroll_y = scroll_y;
}

pub fn init(page: &Rc<Page>) {
    let throttled = {
        let page = Rc::clone(page);
        Throttle::new(
            Rc::clone(&page.platform.scheduler),
            page.config.scroll.throttle_ms,
            move |()| handle_scroll(&page),
        )
    };
    page.platform
        .viewport
        .on_scroll(Box::new(move || throttled.call(())));

    handle_scroll(page);
}
