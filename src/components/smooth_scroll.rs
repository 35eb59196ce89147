use std::rc::Rc;

use crate::dom::DomEvent;
use crate::page::Page;

/// Space taken by fixed chrome above a scrolled-to section.
pub fn anchor_offset(page: &Page) -> f64 {
    let header = page
        .elements
        .header
        .as_ref()
        .map(|header| header.offset_height())
        .unwrap_or(0.0);
    let closed = page.state.borrow().urgency_bar_closed;
    let banner = match &page.elements.urgency_bar {
        Some(bar) if !closed => bar.offset_height(),
        _ => 0.0,
    };
    header + banner + page.config.scroll.anchor_padding
}

pub fn target_position(target_top: f64, scroll_y: f64, offset: f64) -> f64 {
    target_top + scroll_y - offset
}

/// Scrolls to the fragment named by `href`. Returns `false`, leaving the
/// browser's own jump alone, when there is nothing to scroll to.
pub fn handle_anchor_click(page: &Page, href: &str, event: &dyn DomEvent) -> bool {
    if href == "#" {
        return false;
    }
    let Some(target) = page.platform.document.query(href) else {
        return false;
    };
    event.prevent_default();

    let viewport = &page.platform.viewport;
    let top = target_position(target.viewport_top(), viewport.scroll_y(), anchor_offset(page));
    viewport.smooth_scroll_to(top);
    true
}

pub fn init(page: &Rc<Page>) {
    for anchor in page.platform.document.query_all(&page.config.selectors.anchors) {
        let page = Rc::clone(page);
        let link = Rc::clone(&anchor);
        anchor.listen(
            "click",
            Box::new(move |event: &dyn DomEvent| {
                if let Some(href) = link.attribute("href") {
                    handle_anchor_click(&page, &href, event);
                }
            }),
        );
    }
}
