use std::rc::Rc;

use log::{debug, warn};

use crate::dom::DomEvent;
use crate::page::{Page, URGENCY_BAR_CLOSED_KEY};

pub const HIDDEN: &str = "hidden";

const CLOSED: &str = "true";

/// Hides the banner for the rest of the session and moves the header and
/// mobile menu up into the space it leaves.
pub fn close(page: &Page) {
    let Some(bar) = page.elements.urgency_bar.as_ref() else {
        return;
    };
    bar.add_class(HIDDEN);
    page.state.borrow_mut().urgency_bar_closed = true;

    let layout = &page.config.layout;
    if let Some(header) = &page.elements.header {
        header.set_style("top", &layout.header_top);
    }
    if let Some(menu) = &page.elements.mobile_menu {
        menu.set_style("top", &layout.menu_top);
    }

    if let Some(session) = &page.platform.session {
        if let Err(err) = session.set(URGENCY_BAR_CLOSED_KEY, CLOSED) {
            warn!("Could not remember closed urgency bar: {}", err);
        }
    }
}

pub fn closed_this_session(page: &Page) -> bool {
    page.platform
        .session
        .as_ref()
        .and_then(|session| session.get(URGENCY_BAR_CLOSED_KEY))
        .is_some_and(|value| value == CLOSED)
}

pub fn init(page: &Rc<Page>) {
    let Some(bar) = page.elements.urgency_bar.as_ref() else {
        debug!("No urgency bar, skipping");
        return;
    };

    for button in bar.query_all(&page.config.selectors.urgency_close) {
        let page = Rc::clone(page);
        button.listen("click", Box::new(move |_: &dyn DomEvent| close(&page)));
    }

    if closed_this_session(page) {
        close(page);
    }
}
