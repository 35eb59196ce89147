//! Mobile navigation menu: closed by default, opened by the toggle button,
//! closed again by the toggle, any nav link, or Escape.

use std::rc::Rc;

use log::debug;

use crate::dom::DomEvent;
use crate::page::Page;

pub const ACTIVE: &str = "active";

const ESCAPE: &str = "Escape";

pub fn toggle(page: &Page) {
    let open = {
        let mut state = page.state.borrow_mut();
        state.mobile_menu_open = !state.mobile_menu_open;
        state.mobile_menu_open
    };
    render(page, open);
}

pub fn close(page: &Page) {
    let was_open = std::mem::replace(&mut page.state.borrow_mut().mobile_menu_open, false);
    if was_open {
        render(page, false);
    }
}

pub fn handle_key(page: &Page, key: &str) {
    let open = page.state.borrow().mobile_menu_open;
    if key == ESCAPE && open {
        close(page);
    }
}

/// Applies `open` to the button, the panel and body scrolling.
fn render(page: &Page, open: bool) {
    if let Some(button) = &page.elements.mobile_menu_button {
        button.toggle_class(ACTIVE, open);
        button.set_attribute("aria-expanded", if open { "true" } else { "false" });
    }
    if let Some(menu) = &page.elements.mobile_menu {
        menu.toggle_class(ACTIVE, open);
    }
    if let Some(body) = page.platform.document.body() {
        body.set_style("overflow", if open { "hidden" } else { "" });
    }
}

pub fn init(page: &Rc<Page>) {
    match &page.elements.mobile_menu_button {
        Some(button) => {
            let page = Rc::clone(page);
            button.listen("click", Box::new(move |_: &dyn DomEvent| toggle(&page)));
        }
        None => debug!("No mobile menu button, toggle disabled"),
    }

    for link in &page.elements.nav_links {
        let page = Rc::clone(page);
        link.listen("click", Box::new(move |_: &dyn DomEvent| close(&page)));
    }

    let keys = Rc::clone(page);
    page.platform.document.listen(
        "keydown",
        Box::new(move |event: &dyn DomEvent| {
            if let Some(key) = event.key() {
                handle_key(&keys, &key);
            }
        }),
    );
}
