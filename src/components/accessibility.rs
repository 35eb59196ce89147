use std::rc::Rc;

use log::debug;

use crate::dom::{DomEvent, Handle};
use crate::page::Page;

const SKIP_LINK_STYLE: [(&str, &str); 8] = [
    ("position", "fixed"),
    ("left", "10px"),
    ("z-index", "9999"),
    ("padding", "10px 20px"),
    ("background", "var(--color-primary)"),
    ("color", "white"),
    ("border-radius", "4px"),
    ("transition", "top 0.2s"),
];

const NO_TRANSITION: &str = "0ms";

/// Puts a "skip to main content" link first in `<body>`, parked off-screen
/// until it takes keyboard focus.
pub fn insert_skip_link(page: &Page) -> Option<Handle> {
    let document = &page.platform.document;
    let body = document.body()?;
    let link = document.create_element("a")?;
    let settings = &page.config.skip_link;

    link.set_attribute("href", &settings.target);
    link.add_class(&settings.class_name);
    link.set_text(&settings.label);
    link.set_style("top", &settings.hidden_top);
    for (property, value) in SKIP_LINK_STYLE {
        link.set_style(property, value);
    }

    for (event, top) in [
        ("focus", settings.focused_top.clone()),
        ("blur", settings.hidden_top.clone()),
    ] {
        let target = Rc::clone(&link);
        link.listen(
            event,
            Box::new(move |_: &dyn DomEvent| target.set_style("top", &top)),
        );
    }

    body.prepend(&link);
    Some(link)
}

/// Zeroes the transition duration variables for the rest of the page.
pub fn reduce_motion(page: &Page) {
    let Some(root) = page.platform.document.root() else {
        return;
    };
    for variable in &page.config.motion.transition_variables {
        root.set_style(variable, NO_TRANSITION);
    }
}

pub fn init(page: &Rc<Page>) {
    if insert_skip_link(page).is_none() {
        debug!("Skip link not inserted");
    }
    if page.platform.capabilities.prefers_reduced_motion {
        reduce_motion(page);
        debug!("Reduced motion requested, transitions disabled");
    }
}
