//! FAQ entries are native `<details>` elements and open and close on their
//! own. Each summary only gets a click hook for instrumentation.

use std::rc::Rc;

use log::{debug, trace};

use crate::dom::DomEvent;
use crate::page::Page;

const SUMMARY: &str = "summary";

pub fn init(page: &Rc<Page>) {
    for item in &page.elements.faq_items {
        let Some(summary) = item.query(SUMMARY) else {
            debug!("FAQ item without summary, skipping");
            continue;
        };
        summary.listen("click", Box::new(|_: &dyn DomEvent| trace!("FAQ item toggled")));
    }
}
