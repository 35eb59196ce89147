use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, warn};

use crate::components::{
    accessibility, cta, faq, lazy_load, mobile_menu, reveal, scroll, smooth_scroll, urgency_bar,
};
use crate::config::{PageConfig, Selectors, CONFIG_SELECTOR};
use crate::dom::{Document, Handle, Platform};

/// Session storage key; `"true"` means the visitor dismissed the banner.
pub const URGENCY_BAR_CLOSED_KEY: &str = "urgencyBarClosed";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageState {
    pub urgency_bar_closed: bool,
    pub mobile_menu_open: bool,
    /// Recorded on every handled scroll. Nothing reads direction from it yet.
    pub last_scroll_y: f64,
}

/// Elements looked up once at startup. Any of them may be missing.
#[derive(Default)]
pub struct Elements {
    pub header: Option<Handle>,
    pub urgency_bar: Option<Handle>,
    pub mobile_menu_button: Option<Handle>,
    pub mobile_menu: Option<Handle>,
    pub floating_cta: Option<Handle>,
    pub pricing_section: Option<Handle>,
    pub faq_items: Vec<Handle>,
    pub animated: Vec<Handle>,
    pub nav_links: Vec<Handle>,
    pub cta_button: Option<Handle>,
}

impl Elements {
    pub fn collect(document: &dyn Document, selectors: &Selectors) -> Self {
        Self {
            header: document.query(&selectors.header),
            urgency_bar: document.query(&selectors.urgency_bar),
            mobile_menu_button: document.query(&selectors.mobile_menu_button),
            mobile_menu: document.query(&selectors.mobile_menu),
            floating_cta: document.query(&selectors.floating_cta),
            pricing_section: document.query(&selectors.pricing_section),
            faq_items: document.query_all(&selectors.faq_items),
            animated: document.query_all(&selectors.animated),
            nav_links: document.query_all(&selectors.nav_links),
            cta_button: document.query(&selectors.cta_button),
        }
    }
}

/// Everything a component needs, passed explicitly.
pub struct Page {
    pub platform: Platform,
    pub config: PageConfig,
    pub elements: Elements,
    pub state: RefCell<PageState>,
}

impl Page {
    pub fn new(platform: Platform, config: PageConfig) -> Rc<Self> {
        let elements = Elements::collect(platform.document.as_ref(), &config.selectors);
        Rc::new(Self {
            platform,
            config,
            elements,
            state: RefCell::new(PageState::default()),
        })
    }
}

/// Reads overrides from `script#page-config`, falling back to defaults.
pub fn load_config(document: &dyn Document) -> PageConfig {
    let Some(json) = document.query(CONFIG_SELECTOR).and_then(|node| node.text()) else {
        return PageConfig::default();
    };
    match PageConfig::from_json(&json) {
        Ok(config) => {
            debug!("Loaded page config overrides");
            config
        }
        Err(err) => {
            warn!("Ignoring page config: {}", err);
            PageConfig::default()
        }
    }
}

pub fn init(page: &Rc<Page>) {
    urgency_bar::init(page);
    mobile_menu::init(page);
    scroll::init(page);
    smooth_scroll::init(page);
    reveal::init(page);
    faq::init(page);
    cta::init(page);
    lazy_load::init(page);
    accessibility::init(page);

    info!("Upsell page initialised");
}
