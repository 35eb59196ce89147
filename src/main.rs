use log::{error, info};

use upsell_page::config;
use upsell_page::dom::web;
use upsell_page::page::{self, Page};

fn start() {
    let platform = match web::platform() {
        Ok(platform) => platform,
        Err(err) => {
            error!("Page enhancements disabled: {}", err);
            return;
        }
    };
    let config = page::load_config(platform.document.as_ref());
    let page = Page::new(platform, config);
    page::init(&page);
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    if let Err(err) = console_log::init_with_level(config::log_level()) {
        web_sys::console::warn_1(&format!("Logger not initialised: {err}").into());
    }

    info!("Starting upsell page");
    if let Err(err) = web::when_ready(start) {
        error!("Page enhancements disabled: {}", err);
    }
}
