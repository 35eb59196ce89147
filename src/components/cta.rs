use std::rc::Rc;

use log::{debug, warn};

use crate::config::AnalyticsConfig;
use crate::dom::{Analytics, AnalyticsEvent, DomEvent, EventParams};
use crate::error::PageError;
use crate::page::Page;

pub fn click_event(config: &AnalyticsConfig) -> AnalyticsEvent {
    AnalyticsEvent {
        action: config.action.clone(),
        params: EventParams {
            event_category: config.category.clone(),
            event_label: config.label.clone(),
        },
    }
}

/// Sends `event` if the tag has loaded. `Ok(false)` means there was no tag.
pub fn report_click(analytics: &dyn Analytics, event: &AnalyticsEvent) -> Result<bool, PageError> {
    let Some(tracker) = analytics.tracker() else {
        return Ok(false);
    };
    tracker.send(event)?;
    Ok(true)
}

/// Reports CTA clicks to analytics. Navigation itself is a plain link.
pub fn init(page: &Rc<Page>) {
    let Some(button) = &page.elements.cta_button else {
        debug!("No CTA button, click tracking disabled");
        return;
    };

    let analytics = Rc::clone(&page.platform.analytics);
    let event = click_event(&page.config.analytics);
    button.listen(
        "click",
        Box::new(move |_: &dyn DomEvent| match report_click(analytics.as_ref(), &event) {
            Ok(true) => {}
            Ok(false) => debug!("gtag not loaded, CTA click not tracked"),
            Err(err) => warn!("CTA click not tracked: {}", err),
        }),
    );
}
