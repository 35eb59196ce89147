use log::Level;
use serde::Deserialize;

use crate::error::PageError;

/// Element holding optional JSON overrides for [`PageConfig`].
pub const CONFIG_SELECTOR: &str = "script#page-config";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Local builds via `trunk serve`
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct PageConfig {
    pub selectors: Selectors,
    pub scroll: ScrollConfig,
    pub layout: LayoutConfig,
    pub skip_link: SkipLinkConfig,
    pub analytics: AnalyticsConfig,
    pub lazy_images: LazyImageConfig,
    pub motion: MotionConfig,
}

impl PageConfig {
    pub fn from_json(json: &str) -> Result<Self, PageError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub header: String,
    pub urgency_bar: String,
    /// Searched inside the urgency bar.
    pub urgency_close: String,
    pub mobile_menu_button: String,
    pub mobile_menu: String,
    pub floating_cta: String,
    pub pricing_section: String,
    pub faq_items: String,
    pub animated: String,
    pub nav_links: String,
    pub cta_button: String,
    pub anchors: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            header: ".header".to_string(),
            urgency_bar: "#urgencyBar".to_string(),
            urgency_close: ".urgency-close".to_string(),
            mobile_menu_button: ".mobile-menu-btn".to_string(),
            mobile_menu: "#mobileMenu".to_string(),
            floating_cta: "#floatingCta".to_string(),
            pricing_section: "#investimento".to_string(),
            faq_items: ".faq-item".to_string(),
            animated: "[data-aos]".to_string(),
            nav_links: ".nav-link, .mobile-nav-link".to_string(),
            cta_button: "#cta-button".to_string(),
            anchors: "a[href^=\"#\"]".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Offset past which the header is "scrolled" and the banner tucks away.
    pub header_threshold: f64,
    /// Offset past which the floating CTA may show.
    pub floating_cta_threshold: f64,
    pub throttle_ms: u32,
    /// Breathing room left above an anchor target.
    pub anchor_padding: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            header_threshold: 50.0,
            floating_cta_threshold: 500.0,
            throttle_ms: 50,
            anchor_padding: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Header `top` once the banner is closed.
    pub header_top: String,
    /// Mobile menu `top` once the banner is closed.
    pub menu_top: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            header_top: "0".to_string(),
            menu_top: "64px".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SkipLinkConfig {
    pub target: String,
    pub label: String,
    pub class_name: String,
    pub hidden_top: String,
    pub focused_top: String,
}

impl Default for SkipLinkConfig {
    fn default() -> Self {
        Self {
            target: "#hero".to_string(),
            label: "Pular para o conteúdo principal".to_string(),
            class_name: "sr-only".to_string(),
            hidden_top: "-100px".to_string(),
            focused_top: "10px".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub action: String,
    pub category: String,
    pub label: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            action: "click".to_string(),
            category: "CTA".to_string(),
            label: "Upsell - Método NPK".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LazyImageConfig {
    /// When the browser lazy-loads natively, copy `data-src` into `src`
    /// right away anyway. `false` leaves deferral to the browser.
    pub eager_native_assign: bool,
}

impl Default for LazyImageConfig {
    fn default() -> Self {
        Self {
            eager_native_assign: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Custom properties zeroed when the user prefers reduced motion.
    pub transition_variables: Vec<String>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            transition_variables: vec![
                "--transition-fast".to_string(),
                "--transition-base".to_string(),
                "--transition-slow".to_string(),
            ],
        }
    }
}
