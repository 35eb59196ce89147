pub mod config;
pub mod dom;
pub mod error;
pub mod page;
pub mod timing;

pub mod components {
    pub mod accessibility;
    pub mod cta;
    pub mod faq;
    pub mod lazy_load;
    pub mod mobile_menu;
    pub mod reveal;
    pub mod scroll;
    pub mod smooth_scroll;
    pub mod urgency_bar;
}
