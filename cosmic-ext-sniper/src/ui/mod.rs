//! UI view modules.

pub mod timer_page;
