//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod scrape_handlers;

pub use scrape_handlers::*;
