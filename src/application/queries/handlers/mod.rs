//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod work_handlers;

pub use work_handlers::*;
