//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod extract;
pub mod fetch;

pub use extract::*;
pub use fetch::*;
