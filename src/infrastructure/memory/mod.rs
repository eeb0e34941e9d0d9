//! Memory Layer - In-Memory State Management
//!
//! 内存作品存储，用于 `memory` 后端和测试

mod work_store;

pub use work_store::InMemoryWorkStore;
