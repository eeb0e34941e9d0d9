//! JSON 文件存储
//!
//! 每个作品一个 `<key>.json`，失败记录为 `<key>.failed.json`

mod work_store;

pub use work_store::{sanitize_key, JsonWorkStore};
