//! Events - 事件推送
//!
//! - publisher: 全局 WebSocket 事件（作品更新、失败记录）
//! - progress: 单次运行的进度通道（SSE）

mod progress;
mod publisher;

pub use progress::ChannelProgressSink;
pub use publisher::{EventPublisher, WsEvent};
