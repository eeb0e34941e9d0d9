//! Event Publisher Implementation
//!
//! WebSocket 事件推送实现

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// WebSocket 事件类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum WsEvent {
    /// 作品文档已写入
    WorkUpdated {
        work_name: String,
        chapter_count: usize,
        appended: Vec<u32>,
        replaced: Vec<u32>,
    },
    /// 失败记录已写入
    FailuresRecorded {
        work_name: String,
        failure_count: usize,
        healed: usize,
    },
}

/// 事件发布器
pub struct EventPublisher {
    /// 全局广播通道
    global_channel: broadcast::Sender<WsEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (global_tx, _) = broadcast::channel(100);
        Self {
            global_channel: global_tx,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅全局事件
    pub fn subscribe_global(&self) -> broadcast::Receiver<WsEvent> {
        self.global_channel.subscribe()
    }

    /// 发布作品更新事件
    pub fn publish_work_updated(
        &self,
        work_name: &str,
        chapter_count: usize,
        appended: Vec<u32>,
        replaced: Vec<u32>,
    ) {
        self.publish(WsEvent::WorkUpdated {
            work_name: work_name.to_string(),
            chapter_count,
            appended,
            replaced,
        });
    }

    /// 发布失败记录事件
    pub fn publish_failures_recorded(&self, work_name: &str, failure_count: usize, healed: usize) {
        self.publish(WsEvent::FailuresRecorded {
            work_name: work_name.to_string(),
            failure_count,
            healed,
        });
    }

    fn publish(&self, event: WsEvent) {
        if let Err(e) = self.global_channel.send(event) {
            tracing::debug!(error = %e, "Failed to publish event (no receivers)");
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
