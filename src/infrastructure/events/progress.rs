//! Channel Progress Sink - 把运行进度写入 mpsc 通道，供 SSE 消费

use tokio::sync::mpsc;

use crate::application::ports::{ProgressSink, ScrapeEvent};

pub struct ChannelProgressSink {
    tx: mpsc::UnboundedSender<ScrapeEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::UnboundedSender<ScrapeEvent>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ScrapeEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: ScrapeEvent) {
        // 接收端已关闭说明客户端断开，丢弃即可
        if self.tx.send(event).is_err() {
            tracing::debug!("Progress receiver dropped");
        }
    }
}
