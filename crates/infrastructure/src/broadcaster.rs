use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use triage_core::TriageResult;
use triage_domain::{DispatchBroadcaster, DispatchEvent, DomainEvent};

/// 基于 Tokio broadcast 通道的事件广播
///
/// 没有订阅者时事件直接丢弃；订阅者落后超过通道容量时会丢失最旧的事件。
#[derive(Debug, Clone)]
pub struct ChannelBroadcaster {
    sender: broadcast::Sender<DispatchEvent>,
}

impl ChannelBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl DispatchBroadcaster for ChannelBroadcaster {
    async fn publish(&self, event: DispatchEvent) -> TriageResult<()> {
        match self.sender.send(event.clone()) {
            Ok(receivers) => debug!(
                "事件 {} (对象 {}) 已发送给 {} 个订阅者",
                event.event_type(),
                event.aggregate_id(),
                receivers
            ),
            Err(_) => debug!("事件 {} 没有订阅者，已丢弃", event.event_type()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let broadcaster = ChannelBroadcaster::new(8);
        let mut rx = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 1);

        broadcaster
            .publish(DispatchEvent::QueueChanged { doctor_id: 3 })
            .await
            .unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            DispatchEvent::QueueChanged { doctor_id: 3 }
        );
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let broadcaster = ChannelBroadcaster::new(8);
        assert!(broadcaster
            .publish(DispatchEvent::RouteComputed { emergency_id: 1 })
            .await
            .is_ok());
    }
}
