//! 领域事件
//!
//! 调度引擎只产生事件，不负责推送通道。事件的载荷形状固定为
//! `{"type": "QUEUE_CHANGED", "doctor_id": ..}` 与 `{"type": "ROUTE_COMPUTED", "emergency_id": ..}`。

use serde::{Deserialize, Serialize};

/// 领域事件基础trait
pub trait DomainEvent: Send + Sync {
    fn event_type(&self) -> &str;
    fn aggregate_id(&self) -> String;
}

/// 推送给实时客户端的调度事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchEvent {
    QueueChanged { doctor_id: i64 },
    RouteComputed { emergency_id: i64 },
}

impl DomainEvent for DispatchEvent {
    fn event_type(&self) -> &str {
        match self {
            DispatchEvent::QueueChanged { .. } => "QUEUE_CHANGED",
            DispatchEvent::RouteComputed { .. } => "ROUTE_COMPUTED",
        }
    }

    fn aggregate_id(&self) -> String {
        match self {
            DispatchEvent::QueueChanged { doctor_id } => doctor_id.to_string(),
            DispatchEvent::RouteComputed { emergency_id } => emergency_id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_queue_changed_payload_shape() {
        let event = DispatchEvent::QueueChanged { doctor_id: 42 };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "QUEUE_CHANGED", "doctor_id": 42})
        );
        assert_eq!(event.event_type(), "QUEUE_CHANGED");
        assert_eq!(event.aggregate_id(), "42");
    }

    #[test]
    fn test_route_computed_payload_shape() {
        let event = DispatchEvent::RouteComputed { emergency_id: 7 };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "ROUTE_COMPUTED", "emergency_id": 7})
        );

        let parsed: DispatchEvent =
            serde_json::from_value(json!({"type": "ROUTE_COMPUTED", "emergency_id": 7})).unwrap();
        assert_eq!(parsed, event);
    }
}
