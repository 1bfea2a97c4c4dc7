use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use triage_dispatcher::{DispatchService, QueueService};
use triage_infrastructure::ChannelBroadcaster;

use crate::handlers::{
    doctors::{call_next, get_doctor_queue, set_availability},
    emergencies::{accept_emergency, create_emergency},
    events::event_stream,
    health::health_check,
    queue::{book_appointment, call_entry, check_in_entry, complete_entry, decline_entry, skip_entry},
    routing::{calculate_route, list_waypoints, update_traffic},
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub queue_service: Arc<QueueService>,
    pub dispatch_service: Arc<DispatchService>,
    pub broadcaster: ChannelBroadcaster,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // 挂号与队列
        .route("/api/bookings", post(book_appointment))
        .route("/api/doctors/{id}/queue", get(get_doctor_queue))
        .route("/api/doctors/{id}/availability", post(set_availability))
        .route("/api/doctors/{id}/call-next", post(call_next))
        .route("/api/queue/{id}/call", post(call_entry))
        .route("/api/queue/{id}/complete", post(complete_entry))
        .route("/api/queue/{id}/skip", post(skip_entry))
        .route("/api/queue/{id}/decline", post(decline_entry))
        .route("/api/queue/{id}/check-in", post(check_in_entry))
        // 急救调度
        .route("/api/emergencies", post(create_emergency))
        .route("/api/emergencies/{id}/accept", post(accept_emergency))
        .route("/api/routes/calculate", post(calculate_route))
        .route("/api/routes/waypoints", get(list_waypoints))
        .route("/api/traffic", post(update_traffic))
        // 实时事件
        .route("/api/events", get(event_stream))
        .with_state(state)
}
