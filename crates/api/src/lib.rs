//! # Triage API
//!
//! 门诊分诊与急救调度的REST接口，基于Axum构建。
//!
//! ## API 端点
//!
//! ### 挂号与队列
//! - `POST /api/bookings` - 挂号入队，返回优先级与预计等待时间
//! - `GET /api/doctors/{id}/queue?date=YYYY-MM-DD` - 医生的等待队列（实时排名）
//! - `POST /api/doctors/{id}/availability` - 切换出诊状态，停诊时转移患者
//! - `POST /api/doctors/{id}/call-next` - 叫下一位
//! - `POST /api/queue/{id}/{call,complete,skip,decline,check-in}` - 队列状态流转
//!
//! ### 急救调度
//! - `POST /api/emergencies` - 登记急救请求
//! - `POST /api/emergencies/{id}/accept` - 司机接单并计算路线
//! - `POST /api/routes/calculate` - 临时路线计算
//! - `GET /api/routes/waypoints` - 当前途经点与路况
//! - `POST /api/traffic` - 更新途经点路况（202）
//!
//! ### 实时事件
//! - `GET /api/events` - `QUEUE_CHANGED` / `ROUTE_COMPUTED` 事件的 SSE 推送
//!
//! ## 响应格式
//!
//! 成功响应统一为 `{"success": true, "data": ..., "message": ..., "timestamp": ...}`；
//! 错误响应为 `{"error": {"message", "type", "code", "suggestions", "timestamp"}}`。
//!
//! ```bash
//! curl -X POST http://localhost:8080/api/bookings \
//!   -H "Content-Type: application/json" \
//!   -d '{"patient_id": 1, "age": 72, "gender": "female", "doctor_id": 1,
//!        "appointment_date": "2024-05-01", "appointment_time": "09:30"}'
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;

use middleware::{cors_layer, request_logging, timeout_layer, trace_layer};
use routes::{create_routes, AppState};
use triage_core::ApiConfig;
use triage_dispatcher::{DispatchService, QueueService};
use triage_infrastructure::ChannelBroadcaster;

/// 创建完整的API应用
pub fn create_app(
    queue_service: Arc<QueueService>,
    dispatch_service: Arc<DispatchService>,
    broadcaster: ChannelBroadcaster,
    api_config: &ApiConfig,
) -> Router {
    let state = AppState {
        queue_service,
        dispatch_service,
        broadcaster,
    };

    let router = create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(timeout_layer(api_config))
            .layer(axum::middleware::from_fn(request_logging)),
    );

    if api_config.cors_enabled {
        router.layer(cors_layer(api_config))
    } else {
        router
    }
}
