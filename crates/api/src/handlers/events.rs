use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use triage_domain::DomainEvent;

use crate::routes::AppState;

/// 调度事件的 SSE 推送，事件名为事件类型，数据为 JSON 载荷
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let receiver = state.broadcaster.subscribe();
    debug!("新的事件订阅者接入");

    let stream = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let sse = Event::default().event(event.event_type()).json_data(&event);
                    return Some((sse, receiver));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("事件订阅者处理过慢，丢弃 {} 条事件", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
