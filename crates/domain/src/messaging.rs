use async_trait::async_trait;
use triage_core::TriageResult;

use crate::events::DispatchEvent;

/// 调度事件广播端口
///
/// 由外部协作方实现（推送通道、消息总线等）。调用方以即发即弃的方式使用：
/// 发布失败只记录日志，不影响业务操作的结果。
#[async_trait]
pub trait DispatchBroadcaster: Send + Sync {
    async fn publish(&self, event: DispatchEvent) -> TriageResult<()>;
}
