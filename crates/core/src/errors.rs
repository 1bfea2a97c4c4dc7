use thiserror::Error;

use crate::models::QueueStatus;

/// 分诊引擎错误类型定义
///
/// 只有输入错误和状态错误才会出现在这里。不可达路径、找不到替班医生
/// 这类预期内的软失败通过正常返回值表达。
#[derive(Debug, Error)]
pub enum TriageError {
    #[error("无效的输入: {0}")]
    InvalidInput(String),

    #[error("医生未找到: {id}")]
    DoctorNotFound { id: i64 },

    #[error("队列记录未找到: {id}")]
    QueueEntryNotFound { id: i64 },

    #[error("预约未找到: {id}")]
    AppointmentNotFound { id: i64 },

    #[error("急救请求未找到: {id}")]
    EmergencyNotFound { id: i64 },

    #[error("路网中不存在节点: {id}")]
    UnknownNode { id: String },

    #[error("路况表中不存在途经点: {id}")]
    UnknownWaypoint { id: String },

    #[error("无效的队列状态转换: {from:?} -> {to:?}")]
    InvalidTransition { from: QueueStatus, to: QueueStatus },

    #[error("预约 {appointment_id} 已存在队列记录")]
    DuplicateQueueEntry { appointment_id: i64 },

    #[error("事件广播错误: {0}")]
    Broadcast(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl TriageError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        TriageError::InvalidInput(message.into())
    }

    /// 是否属于调用方输入导致的错误
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TriageError::InvalidInput(_)
                | TriageError::UnknownNode { .. }
                | TriageError::UnknownWaypoint { .. }
                | TriageError::InvalidTransition { .. }
                | TriageError::DuplicateQueueEntry { .. }
        )
    }
}

impl From<serde_json::Error> for TriageError {
    fn from(err: serde_json::Error) -> Self {
        TriageError::Serialization(err.to_string())
    }
}

/// 统一的Result类型
pub type TriageResult<T> = std::result::Result<T, TriageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TriageError::DoctorNotFound { id: 7 };
        assert_eq!(err.to_string(), "医生未找到: 7");

        let err = TriageError::InvalidTransition {
            from: QueueStatus::Completed,
            to: QueueStatus::Called,
        };
        assert!(err.to_string().contains("Completed"));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(TriageError::invalid_input("年龄不能为负数").is_client_error());
        assert!(TriageError::UnknownNode { id: "x".to_string() }.is_client_error());
        assert!(!TriageError::QueueEntryNotFound { id: 1 }.is_client_error());
        assert!(!TriageError::Internal("boom".to_string()).is_client_error());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: TriageError = json_err.into();
        assert!(matches!(err, TriageError::Serialization(_)));
    }
}
