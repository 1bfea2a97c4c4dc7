//! 领域仓储抽象
//!
//! 定义数据访问的抽象接口，遵循依赖倒置原则。持久化技术由外部决定，
//! 调度引擎只依赖这里的契约。

use async_trait::async_trait;
use triage_core::models::{
    Appointment, DoctorAvailability, EmergencyRequest, GeoNode, QueueEntry, QueueStatus,
};
use triage_core::TriageResult;

/// 队列记录仓储抽象
///
/// `create` 必须原子地分配 `id` 与参考序号 `position`（同一医生同一日期内的计数加一），
/// 并保证每个预约只有一条队列记录。
#[async_trait]
pub trait QueueRepository: Send + Sync {
    async fn create(&self, entry: &QueueEntry) -> TriageResult<QueueEntry>;
    async fn find_by_id(&self, id: i64) -> TriageResult<Option<QueueEntry>>;
    async fn find_by_appointment(&self, appointment_id: i64) -> TriageResult<Option<QueueEntry>>;
    async fn find_by_doctor(&self, doctor_id: i64) -> TriageResult<Vec<QueueEntry>>;
    async fn find_by_status(&self, status: QueueStatus) -> TriageResult<Vec<QueueEntry>>;
    /// 写锁内校验记录当前状态仍为 `expected`，否则返回 `InvalidTransition` 且不写入
    async fn update(&self, entry: &QueueEntry, expected: QueueStatus) -> TriageResult<QueueEntry>;
    /// 批量写入当前状态仍为 `expected` 的记录，返回实际写入的记录。
    /// 任一ID不存在时不写入任何记录。
    async fn update_many(
        &self,
        entries: &[QueueEntry],
        expected: QueueStatus,
    ) -> TriageResult<Vec<QueueEntry>>;
}

/// 预约仓储抽象
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn create(&self, appointment: &Appointment) -> TriageResult<Appointment>;
    async fn find_by_id(&self, id: i64) -> TriageResult<Option<Appointment>>;
    async fn update(&self, appointment: &Appointment) -> TriageResult<Appointment>;
    async fn delete(&self, id: i64) -> TriageResult<()>;
}

/// 医生出诊状态仓储抽象
#[async_trait]
pub trait DoctorRepository: Send + Sync {
    async fn upsert(&self, doctor: &DoctorAvailability) -> TriageResult<DoctorAvailability>;
    async fn find_by_id(&self, doctor_id: i64) -> TriageResult<Option<DoctorAvailability>>;
    async fn find_by_department(&self, department: &str) -> TriageResult<Vec<DoctorAvailability>>;
    async fn set_availability(
        &self,
        doctor_id: i64,
        is_available: bool,
    ) -> TriageResult<DoctorAvailability>;
}

/// 急救请求仓储抽象
#[async_trait]
pub trait EmergencyRepository: Send + Sync {
    async fn create(&self, request: &EmergencyRequest) -> TriageResult<EmergencyRequest>;
    async fn find_by_id(&self, id: i64) -> TriageResult<Option<EmergencyRequest>>;
    async fn update(&self, request: &EmergencyRequest) -> TriageResult<EmergencyRequest>;
}

/// 路况存储
///
/// 途经点的安全系数在进程生命周期内共享，更新对之后的所有路线计算生效。
/// 单个途经点的更新必须是原子的；整张表不要求原子快照。
pub trait RoadConditionsStore: Send + Sync {
    /// 当前途经点快照，顺序稳定
    fn snapshot(&self) -> Vec<GeoNode>;

    fn safety_factor(&self, waypoint_id: &str) -> Option<f64>;

    fn update_condition(&self, waypoint_id: &str, safety_factor: f64) -> TriageResult<()>;
}
