use tracing::debug;

use triage_core::models::{DoctorAvailability, QueueEntry};

/// 替班医生选择策略
pub trait ReassignmentStrategy: Send + Sync {
    /// 为即将停诊的医生选择至多一位替班医生
    fn select_alternate<'a>(
        &self,
        departing: &DoctorAvailability,
        candidates: &'a [DoctorAvailability],
    ) -> Option<&'a DoctorAvailability>;

    /// 获取策略名称
    fn name(&self) -> &str;
}

/// 同科室、在岗、非本人的医生中选择ID最小的一位
pub struct SameDepartmentStrategy;

impl SameDepartmentStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SameDepartmentStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ReassignmentStrategy for SameDepartmentStrategy {
    fn select_alternate<'a>(
        &self,
        departing: &DoctorAvailability,
        candidates: &'a [DoctorAvailability],
    ) -> Option<&'a DoctorAvailability> {
        let selected = candidates
            .iter()
            .filter(|doctor| {
                doctor.doctor_id != departing.doctor_id
                    && doctor.is_available
                    && doctor.department == departing.department
            })
            .min_by_key(|doctor| doctor.doctor_id);

        match selected {
            Some(doctor) => debug!(
                "同科室策略为医生 {} 选择替班医生 {} (科室: {})",
                departing.doctor_id, doctor.doctor_id, departing.department
            ),
            None => debug!(
                "科室 {} 中没有可替班的在岗医生",
                departing.department
            ),
        }

        selected
    }

    fn name(&self) -> &str {
        "SameDepartment"
    }
}

/// 队列记录转移
pub struct QueueReassigner;

impl QueueReassigner {
    /// 返回把每条记录的 `doctor_id` 替换为新医生后的副本
    pub fn reassign(entries: &[QueueEntry], new_doctor_id: i64) -> Vec<QueueEntry> {
        entries
            .iter()
            .cloned()
            .map(|mut entry| {
                entry.doctor_id = new_doctor_id;
                entry
            })
            .collect()
    }

    /// 某位医生名下仍在等待的记录
    pub fn waiting_entries_of(entries: &[QueueEntry], doctor_id: i64) -> Vec<QueueEntry> {
        entries
            .iter()
            .filter(|entry| entry.doctor_id == doctor_id && entry.is_waiting())
            .cloned()
            .collect()
    }
}
