use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{TriageError, TriageResult};

/// 临床优先级类别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PriorityCategory {
    Emergency,
    Maternity,
    Senior,
    Infant,
    General,
}

impl PriorityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityCategory::Emergency => "emergency",
            PriorityCategory::Maternity => "maternity",
            PriorityCategory::Senior => "senior",
            PriorityCategory::Infant => "infant",
            PriorityCategory::General => "general",
        }
    }
}

impl fmt::Display for PriorityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 队列记录状态
///
/// 采用人工叫号模式：
///
/// ```text
/// Waiting → Called → Completed
///    │        ├────→ Skipped ──┐
///    │        └────→ Declined  │
///    ├────→ Declined           │
///    └────→ Missed ────────────┴──→ Waiting (重新签到)
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Waiting,
    Called,
    Completed,
    Skipped,
    Declined,
    Missed,
}

impl QueueStatus {
    pub fn can_transition_to(&self, next: QueueStatus) -> bool {
        use QueueStatus::*;
        matches!(
            (self, next),
            (Waiting, Called)
                | (Waiting, Declined)
                | (Waiting, Missed)
                | (Called, Completed)
                | (Called, Skipped)
                | (Called, Declined)
                | (Missed, Waiting)
                | (Skipped, Waiting)
        )
    }
}

/// 患者在某位医生队列中的一条记录
///
/// - `priority_score` 只在预约时根据患者属性计算一次，之后不会被隐式重算
/// - `position` 是预约时分配的参考序号，真实排名在每次读取时重新计算
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueEntry {
    pub id: i64,
    pub appointment_id: i64,
    pub doctor_id: i64,
    pub patient_id: i64,
    /// 队列所属日期，参考序号按医生加日期分别计数
    pub queue_date: NaiveDate,
    pub priority_category: PriorityCategory,
    pub priority_score: u8,
    pub position: u32,
    pub status: QueueStatus,
    pub checked_in_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn is_waiting(&self) -> bool {
        self.status == QueueStatus::Waiting
    }

    /// 校验并执行状态转换
    pub fn transition_to(&mut self, next: QueueStatus) -> TriageResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(TriageError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// 预约记录，镜像队列状态用于报表
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    /// 预约时间缺失或无法解析时为 `None`，此类预约永不过期
    pub scheduled_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub status: QueueStatus,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// 预约时间加宽限期之后仍未就诊则视为过号
    pub fn is_overdue(&self, now: DateTime<Utc>, grace: Duration) -> bool {
        match self.scheduled_at {
            Some(at) => at + grace < now,
            None => false,
        }
    }

    /// 按预约时间排序，无时间的排在最后
    pub fn compare_by_schedule(a: &Appointment, b: &Appointment) -> Ordering {
        match (a.scheduled_at, b.scheduled_at) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.id.cmp(&b.id)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        }
    }
}

/// 医生出诊状态
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoctorAvailability {
    pub doctor_id: i64,
    pub name: String,
    pub department: String,
    pub is_available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn appointment(id: i64, scheduled_at: Option<DateTime<Utc>>) -> Appointment {
        Appointment {
            id,
            patient_id: 1,
            doctor_id: 1,
            appointment_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            scheduled_at,
            reason: None,
            status: QueueStatus::Waiting,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_transitions() {
        assert!(QueueStatus::Waiting.can_transition_to(QueueStatus::Called));
        assert!(QueueStatus::Called.can_transition_to(QueueStatus::Completed));
        assert!(QueueStatus::Missed.can_transition_to(QueueStatus::Waiting));
        assert!(!QueueStatus::Completed.can_transition_to(QueueStatus::Waiting));
        assert!(!QueueStatus::Waiting.can_transition_to(QueueStatus::Completed));
        assert!(!QueueStatus::Declined.can_transition_to(QueueStatus::Called));
    }

    #[test]
    fn test_missing_schedule_never_expires() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();
        let grace = Duration::minutes(15);

        let open = appointment(1, None);
        assert!(!open.is_overdue(now, grace));

        let late = appointment(2, Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()));
        assert!(late.is_overdue(now, grace));

        let within_grace = appointment(3, Some(now - Duration::minutes(10)));
        assert!(!within_grace.is_overdue(now, grace));
    }

    #[test]
    fn test_missing_schedule_sorts_last() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let mut list = vec![appointment(1, None), appointment(2, Some(t)), appointment(3, None)];
        list.sort_by(Appointment::compare_by_schedule);
        let ids: Vec<i64> = list.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&PriorityCategory::Maternity).unwrap();
        assert_eq!(json, "\"maternity\"");
        let status: QueueStatus = serde_json::from_str("\"missed\"").unwrap();
        assert_eq!(status, QueueStatus::Missed);
    }
}
