use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use triage_core::models::{
    Appointment, Gender, PatientAttributes, PriorityCategory, QueueEntry, QueueStatus,
};
use triage_core::{QueueConfig, TriageError, TriageResult};
use triage_domain::{
    AppointmentRepository, DispatchBroadcaster, DispatchEvent, DomainEvent, DoctorRepository,
    QueueRepository,
};

use crate::ordering::QueueOrderer;
use crate::priority::PriorityScorer;
use crate::reassign::{QueueReassigner, ReassignmentStrategy};

/// 预约挂号请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub patient_id: i64,
    /// 缺失时使用 `queue.default_age`
    #[serde(default)]
    pub age: Option<i32>,
    pub gender: Gender,
    #[serde(default)]
    pub is_emergency: bool,
    #[serde(default)]
    pub is_maternity: bool,
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    /// `HH:MM` 或 `HH:MM:SS`
    #[serde(default)]
    pub appointment_time: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// 预约确认
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingConfirmation {
    pub appointment_id: i64,
    pub queue_entry_id: i64,
    pub priority_category: PriorityCategory,
    pub priority_score: u8,
    /// 预约时刻的真实排名
    pub queue_position: u32,
    pub estimated_wait_minutes: i64,
}

/// 医生队列视图中的一行
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueViewRow {
    pub entry_id: i64,
    pub appointment_id: i64,
    pub patient_id: i64,
    pub priority_category: PriorityCategory,
    pub priority_score: u8,
    pub rank: u32,
    pub position: u32,
    pub estimated_wait_minutes: i64,
    pub checked_in_at: DateTime<Utc>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// 出诊状态切换结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityOutcome {
    pub doctor_id: i64,
    pub is_available: bool,
    pub reassigned_to: Option<i64>,
    pub moved_entries: usize,
}

/// 门诊队列服务
///
/// 负责挂号入队、队列读取、叫号状态机、过号扫描以及医生停诊时的队列转移。
/// 每次变更都会把状态同步到对应预约，并发布 `QUEUE_CHANGED` 事件。
pub struct QueueService {
    queue_repo: Arc<dyn QueueRepository>,
    appointment_repo: Arc<dyn AppointmentRepository>,
    doctor_repo: Arc<dyn DoctorRepository>,
    broadcaster: Arc<dyn DispatchBroadcaster>,
    reassignment_strategy: Arc<dyn ReassignmentStrategy>,
    config: QueueConfig,
}

impl QueueService {
    pub fn new(
        queue_repo: Arc<dyn QueueRepository>,
        appointment_repo: Arc<dyn AppointmentRepository>,
        doctor_repo: Arc<dyn DoctorRepository>,
        broadcaster: Arc<dyn DispatchBroadcaster>,
        reassignment_strategy: Arc<dyn ReassignmentStrategy>,
        config: QueueConfig,
    ) -> Self {
        Self {
            queue_repo,
            appointment_repo,
            doctor_repo,
            broadcaster,
            reassignment_strategy,
            config,
        }
    }

    pub async fn book(&self, request: BookingRequest) -> TriageResult<BookingConfirmation> {
        let age = self.resolve_age(request.age)?;
        self.require_doctor(request.doctor_id).await?;

        let mut attributes = PatientAttributes::new(age, request.gender);
        attributes.is_emergency = request.is_emergency;
        attributes.is_maternity = request.is_maternity;
        let assessment = PriorityScorer::score(&attributes);

        let now = Utc::now();
        let scheduled_at =
            parse_scheduled_at(request.appointment_date, request.appointment_time.as_deref());

        let appointment = self
            .appointment_repo
            .create(&Appointment {
                id: 0,
                patient_id: request.patient_id,
                doctor_id: request.doctor_id,
                appointment_date: request.appointment_date,
                scheduled_at,
                reason: request.reason.clone(),
                status: QueueStatus::Waiting,
                created_at: now,
            })
            .await?;

        let created = self
            .queue_repo
            .create(&QueueEntry {
                id: 0,
                appointment_id: appointment.id,
                doctor_id: request.doctor_id,
                patient_id: request.patient_id,
                queue_date: request.appointment_date,
                priority_category: assessment.category,
                priority_score: assessment.score,
                position: 0,
                status: QueueStatus::Waiting,
                checked_in_at: now,
            })
            .await;
        let entry = match created {
            Ok(entry) => entry,
            Err(e) => {
                // 入队失败时撤销刚创建的预约
                if let Err(rollback) = self.appointment_repo.delete(appointment.id).await {
                    warn!("撤销预约 {} 失败: {}", appointment.id, rollback);
                }
                return Err(e);
            }
        };

        let others: Vec<QueueEntry> = self
            .waiting_entries(request.doctor_id, request.appointment_date)
            .await?
            .into_iter()
            .filter(|existing| existing.id != entry.id)
            .collect();
        let sorted = QueueOrderer::insert(&QueueOrderer::sort(&others), entry.clone());
        let rank = QueueOrderer::rank_of(&sorted, entry.id).unwrap_or(sorted.len()) as u32;

        info!(
            "患者 {} 挂号成功: 医生 {}, 类别 {}, 分数 {}, 排名 {}",
            request.patient_id, request.doctor_id, assessment.category, assessment.score, rank
        );
        self.publish(DispatchEvent::QueueChanged {
            doctor_id: request.doctor_id,
        })
        .await;

        Ok(BookingConfirmation {
            appointment_id: appointment.id,
            queue_entry_id: entry.id,
            priority_category: assessment.category,
            priority_score: assessment.score,
            queue_position: rank,
            estimated_wait_minutes: self.estimate_wait(rank),
        })
    }

    /// 医生当日（或指定日期）的等待队列，排名每次读取时重新计算
    pub async fn doctor_queue(
        &self,
        doctor_id: i64,
        date: Option<NaiveDate>,
    ) -> TriageResult<Vec<QueueViewRow>> {
        self.require_doctor(doctor_id).await?;
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let sorted = QueueOrderer::sort(&self.waiting_entries(doctor_id, date).await?);

        let mut rows = Vec::with_capacity(sorted.len());
        for (index, entry) in sorted.into_iter().enumerate() {
            let rank = index as u32 + 1;
            let scheduled_at = self
                .appointment_repo
                .find_by_id(entry.appointment_id)
                .await?
                .and_then(|appointment| appointment.scheduled_at);
            rows.push(QueueViewRow {
                entry_id: entry.id,
                appointment_id: entry.appointment_id,
                patient_id: entry.patient_id,
                priority_category: entry.priority_category,
                priority_score: entry.priority_score,
                rank,
                position: entry.position,
                estimated_wait_minutes: self.estimate_wait(rank),
                checked_in_at: entry.checked_in_at,
                scheduled_at,
            });
        }

        debug!("医生 {} 在 {} 的等待队列共 {} 人", doctor_id, date, rows.len());
        Ok(rows)
    }

    /// 叫排名第一的等待患者，队列为空时返回 `None`
    pub async fn call_next(
        &self,
        doctor_id: i64,
        date: Option<NaiveDate>,
    ) -> TriageResult<Option<QueueEntry>> {
        self.require_doctor(doctor_id).await?;
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let sorted = QueueOrderer::sort(&self.waiting_entries(doctor_id, date).await?);

        match sorted.into_iter().next() {
            Some(top) => self.transition(top.id, QueueStatus::Called).await.map(Some),
            None => {
                debug!("医生 {} 在 {} 没有等待中的患者", doctor_id, date);
                Ok(None)
            }
        }
    }

    pub async fn call(&self, entry_id: i64) -> TriageResult<QueueEntry> {
        self.transition(entry_id, QueueStatus::Called).await
    }

    pub async fn complete(&self, entry_id: i64) -> TriageResult<QueueEntry> {
        self.transition(entry_id, QueueStatus::Completed).await
    }

    pub async fn skip(&self, entry_id: i64) -> TriageResult<QueueEntry> {
        self.transition(entry_id, QueueStatus::Skipped).await
    }

    pub async fn decline(&self, entry_id: i64) -> TriageResult<QueueEntry> {
        self.transition(entry_id, QueueStatus::Declined).await
    }

    /// 过号或被跳过的患者重新签到，以当前时间重新参与排序
    pub async fn check_in(&self, entry_id: i64) -> TriageResult<QueueEntry> {
        self.transition(entry_id, QueueStatus::Waiting).await
    }

    /// 过号扫描：预约时间加宽限期已过仍在等待的记录标记为 `missed`
    ///
    /// 签到时间晚于截止时间的记录（过号后重新签到）不受影响。
    pub async fn mark_missed(&self, now: DateTime<Utc>) -> TriageResult<Vec<QueueEntry>> {
        let grace = chrono::Duration::minutes(self.config.missed_grace_minutes);

        let mut overdue = Vec::new();
        for entry in self.queue_repo.find_by_status(QueueStatus::Waiting).await? {
            let Some(appointment) = self.appointment_repo.find_by_id(entry.appointment_id).await?
            else {
                warn!("队列记录 {} 对应的预约 {} 不存在", entry.id, entry.appointment_id);
                continue;
            };
            // 过号后重新签到的患者签到时间晚于截止时间，不再重复标记
            let rechecked = appointment
                .scheduled_at
                .is_some_and(|at| entry.checked_in_at > at + grace);
            if appointment.is_overdue(now, grace) && !rechecked {
                overdue.push((appointment, entry));
            }
        }
        overdue.sort_by(|(a, _), (b, _)| Appointment::compare_by_schedule(a, b));

        let mut missed = Vec::new();
        for (_, mut entry) in overdue {
            entry.transition_to(QueueStatus::Missed)?;
            // 扫描期间已被叫号或转移的记录保持不变
            let entry = match self.queue_repo.update(&entry, QueueStatus::Waiting).await {
                Ok(entry) => entry,
                Err(TriageError::InvalidTransition { from, .. }) => {
                    debug!("队列记录 {} 已变为 {:?}，跳过过号标记", entry.id, from);
                    continue;
                }
                Err(e) => return Err(e),
            };
            self.mirror_appointment(&entry).await?;
            missed.push(entry);
        }

        if !missed.is_empty() {
            info!("过号扫描: {} 条记录标记为过号", missed.len());
            let doctors: BTreeSet<i64> = missed.iter().map(|entry| entry.doctor_id).collect();
            for doctor_id in doctors {
                self.publish(DispatchEvent::QueueChanged { doctor_id }).await;
            }
        }

        Ok(missed)
    }

    /// 切换医生出诊状态；停诊时尝试把等待中的患者转给同科室医生
    pub async fn set_availability(
        &self,
        doctor_id: i64,
        is_available: bool,
    ) -> TriageResult<AvailabilityOutcome> {
        let doctor = self
            .doctor_repo
            .set_availability(doctor_id, is_available)
            .await?;
        info!("医生 {} 出诊状态更新为 {}", doctor_id, is_available);

        let mut outcome = AvailabilityOutcome {
            doctor_id,
            is_available,
            reassigned_to: None,
            moved_entries: 0,
        };
        if is_available {
            return Ok(outcome);
        }

        let candidates = self.doctor_repo.find_by_department(&doctor.department).await?;
        let Some(alternate) = self
            .reassignment_strategy
            .select_alternate(&doctor, &candidates)
            .cloned()
        else {
            warn!(
                "医生 {} 停诊但科室 {} 无可替班医生 (策略: {})，患者保留在原队列",
                doctor_id,
                doctor.department,
                self.reassignment_strategy.name()
            );
            return Ok(outcome);
        };

        let waiting =
            QueueReassigner::waiting_entries_of(&self.queue_repo.find_by_doctor(doctor_id).await?, doctor_id);
        let moved = QueueReassigner::reassign(&waiting, alternate.doctor_id);
        let written = self
            .queue_repo
            .update_many(&moved, QueueStatus::Waiting)
            .await?;
        if written.len() < moved.len() {
            debug!(
                "医生 {} 有 {} 条记录在转移期间状态已变化，保留在原队列",
                doctor_id,
                moved.len() - written.len()
            );
        }
        for entry in &written {
            self.mirror_appointment(entry).await?;
        }
        let count = written.len();

        info!(
            "医生 {} 停诊，{} 名等待患者转至医生 {}",
            doctor_id, count, alternate.doctor_id
        );
        self.publish(DispatchEvent::QueueChanged { doctor_id }).await;
        self.publish(DispatchEvent::QueueChanged {
            doctor_id: alternate.doctor_id,
        })
        .await;

        outcome.reassigned_to = Some(alternate.doctor_id);
        outcome.moved_entries = count;
        Ok(outcome)
    }

    async fn transition(&self, entry_id: i64, next: QueueStatus) -> TriageResult<QueueEntry> {
        let mut entry = self
            .queue_repo
            .find_by_id(entry_id)
            .await?
            .ok_or(TriageError::QueueEntryNotFound { id: entry_id })?;

        let previous = entry.status;
        entry.transition_to(next)?;
        if next == QueueStatus::Waiting {
            entry.checked_in_at = Utc::now();
        }

        let entry = self.queue_repo.update(&entry, previous).await?;
        self.mirror_appointment(&entry).await?;

        info!(
            "队列记录 {} 状态 {:?} -> {:?} (医生 {})",
            entry.id, previous, entry.status, entry.doctor_id
        );
        self.publish(DispatchEvent::QueueChanged {
            doctor_id: entry.doctor_id,
        })
        .await;

        Ok(entry)
    }

    async fn mirror_appointment(&self, entry: &QueueEntry) -> TriageResult<()> {
        let mut appointment = self
            .appointment_repo
            .find_by_id(entry.appointment_id)
            .await?
            .ok_or(TriageError::AppointmentNotFound {
                id: entry.appointment_id,
            })?;
        appointment.status = entry.status;
        appointment.doctor_id = entry.doctor_id;
        self.appointment_repo.update(&appointment).await?;
        Ok(())
    }

    async fn waiting_entries(&self, doctor_id: i64, date: NaiveDate) -> TriageResult<Vec<QueueEntry>> {
        Ok(self
            .queue_repo
            .find_by_doctor(doctor_id)
            .await?
            .into_iter()
            .filter(|entry| entry.is_waiting() && entry.queue_date == date)
            .collect())
    }

    async fn require_doctor(&self, doctor_id: i64) -> TriageResult<()> {
        self.doctor_repo
            .find_by_id(doctor_id)
            .await?
            .map(|_| ())
            .ok_or(TriageError::DoctorNotFound { id: doctor_id })
    }

    fn resolve_age(&self, age: Option<i32>) -> TriageResult<u32> {
        match age {
            None => {
                debug!("未提供年龄，使用默认年龄 {}", self.config.default_age);
                Ok(self.config.default_age)
            }
            Some(age) if age < 0 => Err(TriageError::invalid_input(format!("年龄不能为负数: {age}"))),
            Some(age) => Ok(age as u32),
        }
    }

    fn estimate_wait(&self, rank: u32) -> i64 {
        i64::from(rank.saturating_sub(1)) * i64::from(self.config.minutes_per_patient)
    }

    async fn publish(&self, event: DispatchEvent) {
        if let Err(e) = self.broadcaster.publish(event.clone()).await {
            warn!(
                "发布 {} 事件失败 (对象 {}): {}",
                event.event_type(),
                event.aggregate_id(),
                e
            );
        }
    }
}

/// 解析预约时间，无法解析时返回 `None`，此类预约永不过期
pub fn parse_scheduled_at(date: NaiveDate, time: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = time?.trim();
    let parsed = NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"));
    match parsed {
        Ok(time) => Some(date.and_time(time).and_utc()),
        Err(_) => {
            debug!("无法解析预约时间 '{}'，视为未指定", raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_parse_scheduled_at_formats() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(
            parse_scheduled_at(date, Some("09:30")),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap())
        );
        let with_seconds = parse_scheduled_at(date, Some(" 14:05:09 ")).unwrap();
        assert_eq!(with_seconds.second(), 9);
        assert_eq!(parse_scheduled_at(date, Some("half past nine")), None);
        assert_eq!(parse_scheduled_at(date, Some("25:00")), None);
        assert_eq!(parse_scheduled_at(date, None), None);
    }
}
