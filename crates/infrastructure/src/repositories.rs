//! 内存仓储实现
//!
//! 使用 Tokio `RwLock` 保护的有序表，适用于单进程部署与测试。
//! 所有ID在写锁内分配，队列参考序号也在同一把写锁内按医生加日期计数，
//! 并发预约不会拿到相同的序号。

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;

use triage_core::models::{
    Appointment, DoctorAvailability, EmergencyRequest, QueueEntry, QueueStatus,
};
use triage_core::{TriageError, TriageResult};
use triage_domain::{AppointmentRepository, DoctorRepository, EmergencyRepository, QueueRepository};

#[derive(Debug, Default)]
struct QueueTable {
    entries: BTreeMap<i64, QueueEntry>,
    by_appointment: HashMap<i64, i64>,
    positions: HashMap<(i64, NaiveDate), u32>,
    last_id: i64,
}

/// 内存队列记录仓储
#[derive(Debug, Clone, Default)]
pub struct InMemoryQueueRepository {
    table: Arc<RwLock<QueueTable>>,
}

impl InMemoryQueueRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueueRepository for InMemoryQueueRepository {
    async fn create(&self, entry: &QueueEntry) -> TriageResult<QueueEntry> {
        let mut table = self.table.write().await;
        if table.by_appointment.contains_key(&entry.appointment_id) {
            return Err(TriageError::DuplicateQueueEntry {
                appointment_id: entry.appointment_id,
            });
        }

        table.last_id += 1;
        let id = table.last_id;
        let counter = table
            .positions
            .entry((entry.doctor_id, entry.queue_date))
            .or_insert(0);
        *counter += 1;

        let mut created = entry.clone();
        created.id = id;
        created.position = *counter;

        table.by_appointment.insert(created.appointment_id, id);
        table.entries.insert(id, created.clone());
        debug!(
            "创建队列记录 {}: 医生 {} 日期 {} 参考序号 {}",
            id, created.doctor_id, created.queue_date, created.position
        );
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> TriageResult<Option<QueueEntry>> {
        Ok(self.table.read().await.entries.get(&id).cloned())
    }

    async fn find_by_appointment(&self, appointment_id: i64) -> TriageResult<Option<QueueEntry>> {
        let table = self.table.read().await;
        Ok(table
            .by_appointment
            .get(&appointment_id)
            .and_then(|id| table.entries.get(id))
            .cloned())
    }

    async fn find_by_doctor(&self, doctor_id: i64) -> TriageResult<Vec<QueueEntry>> {
        Ok(self
            .table
            .read()
            .await
            .entries
            .values()
            .filter(|entry| entry.doctor_id == doctor_id)
            .cloned()
            .collect())
    }

    async fn find_by_status(&self, status: QueueStatus) -> TriageResult<Vec<QueueEntry>> {
        Ok(self
            .table
            .read()
            .await
            .entries
            .values()
            .filter(|entry| entry.status == status)
            .cloned()
            .collect())
    }

    async fn update(&self, entry: &QueueEntry, expected: QueueStatus) -> TriageResult<QueueEntry> {
        let mut table = self.table.write().await;
        let existing = table
            .entries
            .get_mut(&entry.id)
            .ok_or(TriageError::QueueEntryNotFound { id: entry.id })?;
        if existing.status != expected {
            return Err(TriageError::InvalidTransition {
                from: existing.status,
                to: entry.status,
            });
        }
        *existing = entry.clone();
        Ok(entry.clone())
    }

    async fn update_many(
        &self,
        entries: &[QueueEntry],
        expected: QueueStatus,
    ) -> TriageResult<Vec<QueueEntry>> {
        let mut table = self.table.write().await;
        if let Some(missing) = entries.iter().find(|e| !table.entries.contains_key(&e.id)) {
            return Err(TriageError::QueueEntryNotFound { id: missing.id });
        }

        let mut written = Vec::with_capacity(entries.len());
        for entry in entries {
            let Some(existing) = table.entries.get_mut(&entry.id) else {
                continue;
            };
            if existing.status != expected {
                debug!(
                    "队列记录 {} 状态已变为 {:?}，跳过批量写入",
                    entry.id, existing.status
                );
                continue;
            }
            *existing = entry.clone();
            written.push(entry.clone());
        }
        Ok(written)
    }
}

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

/// 内存预约仓储
#[derive(Debug, Clone, Default)]
pub struct InMemoryAppointmentRepository {
    table: Arc<RwLock<Table<Appointment>>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn create(&self, appointment: &Appointment) -> TriageResult<Appointment> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let mut created = appointment.clone();
        created.id = table.last_id;
        table.rows.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> TriageResult<Option<Appointment>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn update(&self, appointment: &Appointment) -> TriageResult<Appointment> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&appointment.id) {
            Some(existing) => {
                *existing = appointment.clone();
                Ok(appointment.clone())
            }
            None => Err(TriageError::AppointmentNotFound { id: appointment.id }),
        }
    }

    async fn delete(&self, id: i64) -> TriageResult<()> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(TriageError::AppointmentNotFound { id })
    }
}

/// 内存医生出诊状态仓储
#[derive(Debug, Clone, Default)]
pub struct InMemoryDoctorRepository {
    doctors: Arc<RwLock<BTreeMap<i64, DoctorAvailability>>>,
}

impl InMemoryDoctorRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以给定医生列表初始化
    pub fn with_doctors(doctors: impl IntoIterator<Item = DoctorAvailability>) -> Self {
        let map = doctors
            .into_iter()
            .map(|doctor| (doctor.doctor_id, doctor))
            .collect();
        Self {
            doctors: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl DoctorRepository for InMemoryDoctorRepository {
    async fn upsert(&self, doctor: &DoctorAvailability) -> TriageResult<DoctorAvailability> {
        self.doctors
            .write()
            .await
            .insert(doctor.doctor_id, doctor.clone());
        Ok(doctor.clone())
    }

    async fn find_by_id(&self, doctor_id: i64) -> TriageResult<Option<DoctorAvailability>> {
        Ok(self.doctors.read().await.get(&doctor_id).cloned())
    }

    async fn find_by_department(&self, department: &str) -> TriageResult<Vec<DoctorAvailability>> {
        Ok(self
            .doctors
            .read()
            .await
            .values()
            .filter(|doctor| doctor.department == department)
            .cloned()
            .collect())
    }

    async fn set_availability(
        &self,
        doctor_id: i64,
        is_available: bool,
    ) -> TriageResult<DoctorAvailability> {
        let mut doctors = self.doctors.write().await;
        let doctor = doctors
            .get_mut(&doctor_id)
            .ok_or(TriageError::DoctorNotFound { id: doctor_id })?;
        doctor.is_available = is_available;
        Ok(doctor.clone())
    }
}

/// 内存急救请求仓储
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmergencyRepository {
    table: Arc<RwLock<Table<EmergencyRequest>>>,
}

impl InMemoryEmergencyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmergencyRepository for InMemoryEmergencyRepository {
    async fn create(&self, request: &EmergencyRequest) -> TriageResult<EmergencyRequest> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let mut created = request.clone();
        created.id = table.last_id;
        table.rows.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> TriageResult<Option<EmergencyRequest>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn update(&self, request: &EmergencyRequest) -> TriageResult<EmergencyRequest> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&request.id) {
            Some(existing) => {
                *existing = request.clone();
                Ok(request.clone())
            }
            None => Err(TriageError::EmergencyNotFound { id: request.id }),
        }
    }
}
