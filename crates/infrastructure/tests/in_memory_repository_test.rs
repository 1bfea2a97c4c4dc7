use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use triage_core::models::{
    Appointment, DoctorAvailability, EmergencyRequest, GeoPoint, PriorityCategory, QueueEntry,
    QueueStatus,
};
use triage_core::TriageError;
use triage_domain::repositories::*;
use triage_infrastructure::{
    InMemoryAppointmentRepository, InMemoryDoctorRepository, InMemoryEmergencyRepository,
    InMemoryQueueRepository,
};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
}

fn new_entry(appointment_id: i64, doctor_id: i64, queue_date: NaiveDate) -> QueueEntry {
    QueueEntry {
        id: 0,
        appointment_id,
        doctor_id,
        patient_id: appointment_id * 10,
        queue_date,
        priority_category: PriorityCategory::General,
        priority_score: 50,
        position: 0,
        status: QueueStatus::Waiting,
        checked_in_at: Utc::now(),
    }
}

fn doctor(id: i64, department: &str) -> DoctorAvailability {
    DoctorAvailability {
        doctor_id: id,
        name: format!("Dr. {id}"),
        department: department.to_string(),
        is_available: true,
    }
}

#[tokio::test]
async fn test_queue_positions_per_doctor_and_date() -> Result<()> {
    let repo = InMemoryQueueRepository::new();

    let a = repo.create(&new_entry(1, 1, date(1))).await?;
    let b = repo.create(&new_entry(2, 1, date(1))).await?;
    let c = repo.create(&new_entry(3, 2, date(1))).await?;
    let d = repo.create(&new_entry(4, 1, date(2))).await?;

    assert!(a.id > 0 && b.id > a.id);
    assert_eq!((a.position, b.position), (1, 2));
    assert_eq!(c.position, 1);
    assert_eq!(d.position, 1);

    assert_eq!(repo.find_by_doctor(1).await?.len(), 3);
    assert_eq!(repo.find_by_appointment(3).await?.map(|e| e.id), Some(c.id));
    Ok(())
}

#[tokio::test]
async fn test_one_entry_per_appointment() -> Result<()> {
    let repo = InMemoryQueueRepository::new();
    repo.create(&new_entry(7, 1, date(1))).await?;

    let duplicate = repo.create(&new_entry(7, 1, date(1))).await;
    assert!(matches!(
        duplicate,
        Err(TriageError::DuplicateQueueEntry { appointment_id: 7 })
    ));
    Ok(())
}

#[tokio::test]
async fn test_concurrent_creates_get_distinct_positions() -> Result<()> {
    let repo = Arc::new(InMemoryQueueRepository::new());

    let handles: Vec<_> = (1..=20)
        .map(|appointment_id| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move { repo.create(&new_entry(appointment_id, 1, date(1))).await })
        })
        .collect();

    let mut positions = Vec::new();
    for handle in handles {
        positions.push(handle.await??.position);
    }
    positions.sort_unstable();
    assert_eq!(positions, (1..=20).collect::<Vec<u32>>());
    Ok(())
}

#[tokio::test]
async fn test_update_and_status_filter() -> Result<()> {
    let repo = InMemoryQueueRepository::new();
    let mut entry = repo.create(&new_entry(1, 1, date(1))).await?;
    repo.create(&new_entry(2, 1, date(1))).await?;

    entry.status = QueueStatus::Called;
    repo.update(&entry, QueueStatus::Waiting).await?;

    assert_eq!(repo.find_by_status(QueueStatus::Called).await?.len(), 1);
    assert_eq!(repo.find_by_status(QueueStatus::Waiting).await?.len(), 1);

    let mut ghost = entry.clone();
    ghost.id = 999;
    assert!(matches!(
        repo.update(&ghost, QueueStatus::Called).await,
        Err(TriageError::QueueEntryNotFound { id: 999 })
    ));
    Ok(())
}

#[tokio::test]
async fn test_update_many_is_all_or_nothing() -> Result<()> {
    let repo = InMemoryQueueRepository::new();
    let mut first = repo.create(&new_entry(1, 1, date(1))).await?;
    let mut second = repo.create(&new_entry(2, 1, date(1))).await?;

    first.doctor_id = 5;
    second.doctor_id = 5;
    let mut ghost = second.clone();
    ghost.id = 404;

    assert!(repo
        .update_many(&[first.clone(), ghost], QueueStatus::Waiting)
        .await
        .is_err());
    assert!(repo.find_by_doctor(5).await?.is_empty());

    let written = repo
        .update_many(&[first, second], QueueStatus::Waiting)
        .await?;
    assert_eq!(written.len(), 2);
    assert_eq!(repo.find_by_doctor(5).await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_writes_are_checked_against_current_status() -> Result<()> {
    let repo = InMemoryQueueRepository::new();
    let first = repo.create(&new_entry(1, 1, date(1))).await?;
    let second = repo.create(&new_entry(2, 1, date(1))).await?;

    // 读取快照之后，第一条记录被叫号
    let stale = vec![first.clone(), second.clone()];
    let mut called = first.clone();
    called.status = QueueStatus::Called;
    repo.update(&called, QueueStatus::Waiting).await?;

    let mut missed = stale[0].clone();
    missed.status = QueueStatus::Missed;
    assert!(matches!(
        repo.update(&missed, QueueStatus::Waiting).await,
        Err(TriageError::InvalidTransition {
            from: QueueStatus::Called,
            to: QueueStatus::Missed
        })
    ));

    let moved: Vec<_> = stale
        .into_iter()
        .map(|mut entry| {
            entry.doctor_id = 9;
            entry
        })
        .collect();
    let written = repo.update_many(&moved, QueueStatus::Waiting).await?;
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].id, second.id);

    let kept = repo.find_by_id(first.id).await?.unwrap();
    assert_eq!(kept.status, QueueStatus::Called);
    assert_eq!(kept.doctor_id, 1);
    Ok(())
}

#[tokio::test]
async fn test_doctor_repository() -> Result<()> {
    let repo = InMemoryDoctorRepository::with_doctors(vec![
        doctor(3, "cardiology"),
        doctor(1, "cardiology"),
        doctor(2, "neurology"),
    ]);

    let cardiology = repo.find_by_department("cardiology").await?;
    assert_eq!(
        cardiology.iter().map(|d| d.doctor_id).collect::<Vec<_>>(),
        vec![1, 3]
    );

    let updated = repo.set_availability(1, false).await?;
    assert!(!updated.is_available);
    assert_eq!(repo.find_by_id(1).await?.map(|d| d.is_available), Some(false));

    assert!(matches!(
        repo.set_availability(42, true).await,
        Err(TriageError::DoctorNotFound { id: 42 })
    ));

    repo.upsert(&doctor(42, "neurology")).await?;
    assert_eq!(repo.find_by_department("neurology").await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_appointment_and_emergency_repositories() -> Result<()> {
    let appointments = InMemoryAppointmentRepository::new();
    let created = appointments
        .create(&Appointment {
            id: 0,
            patient_id: 1,
            doctor_id: 1,
            appointment_date: date(1),
            scheduled_at: None,
            reason: Some("checkup".to_string()),
            status: QueueStatus::Waiting,
            created_at: Utc::now(),
        })
        .await?;
    assert_eq!(created.id, 1);

    let mut completed = created.clone();
    completed.status = QueueStatus::Completed;
    appointments.update(&completed).await?;
    assert_eq!(
        appointments.find_by_id(1).await?.map(|a| a.status),
        Some(QueueStatus::Completed)
    );

    appointments.delete(1).await?;
    assert!(appointments.find_by_id(1).await?.is_none());
    assert!(matches!(
        appointments.delete(1).await,
        Err(TriageError::AppointmentNotFound { id: 1 })
    ));

    let emergencies = InMemoryEmergencyRepository::new();
    let request = emergencies
        .create(&EmergencyRequest::new(9, GeoPoint::new(12.97, 77.59)))
        .await?;
    assert_eq!(request.id, 1);
    assert!(emergencies.find_by_id(2).await?.is_none());

    let mut missing = request.clone();
    missing.id = 5;
    assert!(matches!(
        emergencies.update(&missing).await,
        Err(TriageError::EmergencyNotFound { id: 5 })
    ));
    Ok(())
}
