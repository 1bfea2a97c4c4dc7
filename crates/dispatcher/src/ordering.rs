use std::cmp::Ordering;

use triage_core::models::QueueEntry;

/// 队列全序
///
/// 排序键为 `(priority_score DESC, checked_in_at ASC)`，两者都相同时按记录ID升序，
/// 保证对任意固定快照给出稳定的全序。分数和签到时间会在两次读取之间变化，
/// 因此每次读取都重新排序，不做缓存。
pub struct QueueOrderer;

impl QueueOrderer {
    pub fn compare(a: &QueueEntry, b: &QueueEntry) -> Ordering {
        b.priority_score
            .cmp(&a.priority_score)
            .then_with(|| a.checked_in_at.cmp(&b.checked_in_at))
            .then_with(|| a.id.cmp(&b.id))
    }

    /// 返回排序后的副本，不修改输入
    pub fn sort(entries: &[QueueEntry]) -> Vec<QueueEntry> {
        let mut sorted = entries.to_vec();
        sorted.sort_by(Self::compare);
        sorted
    }

    /// 将新记录插入已排序序列，结果与 `sort(sorted + [entry])` 相同
    pub fn insert(sorted: &[QueueEntry], entry: QueueEntry) -> Vec<QueueEntry> {
        let index = sorted.partition_point(|existing| Self::compare(existing, &entry) != Ordering::Greater);
        let mut result = Vec::with_capacity(sorted.len() + 1);
        result.extend_from_slice(&sorted[..index]);
        result.push(entry);
        result.extend_from_slice(&sorted[index..]);
        result
    }

    /// 记录在已排序序列中的排名（从1开始）
    pub fn rank_of(sorted: &[QueueEntry], entry_id: i64) -> Option<usize> {
        sorted
            .iter()
            .position(|entry| entry.id == entry_id)
            .map(|index| index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use triage_core::models::{PriorityCategory, QueueStatus};

    fn entry(id: i64, score: u8, minutes: i64) -> QueueEntry {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        QueueEntry {
            id,
            appointment_id: id,
            doctor_id: 1,
            patient_id: id,
            queue_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            priority_category: PriorityCategory::General,
            priority_score: score,
            position: id as u32,
            status: QueueStatus::Waiting,
            checked_in_at: base + Duration::minutes(minutes),
        }
    }

    fn ids(entries: &[QueueEntry]) -> Vec<i64> {
        entries.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_higher_score_first() {
        let entries = vec![entry(1, 50, 0), entry(2, 100, 5), entry(3, 70, 1)];
        assert_eq!(ids(&QueueOrderer::sort(&entries)), vec![2, 3, 1]);
    }

    #[test]
    fn test_equal_score_first_come_first_served() {
        let entries = vec![entry(1, 70, 30), entry(2, 70, 10), entry(3, 70, 20)];
        assert_eq!(ids(&QueueOrderer::sort(&entries)), vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_does_not_mutate_input() {
        let entries = vec![entry(1, 50, 0), entry(2, 100, 0)];
        let _ = QueueOrderer::sort(&entries);
        assert_eq!(ids(&entries), vec![1, 2]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let entries = vec![
            entry(1, 50, 3),
            entry(2, 79, 1),
            entry(3, 50, 1),
            entry(4, 100, 9),
            entry(5, 60, 0),
        ];
        let once = QueueOrderer::sort(&entries);
        let twice = QueueOrderer::sort(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_insert_matches_sort() {
        let existing = vec![entry(1, 50, 3), entry(2, 79, 1), entry(3, 50, 1), entry(4, 100, 9)];
        let sorted = QueueOrderer::sort(&existing);

        for candidate in [entry(10, 50, 2), entry(11, 100, 0), entry(12, 40, 0), entry(13, 79, 1)] {
            let inserted = QueueOrderer::insert(&sorted, candidate.clone());
            let mut all = existing.clone();
            all.push(candidate);
            assert_eq!(inserted, QueueOrderer::sort(&all));
        }
    }

    #[test]
    fn test_insert_into_empty() {
        let result = QueueOrderer::insert(&[], entry(1, 50, 0));
        assert_eq!(ids(&result), vec![1]);
    }

    #[test]
    fn test_rank_of() {
        let sorted = QueueOrderer::sort(&[entry(1, 50, 0), entry(2, 100, 0)]);
        assert_eq!(QueueOrderer::rank_of(&sorted, 2), Some(1));
        assert_eq!(QueueOrderer::rank_of(&sorted, 1), Some(2));
        assert_eq!(QueueOrderer::rank_of(&sorted, 99), None);
    }
}
