use serde::{Deserialize, Serialize};

use triage_core::models::{Gender, PatientAttributes, PriorityCategory};

pub const EMERGENCY_SCORE: u8 = 100;
pub const MATERNITY_SCORE: u8 = 80;
pub const SENIOR_BASE_SCORE: u8 = 70;
pub const SENIOR_MAX_BONUS: u32 = 9;
pub const INFANT_SCORE: u8 = 60;
pub const GENERAL_SCORE: u8 = 50;

const SENIOR_AGE: u32 = 60;
const INFANT_AGE_LIMIT: u32 = 2;
const SENIOR_BONUS_STEP_YEARS: u32 = 5;

/// 评分结果
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriorityAssessment {
    pub category: PriorityCategory,
    pub score: u8,
}

/// 临床优先级评分
///
/// 纯函数，按固定顺序匹配，先匹配者生效：
///
/// 1. 急诊 → 100
/// 2. 孕产（仅女性） → 80
/// 3. 60岁及以上 → 70 + min(9, ⌊(age − 60) / 5⌋)
/// 4. 2岁以下 → 60
/// 5. 其他 → 50
pub struct PriorityScorer;

impl PriorityScorer {
    pub fn score(patient: &PatientAttributes) -> PriorityAssessment {
        if patient.is_emergency {
            return PriorityAssessment {
                category: PriorityCategory::Emergency,
                score: EMERGENCY_SCORE,
            };
        }

        if patient.is_maternity && patient.gender == Gender::Female {
            return PriorityAssessment {
                category: PriorityCategory::Maternity,
                score: MATERNITY_SCORE,
            };
        }

        if patient.age >= SENIOR_AGE {
            let bonus = ((patient.age - SENIOR_AGE) / SENIOR_BONUS_STEP_YEARS).min(SENIOR_MAX_BONUS);
            return PriorityAssessment {
                category: PriorityCategory::Senior,
                score: SENIOR_BASE_SCORE + bonus as u8,
            };
        }

        if patient.age < INFANT_AGE_LIMIT {
            return PriorityAssessment {
                category: PriorityCategory::Infant,
                score: INFANT_SCORE,
            };
        }

        PriorityAssessment {
            category: PriorityCategory::General,
            score: GENERAL_SCORE,
        }
    }
}
