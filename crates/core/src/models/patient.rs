use serde::{Deserialize, Serialize};

/// 患者性别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// 参与优先级评分的患者属性
///
/// 年龄缺失时由调用方在构造之前代入配置中的默认年龄，评分器本身不做任何补全。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientAttributes {
    pub age: u32,
    pub gender: Gender,
    pub is_emergency: bool,
    pub is_maternity: bool,
}

impl PatientAttributes {
    pub fn new(age: u32, gender: Gender) -> Self {
        Self {
            age,
            gender,
            is_emergency: false,
            is_maternity: false,
        }
    }

    pub fn emergency(mut self) -> Self {
        self.is_emergency = true;
        self
    }

    pub fn maternity(mut self) -> Self {
        self.is_maternity = true;
        self
    }
}
