use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::question::QuestionType;

/// 题目基本信息（来自页面容器的声明）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInfo {
    pub id: String,
    pub num: u32,
    pub kind: QuestionType,
}

/// 考试会话
#[derive(Debug, Clone, PartialEq)]
pub struct ExamSession {
    pub id: String,
    pub total_time_seconds: u32,
    /// 本次运行时首次发现会话的时刻
    pub started_at: DateTime<Utc>,
    pub questions: Vec<QuestionInfo>,
}
