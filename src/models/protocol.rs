use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ========== 判分服务接口 ==========

/// 单题保存请求
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnswerRequest {
    pub exam_session_id: String,
    pub question_id: String,
    pub answer: String,
}

/// 单题保存响应
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveAnswerResponse {
    pub success: bool,
    pub error: Option<String>,
}

/// 交卷请求
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteExamRequest {
    pub exam_session_id: String,
    /// 题目ID到编码答案的完整映射
    pub answers: HashMap<String, String>,
    pub timer_expired: bool,
    /// 冲刷后仍未确认同步的题目数
    pub unsaved_count: usize,
}

/// 交卷响应
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompleteExamResponse {
    pub success: bool,
    pub show_difficulty_choice: bool,
    pub redirect_url: String,
    pub error: Option<String>,
}

/// 难度调整请求（会话级别）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyRequest {
    pub exam_session_id: String,
    pub adjustment: i32,
}

/// 难度调整响应
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DifficultyResponse {
    pub success: bool,
    pub action: Option<String>,
    pub redirect_url: String,
    pub message: Option<String>,
    pub error: Option<String>,
}

// ========== 难度选择 ==========

/// 交卷后的难度调整选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyChoice {
    /// 调整下一次测评难度，取值 -1 / 0 / +1
    Adjust(i32),
    /// 跳过，不做调整
    Skip,
}

impl DifficultyChoice {
    /// 解析页面写回的选择值："skip" 或 "-1" / "0" / "+1"
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("skip") {
            return Some(DifficultyChoice::Skip);
        }
        let value: i32 = raw.strip_prefix('+').unwrap_or(raw).parse().ok()?;
        if (-1..=1).contains(&value) {
            Some(DifficultyChoice::Adjust(value))
        } else {
            None
        }
    }
}

// ========== 计时器持久化 ==========

/// 倒计时的持久化状态
///
/// 以 JSON 形式存放在页面 localStorage 中，键按会话ID区分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedTimer {
    pub remaining_time: u32,
    pub total_time: u32,
    /// 写入时刻（unix 毫秒）
    pub timestamp: i64,
    pub is_running: bool,
}
