use serde::{Deserialize, Serialize};

use crate::models::question::QuestionType;

/// 编码完成的答案
///
/// answer 的内容形状完全由 answer_type 决定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedAnswer {
    pub question_id: String,
    pub question_num: u32,
    pub answer: String,
    pub answer_type: QuestionType,
    /// 捕获时刻（unix 毫秒）
    pub timestamp: i64,
}

/// 单题同步状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// 已捕获，尚未尝试同步
    #[default]
    Unsynced,
    /// 保存请求已发出
    Pending,
    /// 服务端已确认
    Synced,
    /// 本轮尝试失败，等待下次冲刷
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsynced => "unsynced",
            Self::Pending => "pending",
            Self::Synced => "synced",
            Self::Failed => "failed",
        }
    }
}

/// 本地答案记录：最新一次捕获结果及其同步状态
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRecord {
    pub answer: CapturedAnswer,
    pub status: SyncStatus,
}

impl AnswerRecord {
    pub fn new(answer: CapturedAnswer) -> Self {
        Self {
            answer,
            status: SyncStatus::Unsynced,
        }
    }
}

/// 一次批量冲刷的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
}

impl FlushReport {
    /// 本轮冲刷是否没有任何失败
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}
