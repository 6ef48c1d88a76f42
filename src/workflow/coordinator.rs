//! 提交协调器 - 流程层
//!
//! 核心职责：管理答案台账与待同步集合，编排交卷流程
//!
//! 交卷顺序（严格按序执行）：
//! 1. 完整性校验（强制或过期触发时跳过，拒绝时不发任何网络请求）
//! 2. 冲刷全部待同步答案
//! 3. 冲刷有失败且非过期触发：中止，留在页面
//! 4. 冲刷有失败且过期触发：照常交卷，上报未同步数
//! 5. 携带完整答案映射调用交卷接口
//! 6. 成功后停止倒计时并清除其持久化状态
//! 7. 服务端要求难度选择时，先复核时钟未过期，过期则直接跳转
//! 8. 交卷接口失败：过期触发尽力跳转，否则报错留在页面

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::clock::CountdownClock;
use crate::config::CompletionPolicy;
use crate::error::ValidationError;
use crate::models::answer::{AnswerRecord, FlushReport, SyncStatus};
use crate::models::protocol::{CompleteExamRequest, SaveAnswerRequest, SaveAnswerResponse};
use crate::models::session::QuestionInfo;
use crate::services::answer_capture;
use crate::services::dom_reader::SnapshotSource;
use crate::services::exam_api::ExamApi;
use crate::workflow::session_ctx::SessionCtx;

/// 交卷后的下一步动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    /// 直接跳转
    Redirect(String),
    /// 进入难度选择，携带默认跳转地址
    DifficultyChoice(String),
}

/// 一次交卷尝试的结果
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// 完整性校验未通过，未发起任何网络请求
    Rejected(ValidationError),
    /// 冲刷存在失败且时间未到，中止交卷
    SyncBlocked { failed: usize },
    /// 交卷成功
    Completed { next: NextStep },
    /// 交卷接口失败；redirect 有值时尽力跳转，否则留在页面
    Failed {
        message: String,
        redirect: Option<String>,
    },
}

/// 提交协调器
///
/// 答案映射与待同步集合只由本协调器修改
pub struct SubmitCoordinator {
    ctx: SessionCtx,
    roster: Vec<QuestionInfo>,
    clock: CountdownClock,
    source: Arc<dyn SnapshotSource>,
    api: Arc<dyn ExamApi>,
    answers: HashMap<String, AnswerRecord>,
    pending: HashSet<String>,
    completion_in_flight: bool,
}

impl SubmitCoordinator {
    /// 创建新的提交协调器
    pub fn new(
        ctx: SessionCtx,
        roster: Vec<QuestionInfo>,
        clock: CountdownClock,
        source: Arc<dyn SnapshotSource>,
        api: Arc<dyn ExamApi>,
    ) -> Self {
        Self {
            ctx,
            roster,
            clock,
            source,
            api,
            answers: HashMap::new(),
            pending: HashSet::new(),
            completion_in_flight: false,
        }
    }

    /// 捕获并登记单题答案
    ///
    /// 同一题目的记录只会被覆盖，不会追加；
    /// 捕获结果为空白时保留原有记录不动。
    /// 返回是否登记了新的答案
    pub async fn save_one(&mut self, question_num: u32) -> Result<bool> {
        let Some(info) = self.roster.iter().find(|q| q.num == question_num).cloned() else {
            warn!("收到未知题号 {} 的变更事件，忽略", question_num);
            return Ok(false);
        };

        let Some(snapshot) = self.source.snapshot(&info).await? else {
            return Ok(false);
        };

        let Some(captured) = answer_capture::encode(&snapshot) else {
            info!("题目 {} 当前没有有效作答，跳过登记", question_num);
            return Ok(false);
        };

        let question_id = captured.question_id.clone();
        self.answers
            .insert(question_id.clone(), AnswerRecord::new(captured));
        self.pending.insert(question_id.clone());

        if self.ctx.immediate_sync {
            self.sync_one(&question_id).await;
        }
        Ok(true)
    }

    /// 同步单题，返回是否得到服务端确认
    async fn sync_one(&mut self, question_id: &str) -> bool {
        let Some(record) = self.answers.get_mut(question_id) else {
            return false;
        };
        record.status = SyncStatus::Pending;

        let request = SaveAnswerRequest {
            exam_session_id: self.ctx.session_id.clone(),
            question_id: question_id.to_string(),
            answer: record.answer.answer.clone(),
        };

        let result = self.api.save_answer(&request).await;
        self.apply_save_result(question_id, result)
    }

    fn apply_save_result(
        &mut self,
        question_id: &str,
        result: Result<SaveAnswerResponse>,
    ) -> bool {
        let synced = match result {
            Ok(resp) if resp.success => true,
            Ok(resp) => {
                warn!(
                    "题目 {} 被服务端拒绝: {}",
                    question_id,
                    resp.error.as_deref().unwrap_or("未知原因")
                );
                false
            }
            Err(e) => {
                warn!("题目 {} 同步失败: {}", question_id, e);
                false
            }
        };

        if let Some(record) = self.answers.get_mut(question_id) {
            record.status = if synced {
                SyncStatus::Synced
            } else {
                SyncStatus::Failed
            };
            debug!("题目 {} 同步状态: {}", question_id, record.status.as_str());
        }
        if synced {
            self.pending.remove(question_id);
        }
        synced
    }

    /// 冲刷全部待同步答案
    ///
    /// 各题并发同步，互不阻塞，完成顺序不作保证；空集合直接返回全零
    pub async fn flush_all(&mut self) -> FlushReport {
        let ids: Vec<String> = self.pending.iter().cloned().collect();
        if ids.is_empty() {
            return FlushReport::default();
        }

        let mut requests = Vec::with_capacity(ids.len());
        for id in &ids {
            if let Some(record) = self.answers.get_mut(id) {
                record.status = SyncStatus::Pending;
                requests.push(SaveAnswerRequest {
                    exam_session_id: self.ctx.session_id.clone(),
                    question_id: id.clone(),
                    answer: record.answer.answer.clone(),
                });
            }
        }

        let api = Arc::clone(&self.api);
        let results = join_all(requests.into_iter().map(|request| {
            let api = Arc::clone(&api);
            async move {
                let result = api.save_answer(&request).await;
                (request.question_id, result)
            }
        }))
        .await;

        let mut report = FlushReport {
            total: results.len(),
            ..FlushReport::default()
        };
        for (question_id, result) in results {
            if self.apply_save_result(&question_id, result) {
                report.succeeded += 1;
            } else {
                report.failed += 1;
            }
        }

        info!(
            "冲刷完成: 成功 {}/{}, 失败 {}",
            report.succeeded, report.total, report.failed
        );
        report
    }

    /// 交卷
    ///
    /// - `force`: 跳过完整性校验（过期触发时隐含）
    /// - `due_to_expiry`: 本次交卷由倒计时归零触发
    pub async fn submit(&mut self, force: bool, due_to_expiry: bool) -> Result<SubmitOutcome> {
        if self.completion_in_flight {
            return Ok(SubmitOutcome::Rejected(ValidationError::CompletionInFlight));
        }

        // 第 1 步：完整性校验
        if !force && !due_to_expiry {
            if let Some(rejection) = self.validate_policy() {
                info!("交卷被完整性校验拒绝: {}", rejection);
                return Ok(SubmitOutcome::Rejected(rejection));
            }
        }

        // 第 2 步：冲刷
        let flush = self.flush_all().await;

        // 第 3 / 4 步：冲刷失败的处理取决于是否过期触发
        if !flush.is_clean() {
            if !due_to_expiry {
                warn!("有 {} 道题同步失败，时间未到，中止交卷", flush.failed);
                return Ok(SubmitOutcome::SyncBlocked {
                    failed: flush.failed,
                });
            }
            warn!(
                "有 {} 道题同步失败，时间已到，照常交卷并上报未同步数",
                flush.failed
            );
        }

        // 第 5 步：交卷调用
        let request = CompleteExamRequest {
            exam_session_id: self.ctx.session_id.clone(),
            answers: self
                .answers
                .iter()
                .map(|(id, r)| (id.clone(), r.answer.answer.clone()))
                .collect(),
            timer_expired: due_to_expiry || self.clock.is_expired(),
            unsaved_count: self.pending.len(),
        };

        self.completion_in_flight = true;
        let result = self.api.complete_exam(&request).await;
        self.completion_in_flight = false;

        match result {
            Ok(resp) if resp.success => {
                info!("✅ 交卷成功");

                let redirect = if resp.redirect_url.is_empty() {
                    self.ctx.fallback_redirect.clone()
                } else {
                    resp.redirect_url
                };

                // 第 7 步：难度选择入口的过期复核
                let wants_difficulty = resp.show_difficulty_choice && !self.clock.is_expired();

                // 第 6 步：停止倒计时并清除持久化状态。
                // 进入难度选择时倒计时继续走，与选择过程赛跑，
                // 由难度选择流程在自己的终态上停止时钟
                if !wants_difficulty {
                    if let Err(e) = self.clock.stop().await {
                        warn!("停止倒计时失败: {}", e);
                    }
                }

                let next = if wants_difficulty {
                    NextStep::DifficultyChoice(redirect)
                } else {
                    NextStep::Redirect(redirect)
                };
                Ok(SubmitOutcome::Completed { next })
            }
            Ok(resp) => {
                let message = resp
                    .error
                    .unwrap_or_else(|| "交卷被服务端拒绝".to_string());
                error!("交卷失败: {}", message);
                Ok(self.failed_outcome(message, due_to_expiry))
            }
            Err(e) => {
                error!("交卷请求失败: {}", e);
                Ok(self.failed_outcome(e.to_string(), due_to_expiry))
            }
        }
    }

    // 第 8 步：过期触发尽力跳转，否则留在页面
    fn failed_outcome(&self, message: String, due_to_expiry: bool) -> SubmitOutcome {
        let redirect = if due_to_expiry {
            Some(self.ctx.fallback_redirect.clone())
        } else {
            None
        };
        SubmitOutcome::Failed { message, redirect }
    }

    fn validate_policy(&self) -> Option<ValidationError> {
        match self.ctx.policy {
            CompletionPolicy::None => None,
            CompletionPolicy::RequireAtLeastOne => {
                if self.answers.is_empty() {
                    Some(ValidationError::AtLeastOneRequired)
                } else {
                    None
                }
            }
            CompletionPolicy::RequireAll => {
                let unanswered = self.unanswered_nums();
                if unanswered.is_empty() {
                    None
                } else {
                    Some(ValidationError::AllRequired { unanswered })
                }
            }
        }
    }

    /// 尚未作答的题号列表（升序）
    pub fn unanswered_nums(&self) -> Vec<u32> {
        let mut nums: Vec<u32> = self
            .roster
            .iter()
            .filter(|q| !self.answers.contains_key(&q.id))
            .map(|q| q.num)
            .collect();
        nums.sort_unstable();
        nums
    }

    /// 已作答题目数
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// 待同步题目数
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// 查询单题的本地记录
    pub fn record(&self, question_id: &str) -> Option<&AnswerRecord> {
        self.answers.get(question_id)
    }
}
