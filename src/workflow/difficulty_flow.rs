//! 难度选择协议 - 流程层
//!
//! 交卷成功后的短时交互：用户可为下一次测评选择难度调整，
//! 整个过程与倒计时赛跑。状态机：
//!
//! ```text
//! Hidden → Shown → { ChoiceMade, Skipped, AutoClosedByExpiry }
//! ```
//!
//! 过期检查共有三处：进入 Shown 之前、Shown 期间的活性巡检、
//! 用户做出选择之后。三处使用同一个谓词 `CountdownClock::is_expired`。

use std::sync::Arc;

use anyhow::Result;
use tokio::time::Duration;
use tracing::{info, warn};

use crate::clock::CountdownClock;
use crate::models::protocol::{DifficultyChoice, DifficultyRequest};
use crate::services::exam_api::ExamApi;
use crate::services::prompt::PromptSurface;
use crate::workflow::session_ctx::SessionCtx;

/// 难度选择协议的终态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyState {
    /// 用户做出了调整选择
    ChoiceMade,
    /// 用户选择跳过
    Skipped,
    /// 过期被检测到，交互被抢占关闭
    AutoClosedByExpiry,
}

const EXPIRY_NOTICE: &str = "考试时间已到，调整选项已失效，即将进入结果页";

/// 难度选择流程
pub struct DifficultyFlow {
    ctx: SessionCtx,
    clock: CountdownClock,
    api: Arc<dyn ExamApi>,
    prompt: Arc<dyn PromptSurface>,
    poll_interval: Duration,
}

impl DifficultyFlow {
    /// 创建新的难度选择流程
    pub fn new(
        ctx: SessionCtx,
        clock: CountdownClock,
        api: Arc<dyn ExamApi>,
        prompt: Arc<dyn PromptSurface>,
    ) -> Self {
        Self {
            ctx,
            clock,
            api,
            prompt,
            poll_interval: Duration::from_secs(1),
        }
    }

    /// 调整活性巡检间隔（测试用）
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// 运行难度选择流程直到终态
    ///
    /// `default_redirect` 为交卷响应携带的默认跳转地址，
    /// 过期、跳过、调用失败时都回落到它
    pub async fn run(&self, default_redirect: &str) -> Result<DifficultyState> {
        // 进入 Shown 之前的过期复核：已过期就绝不渲染
        if self.clock.is_expired() {
            info!("时钟已过期，不再展示难度选择，直接跳转结果页");
            self.prompt.navigate(default_redirect).await?;
            return Ok(DifficultyState::AutoClosedByExpiry);
        }

        self.prompt.show_difficulty_dialog().await?;
        info!("🎚️ 难度选择弹窗已展示");

        // Shown 期间：独立于时钟事件通道的活性巡检
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.tick().await;

        loop {
            interval.tick().await;

            if self.clock.is_expired() {
                return self.auto_close(default_redirect).await;
            }

            let Some(choice) = self.prompt.poll_choice().await? else {
                continue;
            };

            // 选择之后再验一次，交互耗时不为零
            if self.clock.is_expired() {
                info!("选择在过期之后到达，按过期关闭处理，不发起调用");
                return self.auto_close(default_redirect).await;
            }

            return self.handle_choice(choice, default_redirect).await;
        }
    }

    /// 选择落定后停止倒计时并清除其持久化状态
    async fn stop_clock(&self) {
        if let Err(e) = self.clock.stop().await {
            warn!("停止倒计时失败: {}", e);
        }
    }

    /// 过期抢占路径：隐藏、禁用、清持久化、提示、跳转
    async fn auto_close(&self, default_redirect: &str) -> Result<DifficultyState> {
        info!("⏰ 活性巡检发现时钟已过期，关闭难度选择");
        self.prompt.hide_difficulty_dialog().await?;
        self.prompt.set_difficulty_controls_enabled(false).await?;
        if let Err(e) = self.clock.clear_persisted().await {
            warn!("清除倒计时持久化状态失败: {}", e);
        }
        self.prompt.alert(EXPIRY_NOTICE).await?;
        self.prompt.navigate(default_redirect).await?;
        Ok(DifficultyState::AutoClosedByExpiry)
    }

    async fn handle_choice(
        &self,
        choice: DifficultyChoice,
        default_redirect: &str,
    ) -> Result<DifficultyState> {
        match choice {
            DifficultyChoice::Skip => {
                info!("用户跳过难度调整");
                self.prompt.hide_difficulty_dialog().await?;
                self.stop_clock().await;
                self.prompt.navigate(default_redirect).await?;
                Ok(DifficultyState::Skipped)
            }
            DifficultyChoice::Adjust(adjustment) => {
                info!("用户选择难度调整: {:+}", adjustment);
                self.prompt.set_difficulty_controls_enabled(false).await?;

                let request = DifficultyRequest {
                    exam_session_id: self.ctx.session_id.clone(),
                    adjustment,
                };
                self.stop_clock().await;

                match self.api.submit_difficulty(&request).await {
                    Ok(resp) if resp.success => {
                        let redirect = if resp.redirect_url.is_empty() {
                            default_redirect.to_string()
                        } else {
                            resp.redirect_url
                        };
                        info!("✓ 难度调整已提交，跳转到 {}", redirect);
                        self.prompt.navigate(&redirect).await?;
                        Ok(DifficultyState::ChoiceMade)
                    }
                    Ok(resp) => {
                        let message = resp
                            .message
                            .or(resp.error)
                            .unwrap_or_else(|| "难度调整被服务端拒绝".to_string());
                        warn!("难度调整失败: {}", message);
                        self.prompt.alert(&message).await?;
                        self.prompt.navigate(default_redirect).await?;
                        Ok(DifficultyState::ChoiceMade)
                    }
                    Err(e) => {
                        warn!("难度调整请求失败: {}", e);
                        self.prompt.alert("难度调整提交失败，即将进入结果页").await?;
                        self.prompt.navigate(default_redirect).await?;
                        Ok(DifficultyState::ChoiceMade)
                    }
                }
            }
        }
    }
}
