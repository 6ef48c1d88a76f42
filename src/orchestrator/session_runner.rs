//! 会话运行器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责单次考试会话的全程驱动。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、连接浏览器、创建 JsExecutor
//! 2. **会话发现**：从页面读取会话ID、总时长、题目清单
//! 3. **倒计时恢复**：从 localStorage 恢复剩余时间，恢复即过期时直接进入过期交卷
//! 4. **主循环**：select 驱动时钟事件与页面事件，互不阻塞
//! 5. **资源管理**：持有 Browser 和主 JsExecutor，确保生命周期正确
//! 6. **收尾**：交卷结果分派（跳转 / 难度选择 / 报错留页）与全局统计
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个题目的细节
//! - **资源所有者**：唯一持有 Browser 的模块
//! - **向下委托**：答案台账与交卷委托 SubmitCoordinator，
//!   难度选择委托 DifficultyFlow

use std::sync::Arc;

use anyhow::{Context, Result};
use chromiumoxide::Browser;
use tracing::{error, info, warn};

use crate::browser;
use crate::clock::{ClockEvent, CountdownClock};
use crate::config::Config;
use crate::infrastructure::JsExecutor;
use crate::models::session::ExamSession;
use crate::services::dom_reader::{PageDomReader, PageEvent, SnapshotSource};
use crate::services::exam_api::{ExamApi, HttpExamApi};
use crate::services::prompt::{PagePrompt, PromptSurface};
use crate::services::timer_store::{LocalStorageTimerStore, TimerStore};
use crate::utils::logging::{init_log_file, log_final_stats, log_session_loaded, log_startup};
use crate::workflow::{
    DifficultyFlow, NextStep, SessionCtx, SubmitCoordinator, SubmitOutcome,
};

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    reader: Arc<PageDomReader>,
    prompt: Arc<dyn PromptSurface>,
    session: ExamSession,
    clock: CountdownClock,
    coordinator: SubmitCoordinator,
    difficulty: DifficultyFlow,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;
        log_startup(&config);

        // 连接浏览器并定位考试页面
        let (browser, page) = browser::connect_to_exam_page(
            config.browser_debug_port,
            &config.exam_page_url,
            Some(&config.exam_page_title),
        )
        .await?;

        // 主执行器持有 page，其余组件从它派生
        let executor = JsExecutor::new(page);
        let reader = Arc::new(PageDomReader::new(JsExecutor::new(executor.page().clone())));

        // 会话发现
        let session = reader.read_session().await.context("读取考试会话失败")?;
        log_session_loaded(&session);

        // 倒计时：从页面 localStorage 恢复
        let store: Arc<dyn TimerStore> = Arc::new(LocalStorageTimerStore::new(JsExecutor::new(
            executor.page().clone(),
        )));
        let clock = CountdownClock::init(
            session.id.clone(),
            session.total_time_seconds,
            config.warn_thresholds.clone(),
            store,
        )
        .await?;

        let ctx = SessionCtx::new(session.id.clone(), &config);
        let api: Arc<dyn ExamApi> = Arc::new(HttpExamApi::new(&config));
        let prompt: Arc<dyn PromptSurface> = Arc::new(PagePrompt::new(JsExecutor::new(
            executor.page().clone(),
        )));

        let coordinator = SubmitCoordinator::new(
            ctx.clone(),
            session.questions.clone(),
            clock.clone(),
            Arc::clone(&reader) as Arc<dyn SnapshotSource>,
            Arc::clone(&api),
        );
        let difficulty = DifficultyFlow::new(ctx, clock.clone(), api, Arc::clone(&prompt));

        Ok(Self {
            config,
            _browser: browser,
            reader,
            prompt,
            session,
            clock,
            coordinator,
            difficulty,
        })
    }

    /// 运行会话主循环，直到交卷并离开页面
    pub async fn run(mut self) -> Result<()> {
        // 恢复即过期：直接进入过期交卷，不再进入主循环
        if self.clock.is_expired() {
            warn!("⏰ 恢复时发现考试时间已经用完，直接进入过期交卷");
            let outcome = self.coordinator.submit(true, true).await?;
            self.finish(outcome).await?;
            log_final_stats(&self.session, &self.coordinator);
            return Ok(());
        }

        self.clock.start().await?;
        let mut clock_events = self.clock.spawn_ticker();

        let mut poll = tokio::time::interval(tokio::time::Duration::from_millis(
            self.config.poll_interval_ms,
        ));
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        'main: loop {
            tokio::select! {
                event = clock_events.recv() => {
                    match event {
                        Some(ClockEvent::Warning(threshold)) => {
                            warn!("⚠️ 剩余时间预警: {}s", threshold);
                            if let Err(e) = self
                                .prompt
                                .toast(&format!("剩余时间不足 {} 秒，请尽快作答", threshold))
                                .await
                            {
                                warn!("显示预警提示失败: {}", e);
                            }
                        }
                        Some(ClockEvent::Expired) => {
                            warn!("⏰ 考试时间已到，自动交卷");
                            let outcome = self.coordinator.submit(true, true).await?;
                            self.finish(outcome).await?;
                            break 'main;
                        }
                        None => {
                            // 心跳任务已退出（时钟停止），会话结束
                            break 'main;
                        }
                    }
                }
                _ = poll.tick() => {
                    let events = match self.reader.poll_events().await {
                        Ok(events) => events,
                        Err(e) => {
                            warn!("轮询页面事件失败: {}", e);
                            continue;
                        }
                    };
                    for event in events {
                        if self.handle_page_event(event).await? {
                            break 'main;
                        }
                    }
                }
            }
        }

        log_final_stats(&self.session, &self.coordinator);
        Ok(())
    }

    /// 处理单个页面事件，返回会话是否就此结束
    async fn handle_page_event(&mut self, event: PageEvent) -> Result<bool> {
        match event {
            PageEvent::AnswerChanged { question_num } => {
                if let Err(e) = self.coordinator.save_one(question_num).await {
                    warn!("登记题目 {} 失败: {}", question_num, e);
                }
                Ok(false)
            }
            PageEvent::SubmitClicked => {
                info!("📤 用户点击交卷");
                let outcome = self.coordinator.submit(false, false).await?;
                match outcome {
                    SubmitOutcome::Rejected(rejection) => {
                        self.prompt.alert(&rejection.to_string()).await?;
                        Ok(false)
                    }
                    SubmitOutcome::SyncBlocked { failed } => {
                        self.prompt
                            .alert(&format!("有 {} 道题保存失败，请检查网络后重新交卷", failed))
                            .await?;
                        Ok(false)
                    }
                    SubmitOutcome::Failed {
                        message,
                        redirect: None,
                    } => {
                        error!("交卷失败: {}", message);
                        self.prompt
                            .alert(&format!("交卷失败: {}", message))
                            .await?;
                        Ok(false)
                    }
                    terminal => {
                        self.finish(terminal).await?;
                        Ok(true)
                    }
                }
            }
        }
    }

    /// 交卷结果的终态分派
    async fn finish(&self, outcome: SubmitOutcome) -> Result<()> {
        match outcome {
            SubmitOutcome::Completed {
                next: NextStep::DifficultyChoice(redirect),
            } => match self.difficulty.run(&redirect).await {
                Ok(state) => info!("难度选择结束: {:?}", state),
                Err(e) => {
                    error!("难度选择流程出错: {}", e);
                    self.prompt.navigate(&redirect).await?;
                }
            },
            SubmitOutcome::Completed {
                next: NextStep::Redirect(url),
            } => {
                self.prompt.navigate(&url).await?;
            }
            SubmitOutcome::Failed {
                message,
                redirect: Some(url),
            } => {
                error!("交卷失败，尽力跳转结果页: {}", message);
                self.prompt.navigate(&url).await?;
            }
            other => {
                // 非终态结果由调用方处理，这里只记录
                warn!("finish 收到非终态交卷结果: {:?}", other);
            }
        }
        Ok(())
    }
}
