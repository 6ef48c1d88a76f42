//! 倒计时 - 时钟层
//!
//! 单个考试会话的剩余时间管理：
//! - 初始化时从持久化状态恢复，按墙钟时间扣除离线耗时，下限为 0
//! - 运行中每秒递减，按阈值发出预警，每 5 次心跳持久化一次
//! - 到 0 转入 Expired，过期事件只发出一次
//!
//! 一个会话只允许一个时钟实例；句柄可以克隆，克隆共享同一份内部状态。

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info, warn};

use crate::models::protocol::PersistedTimer;
use crate::services::timer_store::TimerStore;

/// 每多少次心跳持久化一次
const PERSIST_EVERY_TICKS: u32 = 5;

/// 时钟状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Idle,
    Running,
    Paused,
    Stopped,
    /// 终态，不可再离开
    Expired,
}

impl ClockState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClockState::Idle => "idle",
            ClockState::Running => "running",
            ClockState::Paused => "paused",
            ClockState::Stopped => "stopped",
            ClockState::Expired => "expired",
        }
    }
}

/// 心跳任务向外发出的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// 剩余时间触及预警阈值（秒）
    Warning(u32),
    /// 时间耗尽，整个时钟生命周期内只发出一次
    Expired,
}

/// 单次心跳的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// 时钟当前不在运行
    Inactive,
    /// 正常递减，warning 为本次触及的预警阈值
    Running {
        remaining: u32,
        warning: Option<u32>,
    },
    /// 本次心跳触发了过期转换
    Expired,
}

struct ClockInner {
    total: u32,
    remaining: u32,
    state: ClockState,
    warn_thresholds: Vec<u32>,
    fired_warnings: Vec<u32>,
    ticks_since_persist: u32,
    expiry_emitted: bool,
}

/// 倒计时时钟
#[derive(Clone)]
pub struct CountdownClock {
    session_id: String,
    store: Arc<dyn TimerStore>,
    inner: Arc<Mutex<ClockInner>>,
}

impl CountdownClock {
    /// 初始化时钟，存在有效持久化状态时从中恢复
    pub async fn init(
        session_id: impl Into<String>,
        total_seconds: u32,
        warn_thresholds: Vec<u32>,
        store: Arc<dyn TimerStore>,
    ) -> anyhow::Result<Self> {
        let session_id = session_id.into();
        let persisted = store.load(&session_id).await?;
        let now_ms = Utc::now().timestamp_millis();
        Ok(Self::with_persisted(
            session_id,
            total_seconds,
            warn_thresholds,
            store,
            persisted,
            now_ms,
        ))
    }

    /// 以给定的持久化状态和当前时刻构建时钟
    ///
    /// 恢复规则：运行中的状态按墙钟扣除离线耗时，扣到 0 直接进入 Expired，
    /// 绝不以负值恢复；暂停的状态原样恢复剩余时间
    pub fn with_persisted(
        session_id: impl Into<String>,
        total_seconds: u32,
        warn_thresholds: Vec<u32>,
        store: Arc<dyn TimerStore>,
        persisted: Option<PersistedTimer>,
        now_ms: i64,
    ) -> Self {
        let (remaining, state) = match persisted {
            Some(p) if p.is_running => {
                let elapsed_secs = ((now_ms - p.timestamp).max(0) / 1000) as u32;
                let remaining = p.remaining_time.saturating_sub(elapsed_secs);
                info!(
                    "恢复倒计时: 持久化剩余 {}s, 离线 {}s, 实际剩余 {}s",
                    p.remaining_time, elapsed_secs, remaining
                );
                if remaining == 0 {
                    (0, ClockState::Expired)
                } else {
                    (remaining, ClockState::Idle)
                }
            }
            Some(p) => {
                info!("恢复暂停中的倒计时: 剩余 {}s", p.remaining_time);
                (p.remaining_time, ClockState::Idle)
            }
            None => (total_seconds, ClockState::Idle),
        };

        Self {
            session_id: session_id.into(),
            store,
            inner: Arc::new(Mutex::new(ClockInner {
                total: total_seconds,
                remaining,
                state,
                warn_thresholds,
                fired_warnings: Vec::new(),
                ticks_since_persist: 0,
                expiry_emitted: state == ClockState::Expired,
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ClockInner> {
        self.inner.lock().expect("clock lock poisoned")
    }

    /// 当前状态
    pub fn state(&self) -> ClockState {
        self.lock().state
    }

    /// 剩余秒数
    pub fn remaining(&self) -> u32 {
        self.lock().remaining
    }

    /// 过期守卫：时钟此刻是否已过期
    ///
    /// 交卷第 7 步和难度协议的两处竞态检查共用此谓词
    pub fn is_expired(&self) -> bool {
        self.state() == ClockState::Expired
    }

    /// 启动时钟（Idle / Paused 进入 Running），并立即持久化一次
    pub async fn start(&self) -> anyhow::Result<()> {
        let snapshot = {
            let mut inner = self.lock();
            match inner.state {
                ClockState::Idle | ClockState::Paused => {
                    inner.state = ClockState::Running;
                    Some(Self::persisted_snapshot(&inner))
                }
                other => {
                    warn!("无法从 {} 状态启动时钟", other.as_str());
                    None
                }
            }
        };
        if let Some(snapshot) = snapshot {
            self.store.save(&self.session_id, &snapshot).await?;
            info!("⏱️ 倒计时已启动: 剩余 {}s", snapshot.remaining_time);
        }
        Ok(())
    }

    /// 暂停时钟，持久化为非运行状态
    pub async fn pause(&self) -> anyhow::Result<()> {
        let snapshot = {
            let mut inner = self.lock();
            if inner.state != ClockState::Running {
                return Ok(());
            }
            inner.state = ClockState::Paused;
            let mut snapshot = Self::persisted_snapshot(&inner);
            snapshot.is_running = false;
            snapshot
        };
        self.store.save(&self.session_id, &snapshot).await?;
        info!("⏸️ 倒计时已暂停: 剩余 {}s", snapshot.remaining_time);
        Ok(())
    }

    /// 停止时钟并清除持久化状态
    ///
    /// 可重复调用；Expired 是终态，停止只清存储不改状态
    pub async fn stop(&self) -> anyhow::Result<()> {
        {
            let mut inner = self.lock();
            if inner.state != ClockState::Expired {
                inner.state = ClockState::Stopped;
            }
        }
        self.store.clear(&self.session_id).await?;
        debug!("倒计时已停止，持久化状态已清除");
        Ok(())
    }

    /// 清除持久化状态，不改变时钟状态
    ///
    /// 供协作组件在终态路径上调用（协作组件不得写入部分状态）
    pub async fn clear_persisted(&self) -> anyhow::Result<()> {
        self.store.clear(&self.session_id).await
    }

    /// 单次心跳：递减一秒，处理预警、持久化与过期转换
    ///
    /// 持久化失败只记录，不中断计时
    pub async fn tick(&self) -> TickOutcome {
        let (outcome, persist) = {
            let mut inner = self.lock();
            if inner.state != ClockState::Running {
                return TickOutcome::Inactive;
            }

            inner.remaining = inner.remaining.saturating_sub(1);
            let remaining = inner.remaining;

            if remaining == 0 {
                inner.state = ClockState::Expired;
                if inner.expiry_emitted {
                    return TickOutcome::Inactive;
                }
                inner.expiry_emitted = true;
                return TickOutcome::Expired;
            }

            let warning = if inner.warn_thresholds.contains(&remaining)
                && !inner.fired_warnings.contains(&remaining)
            {
                inner.fired_warnings.push(remaining);
                Some(remaining)
            } else {
                None
            };

            inner.ticks_since_persist += 1;
            let persist = if inner.ticks_since_persist >= PERSIST_EVERY_TICKS {
                inner.ticks_since_persist = 0;
                Some(Self::persisted_snapshot(&inner))
            } else {
                None
            };

            (TickOutcome::Running { remaining, warning }, persist)
        };

        if let Some(snapshot) = persist {
            if let Err(e) = self.store.save(&self.session_id, &snapshot).await {
                warn!("倒计时持久化失败: {}", e);
            }
        }

        outcome
    }

    /// 启动心跳任务，事件通过返回的通道送出
    ///
    /// 任务在时钟到达终态（Expired / Stopped）后自行退出
    pub fn spawn_ticker(&self) -> UnboundedReceiver<ClockEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let clock = self.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(1));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // 第一次 tick 立即完成，跳过它让心跳从整秒开始
            interval.tick().await;

            loop {
                interval.tick().await;
                match clock.tick().await {
                    TickOutcome::Running {
                        remaining,
                        warning: Some(threshold),
                    } => {
                        debug!("剩余 {}s, 触及预警阈值 {}s", remaining, threshold);
                        if tx.send(ClockEvent::Warning(threshold)).is_err() {
                            break;
                        }
                    }
                    TickOutcome::Running { .. } => {}
                    TickOutcome::Expired => {
                        let _ = tx.send(ClockEvent::Expired);
                        break;
                    }
                    TickOutcome::Inactive => {
                        let state = clock.state();
                        if state == ClockState::Stopped || state == ClockState::Expired {
                            break;
                        }
                        // Paused 时留在循环里等待恢复
                    }
                }
            }
        });

        rx
    }

    fn persisted_snapshot(inner: &ClockInner) -> PersistedTimer {
        PersistedTimer {
            remaining_time: inner.remaining,
            total_time: inner.total,
            timestamp: Utc::now().timestamp_millis(),
            is_running: inner.state == ClockState::Running,
        }
    }
}
