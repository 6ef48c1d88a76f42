//! 计时器持久化服务 - 业务能力层
//!
//! 倒计时状态的外部存取。真实实现落在页面 localStorage 上，
//! 因此刷新页面后状态仍在；内存实现用于测试。

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::error::StateError;
use crate::infrastructure::JsExecutor;
use crate::models::protocol::PersistedTimer;

/// 按会话ID生成存储键
pub fn storage_key(session_id: &str) -> String {
    format!("exam_timer_{}", session_id)
}

/// 计时器状态存储
#[async_trait]
pub trait TimerStore: Send + Sync {
    /// 读取会话的持久化状态，不存在或损坏时返回 None
    async fn load(&self, session_id: &str) -> Result<Option<PersistedTimer>>;
    /// 写入会话的持久化状态
    async fn save(&self, session_id: &str, state: &PersistedTimer) -> Result<()>;
    /// 清除会话的持久化状态
    async fn clear(&self, session_id: &str) -> Result<()>;
}

/// 基于页面 localStorage 的存储
pub struct LocalStorageTimerStore {
    executor: JsExecutor,
}

impl LocalStorageTimerStore {
    pub fn new(executor: JsExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl TimerStore for LocalStorageTimerStore {
    async fn load(&self, session_id: &str) -> Result<Option<PersistedTimer>> {
        let key = storage_key(session_id);
        let Some(raw) = self.executor.local_storage_get(&key).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<PersistedTimer>(&raw) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                // 损坏的状态视同不存在，同时清掉避免反复解析失败
                warn!(
                    "{}",
                    StateError::TimerStateCorrupt {
                        detail: e.to_string()
                    }
                );
                self.executor.local_storage_remove(&key).await?;
                Ok(None)
            }
        }
    }

    async fn save(&self, session_id: &str, state: &PersistedTimer) -> Result<()> {
        let key = storage_key(session_id);
        let raw = serde_json::to_string(state)?;
        self.executor.local_storage_set(&key, &raw).await
    }

    async fn clear(&self, session_id: &str) -> Result<()> {
        self.executor.local_storage_remove(&storage_key(session_id)).await
    }
}

/// 内存存储（测试用）
#[derive(Default)]
pub struct MemoryTimerStore {
    entries: Mutex<HashMap<String, PersistedTimer>>,
}

impl MemoryTimerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TimerStore for MemoryTimerStore {
    async fn load(&self, session_id: &str) -> Result<Option<PersistedTimer>> {
        Ok(self
            .entries
            .lock()
            .expect("timer store lock poisoned")
            .get(&storage_key(session_id))
            .cloned())
    }

    async fn save(&self, session_id: &str, state: &PersistedTimer) -> Result<()> {
        self.entries
            .lock()
            .expect("timer store lock poisoned")
            .insert(storage_key(session_id), state.clone());
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<()> {
        self.entries
            .lock()
            .expect("timer store lock poisoned")
            .remove(&storage_key(session_id));
        Ok(())
    }
}
