use crate::config::{CompletionPolicy, Config};

/// 会话上下文
///
/// 随流程传递的会话级参数，创建后不再变化
#[derive(Debug, Clone)]
pub struct SessionCtx {
    /// 考试会话ID
    pub session_id: String,
    /// 无服务端跳转地址时的兜底结果页
    pub fallback_redirect: String,
    /// 捕获后是否立即同步
    pub immediate_sync: bool,
    /// 交卷完整性策略
    pub policy: CompletionPolicy,
}

impl SessionCtx {
    /// 创建新的会话上下文
    pub fn new(session_id: impl Into<String>, config: &Config) -> Self {
        Self {
            session_id: session_id.into(),
            fallback_redirect: config.results_fallback_url.clone(),
            immediate_sync: config.immediate_sync,
            policy: config.completion_policy,
        }
    }
}
