//! 页面交互服务 - 业务能力层
//!
//! 难度选择弹窗、提示条、跳转等面向用户的页面操作

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::error::StateError;
use crate::infrastructure::JsExecutor;
use crate::models::protocol::DifficultyChoice;

/// 面向用户的页面操作界面
#[async_trait]
pub trait PromptSurface: Send + Sync {
    /// 显示难度选择弹窗
    async fn show_difficulty_dialog(&self) -> Result<()>;
    /// 隐藏难度选择弹窗
    async fn hide_difficulty_dialog(&self) -> Result<()>;
    /// 启用或禁用弹窗内的控件
    async fn set_difficulty_controls_enabled(&self, enabled: bool) -> Result<()>;
    /// 读取并清除用户在弹窗中的选择
    async fn poll_choice(&self) -> Result<Option<DifficultyChoice>>;
    /// 在页面上显示提示条
    async fn toast(&self, message: &str) -> Result<()>;
    /// 弹出阻断式提示
    async fn alert(&self, message: &str) -> Result<()>;
    /// 跳转页面
    async fn navigate(&self, url: &str) -> Result<()>;
}

/// 基于考试页面 DOM 的实现
pub struct PagePrompt {
    executor: JsExecutor,
}

const SHOW_DIALOG_SCRIPT: &str = r#"
(() => {
    const el = document.querySelector('#difficulty-dialog');
    if (el) { el.style.display = 'flex'; }
    return !!el;
})()
"#;

const HIDE_DIALOG_SCRIPT: &str = r#"
(() => {
    const el = document.querySelector('#difficulty-dialog');
    if (el) { el.style.display = 'none'; }
    return !!el;
})()
"#;

const POLL_CHOICE_SCRIPT: &str = r#"
(() => {
    const v = window.__examDifficultyChoice;
    if (v === undefined || v === null) return null;
    window.__examDifficultyChoice = null;
    return String(v);
})()
"#;

impl PagePrompt {
    pub fn new(executor: JsExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl PromptSurface for PagePrompt {
    async fn show_difficulty_dialog(&self) -> Result<()> {
        let found: bool = self.executor.eval_as(SHOW_DIALOG_SCRIPT).await?;
        if !found {
            return Err(StateError::DifficultyDialogMissing.into());
        }
        Ok(())
    }

    async fn hide_difficulty_dialog(&self) -> Result<()> {
        self.executor.eval(HIDE_DIALOG_SCRIPT).await?;
        Ok(())
    }

    async fn set_difficulty_controls_enabled(&self, enabled: bool) -> Result<()> {
        let js_code = format!(
            r#"
(() => {{
    document.querySelectorAll('#difficulty-dialog button').forEach(b => b.disabled = {});
    return true;
}})()
"#,
            !enabled
        );
        self.executor.eval(js_code).await?;
        Ok(())
    }

    async fn poll_choice(&self) -> Result<Option<DifficultyChoice>> {
        let raw: Option<String> = self.executor.eval_as(POLL_CHOICE_SCRIPT).await?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        match DifficultyChoice::parse(&raw) {
            Some(choice) => Ok(Some(choice)),
            None => {
                warn!("无法识别的难度选择值: '{}'", raw);
                Ok(None)
            }
        }
    }

    async fn toast(&self, message: &str) -> Result<()> {
        let js_code = format!(
            r#"
(() => {{
    let bar = document.querySelector('#exam-toast');
    if (!bar) {{
        bar = document.createElement('div');
        bar.id = 'exam-toast';
        bar.style.cssText = 'position:fixed;top:12px;right:12px;padding:8px 16px;'
            + 'background:#c0392b;color:#fff;border-radius:4px;z-index:9999';
        document.body.appendChild(bar);
    }}
    bar.textContent = {};
    setTimeout(() => bar.remove(), 5000);
    return true;
}})()
"#,
            serde_json::to_string(message)?
        );
        self.executor.eval(js_code).await?;
        Ok(())
    }

    async fn alert(&self, message: &str) -> Result<()> {
        self.executor.alert(message).await
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.executor.navigate(url).await
    }
}
