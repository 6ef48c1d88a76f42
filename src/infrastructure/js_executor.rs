//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"以及由此派生的
//! localStorage / 导航 / 弹窗能力

use anyhow::Result;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力及其派生能力
/// - 不认识 Question / ExamSession
/// - 不处理业务流程
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于派生新的执行器）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 读取 localStorage 中的值，不存在时返回 None
    pub async fn local_storage_get(&self, key: &str) -> Result<Option<String>> {
        let js_code = format!(
            "window.localStorage.getItem({})",
            serde_json::to_string(key)?
        );
        self.eval_as(js_code).await
    }

    /// 写入 localStorage
    pub async fn local_storage_set(&self, key: &str, value: &str) -> Result<()> {
        let js_code = format!(
            "window.localStorage.setItem({}, {}); true",
            serde_json::to_string(key)?,
            serde_json::to_string(value)?
        );
        self.eval(js_code).await?;
        Ok(())
    }

    /// 删除 localStorage 中的键
    pub async fn local_storage_remove(&self, key: &str) -> Result<()> {
        let js_code = format!(
            "window.localStorage.removeItem({}); true",
            serde_json::to_string(key)?
        );
        self.eval(js_code).await?;
        Ok(())
    }

    /// 将页面跳转到指定地址
    pub async fn navigate(&self, url: &str) -> Result<()> {
        let js_code = format!("window.location.href = {}; true", serde_json::to_string(url)?);
        self.eval(js_code).await?;
        Ok(())
    }

    /// 弹出提示框
    ///
    /// alert 会阻塞页面的 JS 线程，放入 setTimeout 以便 eval 立即返回
    pub async fn alert(&self, message: &str) -> Result<()> {
        let js_code = format!(
            "setTimeout(() => window.alert({}), 0); true",
            serde_json::to_string(message)?
        );
        self.eval(js_code).await?;
        Ok(())
    }
}
