use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::ConfigError;

/// 交卷完整性策略
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// 不做限制
    None,
    /// 至少作答一题
    RequireAtLeastOne,
    /// 必须全部作答
    RequireAll,
}

impl CompletionPolicy {
    /// 从字符串解析策略，无法识别时返回 None
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(CompletionPolicy::None),
            "require_at_least_one" => Some(CompletionPolicy::RequireAtLeastOne),
            "require_all" => Some(CompletionPolicy::RequireAll),
            _ => None,
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 考试页面 URL
    pub exam_page_url: String,
    /// 考试页面标题片段（用于在已打开的标签页中查找）
    pub exam_page_title: String,
    /// 判分服务 API 基地址
    pub exam_api_base_url: String,
    /// 判分服务令牌
    pub exam_token: String,
    /// 答案捕获后是否立即同步（false 则等待批量冲刷）
    pub immediate_sync: bool,
    /// 交卷完整性策略
    pub completion_policy: CompletionPolicy,
    /// 剩余时间预警阈值（秒）
    pub warn_thresholds: Vec<u32>,
    /// 页面事件轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 单题保存的最大尝试次数
    pub save_retry_attempts: u32,
    /// 保存重试的线性退避步长（毫秒）
    pub save_retry_backoff_ms: u64,
    /// 交卷后无服务端跳转地址时的兜底结果页
    pub results_fallback_url: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 2001,
            exam_page_url: "https://exam.staff.xdf.cn/#/examSession".to_string(),
            exam_page_title: "在线测评".to_string(),
            exam_api_base_url: "https://tps-exam-api.staff.xdf.cn".to_string(),
            exam_token: "4B1E9D0A77C2385FD1B0E6C2A9F14583".to_string(),
            immediate_sync: false,
            completion_policy: CompletionPolicy::RequireAtLeastOne,
            warn_thresholds: vec![300, 60, 30],
            poll_interval_ms: 500,
            save_retry_attempts: 3,
            save_retry_backoff_ms: 1000,
            results_fallback_url: "https://exam.staff.xdf.cn/#/examResult".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    /// 从环境变量加载配置，未设置的字段使用默认值
    pub fn from_env() -> Self {
        Self::overlay_env(Self::default())
    }

    /// 从 TOML 配置文件加载
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;
        Ok(config)
    }

    /// 加载配置：存在 config.toml 则以其为基底，再用环境变量覆盖
    pub fn load() -> Result<Self> {
        let path = Path::new("config.toml");
        let base = if path.exists() {
            Self::from_file(path).with_context(|| format!("加载 {} 失败", path.display()))?
        } else {
            Self::default()
        };
        Ok(Self::overlay_env(base))
    }

    fn overlay_env(base: Self) -> Self {
        Self {
            browser_debug_port: env_parse("BROWSER_DEBUG_PORT", base.browser_debug_port),
            exam_page_url: env_str("EXAM_PAGE_URL", base.exam_page_url),
            exam_page_title: env_str("EXAM_PAGE_TITLE", base.exam_page_title),
            exam_api_base_url: env_str("EXAM_API_BASE_URL", base.exam_api_base_url),
            exam_token: env_str("EXAM_TOKEN", base.exam_token),
            immediate_sync: env_parse("IMMEDIATE_SYNC", base.immediate_sync),
            completion_policy: std::env::var("COMPLETION_POLICY")
                .ok()
                .and_then(|v| CompletionPolicy::parse(&v))
                .unwrap_or(base.completion_policy),
            warn_thresholds: base.warn_thresholds,
            poll_interval_ms: env_parse("POLL_INTERVAL_MS", base.poll_interval_ms),
            save_retry_attempts: env_parse("SAVE_RETRY_ATTEMPTS", base.save_retry_attempts),
            save_retry_backoff_ms: env_parse("SAVE_RETRY_BACKOFF_MS", base.save_retry_backoff_ms),
            results_fallback_url: env_str("RESULTS_FALLBACK_URL", base.results_fallback_url),
            verbose_logging: env_parse("VERBOSE_LOGGING", base.verbose_logging),
            output_log_file: env_str("OUTPUT_LOG_FILE", base.output_log_file),
        }
    }
}

fn env_str(name: &str, default: String) -> String {
    std::env::var(name).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
