/// 日志工具模块
///
/// 提供 tracing 初始化和统一格式的日志辅助函数
use std::fs;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::session::ExamSession;
use crate::workflow::SubmitCoordinator;

/// 初始化 tracing 订阅器
///
/// 默认 info 级别，可通过 RUST_LOG 覆盖
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n考试会话日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 考试会话驱动模式");
    info!("📡 判分服务: {}", config.exam_api_base_url);
    info!(
        "📋 交卷策略: {:?}, 立即同步: {}",
        config.completion_policy, config.immediate_sync
    );
    info!("{}", "=".repeat(60));
}

/// 记录会话发现信息
pub fn log_session_loaded(session: &ExamSession) {
    info!("✓ 发现考试会话: {}", session.id);
    info!("⏱️ 总时长: {}s", session.total_time_seconds);
    info!("📄 题目总数: {}", session.questions.len());
}

/// 打印最终统计信息
pub fn log_final_stats(session: &ExamSession, coordinator: &SubmitCoordinator) {
    info!("\n{}", "=".repeat(60));
    info!("📊 会话结束统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!(
        "✅ 已作答: {}/{}",
        coordinator.answered_count(),
        session.questions.len()
    );
    info!("⏳ 未确认同步: {}", coordinator.pending_count());
    info!("{}", "=".repeat(60));
}
