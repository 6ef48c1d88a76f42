//! # Exam Answer Submit
//!
//! 一个驱动在线限时测评会话的 Rust 客户端运行时
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() / localStorage / 导航能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个题目或单次调用
//! - `answer_capture` - 快照到编码答案的纯函数转换
//! - `dom_reader` - 会话信息 / 题目快照 / 页面事件的读取
//! - `exam_api` - 判分服务的保存 / 交卷 / 难度调整调用
//! - `timer_store` - 倒计时状态的外部存取
//! - `prompt` - 弹窗 / 提示条 / 跳转等页面交互
//!
//! ### ③ 流程层（Workflow）与时钟
//! - `clock/` - 倒计时状态机（恢复、心跳、预警、过期）
//! - `workflow/` - 会话级流程编排
//! - `SubmitCoordinator` - 答案台账、批量冲刷、八步交卷
//! - `DifficultyFlow` - 交卷后的难度选择，与倒计时赛跑
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/session_runner` - 驱动一次会话：初始化、主循环、收尾
//!
//! ## 模块结构

pub mod browser;
pub mod clock;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::connect_to_exam_page;
pub use clock::{ClockEvent, ClockState, CountdownClock, TickOutcome};
pub use config::{CompletionPolicy, Config};
pub use error::{AppError, AppResult};
pub use infrastructure::JsExecutor;
pub use models::{CapturedAnswer, ExamSession, QuestionSnapshot, QuestionType};
pub use orchestrator::App;
pub use workflow::{
    DifficultyFlow, DifficultyState, NextStep, SessionCtx, SubmitCoordinator, SubmitOutcome,
};
