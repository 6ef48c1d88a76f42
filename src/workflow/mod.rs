//! 流程层（Workflow Layer）
//!
//! 定义会话级别的完整流程：
//! - `coordinator` - 答案登记、批量冲刷、八步交卷
//! - `difficulty_flow` - 交卷后的难度选择状态机
//! - `session_ctx` - 随流程传递的会话上下文
//!
//! 流程层不持有任何资源（Page），只依赖业务能力（services）和时钟。

pub mod coordinator;
pub mod difficulty_flow;
pub mod session_ctx;

pub use coordinator::{NextStep, SubmitCoordinator, SubmitOutcome};
pub use difficulty_flow::{DifficultyFlow, DifficultyState};
pub use session_ctx::SessionCtx;
