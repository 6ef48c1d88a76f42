//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责会话级别的调度，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! session_runner (驱动一次考试会话)
//!     ↓
//! workflow::SubmitCoordinator / DifficultyFlow (会话级流程)
//!     ↓
//! services (能力层：capture / dom / api / store / prompt)
//!     ↓
//! infrastructure (基础设施：JsExecutor)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源隔离**：只有编排层持有 Browser
//! 2. **向下依赖**：编排层 → workflow → services → infrastructure
//! 3. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod session_runner;

pub use session_runner::App;
