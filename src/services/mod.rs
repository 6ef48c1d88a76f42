//! 业务能力层（Services Layer）
//!
//! 描述"我能做什么"，只处理单个题目或单次调用：
//! - `answer_capture` - 快照到编码答案的纯函数转换
//! - `dom_reader` - 读取页面会话信息、题目快照、事件队列
//! - `exam_api` - 判分服务的保存 / 交卷 / 难度调整调用
//! - `timer_store` - 倒计时状态的外部存取
//! - `prompt` - 弹窗、提示条、跳转等页面交互

pub mod answer_capture;
pub mod dom_reader;
pub mod exam_api;
pub mod prompt;
pub mod timer_store;

pub use dom_reader::{PageDomReader, PageEvent, SnapshotSource};
pub use exam_api::{ExamApi, HttpExamApi};
pub use prompt::{PagePrompt, PromptSurface};
pub use timer_store::{LocalStorageTimerStore, MemoryTimerStore, TimerStore};
