//! 基础设施层（Infrastructure Layer）
//!
//! 持有稀缺资源（Page），只向上层暴露能力

pub mod js_executor;

pub use js_executor::JsExecutor;
