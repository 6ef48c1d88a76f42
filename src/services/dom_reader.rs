//! 页面读取服务 - 业务能力层
//!
//! 通过 JsExecutor 读取考试页面：会话信息、单题作答快照、页面事件队列。
//! 只读页面结构，不修改页面，不持有业务流程。

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, error, warn};

use crate::error::StateError;
use crate::infrastructure::JsExecutor;
use crate::models::question::{LabeledText, MixedPart, QuestionSnapshot, QuestionType, QuestionUi};
use crate::models::session::{ExamSession, QuestionInfo};

/// 题目快照来源
///
/// 提交协调器只依赖这一能力，便于替换实现
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// 读取单题的作答快照，容器缺失时返回 None（记录错误，不中断其他题目）
    async fn snapshot(&self, info: &QuestionInfo) -> Result<Option<QuestionSnapshot>>;
}

/// 页面观察到的用户动作
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PageEvent {
    /// 某题的作答发生变化
    #[serde(rename_all = "camelCase")]
    AnswerChanged { question_num: u32 },
    /// 用户点击了交卷按钮
    SubmitClicked,
}

/// 页面读取器
pub struct PageDomReader {
    executor: JsExecutor,
}

// ========== 页面脚本 ==========

const SESSION_SCRIPT: &str = r#"
(() => {
    const root = document.querySelector('#exam-root');
    if (!root) return null;
    const questions = Array.from(root.querySelectorAll('[data-question-id]')).map(el => ({
        id: el.dataset.questionId,
        num: Number(el.dataset.questionNum || 0),
        type: el.dataset.type || '',
    }));
    return {
        sessionId: root.dataset.sessionId || null,
        totalSeconds: Number(root.dataset.totalSeconds || 0),
        questions,
    };
})()
"#;

const EVENTS_SCRIPT: &str = r#"
(() => {
    const queue = window.__examEvents;
    if (!Array.isArray(queue)) return [];
    return queue.splice(0, queue.length);
})()
"#;

const SINGLE_CHOICE_BODY: &str = r#"
    const picked = el.querySelector('input[type="radio"]:checked');
    return { kind: 'single_choice', picked: picked ? picked.value : null };
"#;

const CHECKBOX_GROUP_BODY: &str = r#"
    const checked = Array.from(el.querySelectorAll('input[type="checkbox"]:checked'))
        .map(b => b.value);
    return { kind: 'checkbox_group', checked };
"#;

// 选择类子小题按 data-pick-order 排序，该序号由页面在勾选时写入
const MIXED_BODY: &str = r#"
    const parts = Array.from(el.querySelectorAll('[data-sub-part]')).map(p => {
        const boxes = Array.from(p.querySelectorAll('input[type="checkbox"], input[type="radio"]'));
        if (boxes.length > 0) {
            const picked = boxes.filter(b => b.checked);
            picked.sort((a, b) => Number(a.dataset.pickOrder || 0) - Number(b.dataset.pickOrder || 0));
            return { kind: 'choices', selected: picked.map(b => b.value) };
        }
        const input = p.querySelector('input[type="text"], textarea');
        return { kind: 'text', letter: p.dataset.letter || '', text: input ? input.value : '' };
    });
    return { kind: 'mixed', parts };
"#;

const MULTI_SHORT_TEXT_BODY: &str = r#"
    const inputs = Array.from(el.querySelectorAll('input[type="text"]'))
        .map(i => ({ letter: i.dataset.letter || '', text: i.value }));
    return { kind: 'multi_short_text', inputs };
"#;

const MULTI_LONG_TEXT_BODY: &str = r#"
    const areas = Array.from(el.querySelectorAll('textarea'))
        .map(t => ({ letter: t.dataset.letter || '', text: t.value }));
    return { kind: 'multi_long_text', areas };
"#;

const PLAIN_TEXT_BODY: &str = r#"
    const input = el.querySelector('input[type="text"], textarea');
    return { kind: 'plain_text', text: input ? input.value : '' };
"#;

// ========== 原始结构 ==========

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSessionInfo {
    session_id: Option<String>,
    total_seconds: u32,
    questions: Vec<RawQuestionInfo>,
}

#[derive(Debug, Deserialize)]
struct RawQuestionInfo {
    id: String,
    num: u32,
    #[serde(rename = "type")]
    raw_type: String,
}

impl PageDomReader {
    /// 创建新的页面读取器
    pub fn new(executor: JsExecutor) -> Self {
        Self { executor }
    }

    /// 读取考试会话信息（会话ID、总时长、题目清单）
    pub async fn read_session(&self) -> Result<ExamSession> {
        let raw: Option<RawSessionInfo> = self.executor.eval_as(SESSION_SCRIPT).await?;
        let raw = raw.ok_or(StateError::ExamRootMissing)?;

        let session_id = match raw.session_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err(StateError::MissingSessionId.into()),
        };

        let questions = raw
            .questions
            .into_iter()
            .map(|q| {
                let kind = QuestionType::from_raw(&q.raw_type).unwrap_or_else(|| {
                    warn!(
                        "题目 {} 声明了未知题型 '{}'，按单空文本处理",
                        q.num, q.raw_type
                    );
                    QuestionType::PlainText
                });
                QuestionInfo {
                    id: q.id,
                    num: q.num,
                    kind,
                }
            })
            .collect();

        Ok(ExamSession {
            id: session_id,
            total_time_seconds: raw.total_seconds,
            started_at: Utc::now(),
            questions,
        })
    }

    /// 取走页面事件队列中的全部事件
    ///
    /// 无法识别的事件记录后跳过，不影响同批其他事件
    pub async fn poll_events(&self) -> Result<Vec<PageEvent>> {
        let raw: Vec<JsonValue> = self.executor.eval_as(EVENTS_SCRIPT).await?;
        let events = raw
            .into_iter()
            .filter_map(|v| match serde_json::from_value::<PageEvent>(v.clone()) {
                Ok(ev) => Some(ev),
                Err(e) => {
                    warn!("无法识别的页面事件 {}: {}", v, e);
                    None
                }
            })
            .collect();
        Ok(events)
    }

    /// 按题型生成快照提取脚本
    fn ui_script(info: &QuestionInfo) -> String {
        let body = match info.kind {
            QuestionType::SingleChoice => SINGLE_CHOICE_BODY,
            QuestionType::CheckboxGroup => CHECKBOX_GROUP_BODY,
            QuestionType::Mixed => MIXED_BODY,
            QuestionType::MultiShortText => MULTI_SHORT_TEXT_BODY,
            QuestionType::MultiLongText => MULTI_LONG_TEXT_BODY,
            QuestionType::PlainText => PLAIN_TEXT_BODY,
        };
        format!(
            r#"(() => {{
    const el = document.querySelector('[data-question-num="{num}"]');
    if (!el) return null;
{body}
}})()"#,
            num = info.num,
            body = body
        )
    }
}

/// 从页面取回的选项值中提取标准字母
///
/// 页面历史版本的选项 value 出现过 "A" / "opt_A" / "option-a" 几种写法
fn normalize_letter(re: &Regex, raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    match re.captures(&upper) {
        Some(caps) => caps[1].to_string(),
        None => {
            debug!("选项值 '{}' 不含标准字母，按原值处理", raw);
            upper
        }
    }
}

fn normalize_letters(re: &Regex, raw: Vec<String>) -> Vec<String> {
    raw.iter().map(|s| normalize_letter(re, s)).collect()
}

fn normalize_labeled(re: &Regex, raw: Vec<LabeledText>) -> Vec<LabeledText> {
    raw.into_iter()
        .map(|l| LabeledText {
            letter: normalize_letter(re, &l.letter),
            text: l.text,
        })
        .collect()
}

fn normalize_ui(ui: QuestionUi) -> Result<QuestionUi> {
    let re = Regex::new(r"([A-H])$")?;
    let ui = match ui {
        QuestionUi::SingleChoice { picked } => QuestionUi::SingleChoice {
            picked: picked.map(|p| normalize_letter(&re, &p)),
        },
        QuestionUi::CheckboxGroup { checked } => QuestionUi::CheckboxGroup {
            checked: normalize_letters(&re, checked),
        },
        QuestionUi::Mixed { parts } => QuestionUi::Mixed {
            parts: parts
                .into_iter()
                .map(|p| match p {
                    MixedPart::Choices { selected } => MixedPart::Choices {
                        selected: normalize_letters(&re, selected),
                    },
                    MixedPart::Text { letter, text } => MixedPart::Text {
                        letter: normalize_letter(&re, &letter),
                        text,
                    },
                })
                .collect(),
        },
        QuestionUi::MultiShortText { inputs } => QuestionUi::MultiShortText {
            inputs: normalize_labeled(&re, inputs),
        },
        QuestionUi::MultiLongText { areas } => QuestionUi::MultiLongText {
            areas: normalize_labeled(&re, areas),
        },
        QuestionUi::PlainText { text } => QuestionUi::PlainText { text },
    };
    Ok(ui)
}

#[async_trait]
impl SnapshotSource for PageDomReader {
    async fn snapshot(&self, info: &QuestionInfo) -> Result<Option<QuestionSnapshot>> {
        let script = Self::ui_script(info);
        let ui: Option<QuestionUi> = self.executor.eval_as(script).await?;

        let Some(ui) = ui else {
            error!(
                "{}",
                StateError::QuestionContainerMissing {
                    question_num: info.num
                }
            );
            return Ok(None);
        };

        Ok(Some(QuestionSnapshot {
            question_id: info.id.clone(),
            question_num: info.num,
            question_type: info.kind,
            ui: normalize_ui(ui)?,
        }))
    }
}
