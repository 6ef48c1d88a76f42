//! 答案捕获服务 - 业务能力层
//!
//! 快照到编码答案的纯函数转换，每个题型一个专属编码器。
//! 编码产物即判分服务存储的最终形状，不可随意变更：
//! - 单选：所选字母
//! - 多选：逗号连接的字母
//! - 复合：选择类子小题的有序记录数组，或文本类子小题的字母映射
//! - 多空短文本：竖线连接的非空内容（按字母序，空项直接跳过）
//! - 多空长文本：字母到内容的映射
//! - 单空文本：原始文本

use std::collections::BTreeMap;

use chrono::Utc;
use serde_json::json;

use crate::models::answer::CapturedAnswer;
use crate::models::question::{LabeledText, MixedPart, QuestionSnapshot, QuestionUi};

/// 将题目快照编码为答案
///
/// 去除空白后没有任何内容时视为"未作答"，返回 None，绝不产生空字符串答案
pub fn encode(snapshot: &QuestionSnapshot) -> Option<CapturedAnswer> {
    let encoded = match &snapshot.ui {
        QuestionUi::SingleChoice { picked } => encode_single_choice(picked.as_deref()),
        QuestionUi::CheckboxGroup { checked } => encode_checkbox_group(checked),
        QuestionUi::Mixed { parts } => encode_mixed(parts),
        QuestionUi::MultiShortText { inputs } => encode_multi_short_text(inputs),
        QuestionUi::MultiLongText { areas } => encode_multi_long_text(areas),
        QuestionUi::PlainText { text } => encode_plain_text(text),
    }?;

    Some(CapturedAnswer {
        question_id: snapshot.question_id.clone(),
        question_num: snapshot.question_num,
        answer: encoded,
        answer_type: snapshot.question_type,
        timestamp: Utc::now().timestamp_millis(),
    })
}

/// 单选题：直接使用所选字母
fn encode_single_choice(picked: Option<&str>) -> Option<String> {
    let letter = picked?.trim();
    if letter.is_empty() {
        None
    } else {
        Some(letter.to_string())
    }
}

/// 多选题：逗号连接，保持传入顺序（页面出现顺序）
fn encode_checkbox_group(checked: &[String]) -> Option<String> {
    let letters: Vec<&str> = checked
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if letters.is_empty() {
        None
    } else {
        Some(letters.join(","))
    }
}

/// 复合题
///
/// 选择类子小题存在勾选时，编码为有序记录数组；
/// 否则回退到文本类子小题的字母映射
fn encode_mixed(parts: &[MixedPart]) -> Option<String> {
    let records: Vec<serde_json::Value> = parts
        .iter()
        .filter_map(|part| match part {
            MixedPart::Choices { selected } => {
                let letters: Vec<&str> = selected
                    .iter()
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .collect();
                if letters.is_empty() {
                    None
                } else {
                    Some(json!({
                        "type": "MultipleChoice",
                        "value": letters.join(","),
                    }))
                }
            }
            MixedPart::Text { .. } => None,
        })
        .collect();

    if !records.is_empty() {
        return serde_json::to_string(&records).ok();
    }

    let texts: BTreeMap<&str, &str> = parts
        .iter()
        .filter_map(|part| match part {
            MixedPart::Text { letter, text }
                if !letter.trim().is_empty() && !text.trim().is_empty() =>
            {
                Some((letter.trim(), text.as_str()))
            }
            _ => None,
        })
        .collect();

    if texts.is_empty() {
        None
    } else {
        serde_json::to_string(&texts).ok()
    }
}

/// 多空短文本：按字母序连接非空内容，空项跳过，不留占位
fn encode_multi_short_text(inputs: &[LabeledText]) -> Option<String> {
    let mut filled: Vec<&LabeledText> = inputs
        .iter()
        .filter(|i| !i.text.trim().is_empty())
        .collect();
    filled.sort_by(|a, b| a.letter.cmp(&b.letter));

    if filled.is_empty() {
        None
    } else {
        Some(
            filled
                .iter()
                .map(|i| i.text.as_str())
                .collect::<Vec<_>>()
                .join("|"),
        )
    }
}

/// 多空长文本：字母到内容的映射，空项跳过
fn encode_multi_long_text(areas: &[LabeledText]) -> Option<String> {
    let texts: BTreeMap<&str, &str> = areas
        .iter()
        .filter(|a| !a.letter.trim().is_empty() && !a.text.trim().is_empty())
        .map(|a| (a.letter.trim(), a.text.as_str()))
        .collect();

    if texts.is_empty() {
        None
    } else {
        serde_json::to_string(&texts).ok()
    }
}

/// 单空文本：原始文本
fn encode_plain_text(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
