use phf::phf_map;
use serde::{Deserialize, Serialize};

/// 题型枚举
///
/// 题型由页面容器的 data-type 声明，是答案编码方式的唯一依据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// 单选题
    SingleChoice,
    /// 多选题（复选框组）
    CheckboxGroup,
    /// 复合题（按序排列的若干子小题）
    Mixed,
    /// 多空短文本题
    MultiShortText,
    /// 多空长文本题（多个文本域）
    MultiLongText,
    /// 单空文本题
    PlainText,
}

/// 页面 data-type 取值到题型的静态映射
///
/// 历史版本的页面使用过多套命名，全部收录为别名
static TYPE_ALIASES: phf::Map<&'static str, QuestionType> = phf_map! {
    "single_choice" => QuestionType::SingleChoice,
    "radio" => QuestionType::SingleChoice,
    "single" => QuestionType::SingleChoice,
    "checkbox_group" => QuestionType::CheckboxGroup,
    "checkbox" => QuestionType::CheckboxGroup,
    "multi_choice" => QuestionType::CheckboxGroup,
    "mixed" => QuestionType::Mixed,
    "composite" => QuestionType::Mixed,
    "multi_short_text" => QuestionType::MultiShortText,
    "text_group" => QuestionType::MultiShortText,
    "blank_group" => QuestionType::MultiShortText,
    "multi_long_text" => QuestionType::MultiLongText,
    "textarea_group" => QuestionType::MultiLongText,
    "plain_text" => QuestionType::PlainText,
    "text" => QuestionType::PlainText,
    "textarea" => QuestionType::PlainText,
};

impl QuestionType {
    /// 从页面 data-type 字符串解析题型
    pub fn from_raw(s: &str) -> Option<Self> {
        TYPE_ALIASES.get(s.trim().to_lowercase().as_str()).copied()
    }

    /// 获取标准名称
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "single_choice",
            QuestionType::CheckboxGroup => "checkbox_group",
            QuestionType::Mixed => "mixed",
            QuestionType::MultiShortText => "multi_short_text",
            QuestionType::MultiLongText => "multi_long_text",
            QuestionType::PlainText => "plain_text",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 带字母标号的文本输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledText {
    pub letter: String,
    pub text: String,
}

/// 复合题的子小题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MixedPart {
    /// 选择类子小题，selected 按勾选先后排列
    Choices { selected: Vec<String> },
    /// 文本类子小题
    Text { letter: String, text: String },
}

/// 单个题目的界面选择状态
///
/// 每个题型对应一个独立变体，编码器按变体分发，不做形状探测
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionUi {
    SingleChoice { picked: Option<String> },
    /// checked 按页面出现顺序排列
    CheckboxGroup { checked: Vec<String> },
    Mixed { parts: Vec<MixedPart> },
    MultiShortText { inputs: Vec<LabeledText> },
    MultiLongText { areas: Vec<LabeledText> },
    PlainText { text: String },
}

/// 题目快照：一次从页面读取到的完整作答状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSnapshot {
    pub question_id: String,
    pub question_num: u32,
    pub question_type: QuestionType,
    pub ui: QuestionUi,
}
