//! 答案编码器的线格式契约测试

mod common;

use common::snapshot;
use exam_answer_submit::models::question::{LabeledText, MixedPart, QuestionType, QuestionUi};
use exam_answer_submit::services::answer_capture;

fn labeled(letter: &str, text: &str) -> LabeledText {
    LabeledText {
        letter: letter.to_string(),
        text: text.to_string(),
    }
}

#[test]
fn single_choice_encodes_raw_letter() {
    let snap = snapshot(
        "q1",
        1,
        QuestionType::SingleChoice,
        QuestionUi::SingleChoice {
            picked: Some("B".to_string()),
        },
    );
    let captured = answer_capture::encode(&snap).expect("应当得到答案");
    assert_eq!(captured.answer, "B");
    assert_eq!(captured.answer_type, QuestionType::SingleChoice);
    assert_eq!(captured.question_id, "q1");
    assert_eq!(captured.question_num, 1);
}

#[test]
fn single_choice_without_pick_is_no_answer() {
    let snap = snapshot(
        "q1",
        1,
        QuestionType::SingleChoice,
        QuestionUi::SingleChoice { picked: None },
    );
    assert!(answer_capture::encode(&snap).is_none());
}

#[test]
fn capture_is_idempotent_without_ui_change() {
    let snap = snapshot(
        "q2",
        2,
        QuestionType::CheckboxGroup,
        QuestionUi::CheckboxGroup {
            checked: vec!["A".to_string(), "C".to_string()],
        },
    );
    let first = answer_capture::encode(&snap).unwrap();
    let second = answer_capture::encode(&snap).unwrap();
    assert_eq!(first.answer, second.answer);
}

#[test]
fn checkbox_group_joins_letters_in_given_order() {
    let snap = snapshot(
        "q3",
        3,
        QuestionType::CheckboxGroup,
        QuestionUi::CheckboxGroup {
            checked: vec!["B".to_string(), "A".to_string(), "D".to_string()],
        },
    );
    // 保持页面出现顺序，不重排
    assert_eq!(answer_capture::encode(&snap).unwrap().answer, "B,A,D");
}

#[test]
fn checkbox_group_empty_is_no_answer() {
    let snap = snapshot(
        "q3",
        3,
        QuestionType::CheckboxGroup,
        QuestionUi::CheckboxGroup { checked: vec![] },
    );
    assert!(answer_capture::encode(&snap).is_none());
}

#[test]
fn mixed_choice_parts_encode_as_ordered_records() {
    // 两个选择类子小题：第 0 个勾选 {B,C}，第 1 个勾选 {A}
    let snap = snapshot(
        "q4",
        4,
        QuestionType::Mixed,
        QuestionUi::Mixed {
            parts: vec![
                MixedPart::Choices {
                    selected: vec!["B".to_string(), "C".to_string()],
                },
                MixedPart::Choices {
                    selected: vec!["A".to_string()],
                },
            ],
        },
    );
    assert_eq!(
        answer_capture::encode(&snap).unwrap().answer,
        r#"[{"type":"MultipleChoice","value":"B,C"},{"type":"MultipleChoice","value":"A"}]"#
    );
}

#[test]
fn mixed_without_choice_selection_falls_back_to_text_mapping() {
    let snap = snapshot(
        "q5",
        5,
        QuestionType::Mixed,
        QuestionUi::Mixed {
            parts: vec![
                MixedPart::Choices { selected: vec![] },
                MixedPart::Text {
                    letter: "A".to_string(),
                    text: "光合作用".to_string(),
                },
                MixedPart::Text {
                    letter: "B".to_string(),
                    text: "  ".to_string(),
                },
            ],
        },
    );
    assert_eq!(
        answer_capture::encode(&snap).unwrap().answer,
        r#"{"A":"光合作用"}"#
    );
}

#[test]
fn mixed_all_blank_is_no_answer() {
    let snap = snapshot(
        "q5",
        5,
        QuestionType::Mixed,
        QuestionUi::Mixed {
            parts: vec![
                MixedPart::Choices { selected: vec![] },
                MixedPart::Text {
                    letter: "A".to_string(),
                    text: String::new(),
                },
            ],
        },
    );
    assert!(answer_capture::encode(&snap).is_none());
}

#[test]
fn multi_short_text_skips_blanks_without_placeholder() {
    // A="cat", B 空白, C="dog"
    let snap = snapshot(
        "q6",
        6,
        QuestionType::MultiShortText,
        QuestionUi::MultiShortText {
            inputs: vec![labeled("A", "cat"), labeled("B", ""), labeled("C", "dog")],
        },
    );
    assert_eq!(answer_capture::encode(&snap).unwrap().answer, "cat|dog");
}

#[test]
fn multi_short_text_orders_by_letter() {
    let snap = snapshot(
        "q6",
        6,
        QuestionType::MultiShortText,
        QuestionUi::MultiShortText {
            inputs: vec![labeled("C", "three"), labeled("A", "one")],
        },
    );
    assert_eq!(answer_capture::encode(&snap).unwrap().answer, "one|three");
}

#[test]
fn multi_short_text_all_blank_is_no_answer() {
    let snap = snapshot(
        "q6",
        6,
        QuestionType::MultiShortText,
        QuestionUi::MultiShortText {
            inputs: vec![labeled("A", ""), labeled("B", "   ")],
        },
    );
    assert!(answer_capture::encode(&snap).is_none());
}

#[test]
fn multi_long_text_encodes_letter_mapping() {
    let snap = snapshot(
        "q7",
        7,
        QuestionType::MultiLongText,
        QuestionUi::MultiLongText {
            areas: vec![labeled("B", "第二问"), labeled("A", "第一问"), labeled("C", "")],
        },
    );
    assert_eq!(
        answer_capture::encode(&snap).unwrap().answer,
        r#"{"A":"第一问","B":"第二问"}"#
    );
}

#[test]
fn plain_text_keeps_raw_text() {
    let snap = snapshot(
        "q8",
        8,
        QuestionType::PlainText,
        QuestionUi::PlainText {
            text: "An essay answer".to_string(),
        },
    );
    assert_eq!(
        answer_capture::encode(&snap).unwrap().answer,
        "An essay answer"
    );
}

#[test]
fn plain_text_whitespace_only_is_no_answer() {
    let snap = snapshot(
        "q8",
        8,
        QuestionType::PlainText,
        QuestionUi::PlainText {
            text: "   \n ".to_string(),
        },
    );
    assert!(answer_capture::encode(&snap).is_none());
}
