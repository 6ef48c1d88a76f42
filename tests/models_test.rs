//! 模型解析测试：题型别名、难度选择值、页面事件

use exam_answer_submit::models::answer::SyncStatus;
use exam_answer_submit::models::protocol::DifficultyChoice;
use exam_answer_submit::models::question::QuestionType;
use exam_answer_submit::services::dom_reader::PageEvent;
use serde_json::json;

#[test]
fn question_type_parses_known_aliases() {
    assert_eq!(
        QuestionType::from_raw("radio"),
        Some(QuestionType::SingleChoice)
    );
    assert_eq!(
        QuestionType::from_raw("single_choice"),
        Some(QuestionType::SingleChoice)
    );
    assert_eq!(
        QuestionType::from_raw("checkbox"),
        Some(QuestionType::CheckboxGroup)
    );
    assert_eq!(QuestionType::from_raw("composite"), Some(QuestionType::Mixed));
    assert_eq!(
        QuestionType::from_raw("text_group"),
        Some(QuestionType::MultiShortText)
    );
    assert_eq!(
        QuestionType::from_raw("textarea_group"),
        Some(QuestionType::MultiLongText)
    );
    assert_eq!(
        QuestionType::from_raw("textarea"),
        Some(QuestionType::PlainText)
    );
}

#[test]
fn question_type_parse_is_case_insensitive_and_trimmed() {
    assert_eq!(
        QuestionType::from_raw("  RADIO "),
        Some(QuestionType::SingleChoice)
    );
    assert_eq!(QuestionType::from_raw("Mixed"), Some(QuestionType::Mixed));
}

#[test]
fn question_type_rejects_unknown_values() {
    assert_eq!(QuestionType::from_raw("essay_v2"), None);
    assert_eq!(QuestionType::from_raw(""), None);
}

#[test]
fn difficulty_choice_parses_adjustments_and_skip() {
    assert_eq!(DifficultyChoice::parse("skip"), Some(DifficultyChoice::Skip));
    assert_eq!(DifficultyChoice::parse("Skip"), Some(DifficultyChoice::Skip));
    assert_eq!(
        DifficultyChoice::parse("-1"),
        Some(DifficultyChoice::Adjust(-1))
    );
    assert_eq!(
        DifficultyChoice::parse("0"),
        Some(DifficultyChoice::Adjust(0))
    );
    assert_eq!(
        DifficultyChoice::parse("+1"),
        Some(DifficultyChoice::Adjust(1))
    );
}

#[test]
fn difficulty_choice_rejects_out_of_range_values() {
    assert_eq!(DifficultyChoice::parse("2"), None);
    assert_eq!(DifficultyChoice::parse("-3"), None);
    assert_eq!(DifficultyChoice::parse("much harder"), None);
}

#[test]
fn page_events_deserialize_from_queue_entries() {
    let changed: PageEvent =
        serde_json::from_value(json!({ "kind": "answer-changed", "questionNum": 7 })).unwrap();
    assert_eq!(changed, PageEvent::AnswerChanged { question_num: 7 });

    let submit: PageEvent = serde_json::from_value(json!({ "kind": "submit-clicked" })).unwrap();
    assert_eq!(submit, PageEvent::SubmitClicked);
}

#[test]
fn sync_status_round_trips_as_str() {
    assert_eq!(SyncStatus::Unsynced.as_str(), "unsynced");
    assert_eq!(SyncStatus::Pending.as_str(), "pending");
    assert_eq!(SyncStatus::Synced.as_str(), "synced");
    assert_eq!(SyncStatus::Failed.as_str(), "failed");
    assert_eq!(SyncStatus::default(), SyncStatus::Unsynced);
}
