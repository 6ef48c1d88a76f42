//! 难度选择协议测试：入场守卫、活性巡检、选择处理

mod common;

use std::sync::Arc;

use common::{expired_clock, running_clock, session_ctx, FakeExamApi, FakePrompt};
use exam_answer_submit::clock::ClockState;
use exam_answer_submit::config::CompletionPolicy;
use exam_answer_submit::models::protocol::DifficultyChoice;
use exam_answer_submit::services::timer_store::TimerStore;
use exam_answer_submit::workflow::{DifficultyFlow, DifficultyState};
use tokio::time::Duration;

const DEFAULT_REDIRECT: &str = "https://exam.test/result";

fn flow(
    clock: exam_answer_submit::clock::CountdownClock,
    api: Arc<FakeExamApi>,
    prompt: Arc<FakePrompt>,
) -> DifficultyFlow {
    DifficultyFlow::new(
        session_ctx(CompletionPolicy::None, false),
        clock,
        api,
        prompt,
    )
    .with_poll_interval(Duration::from_millis(5))
}

#[tokio::test]
async fn never_renders_when_clock_already_expired() {
    let (clock, _store) = expired_clock();
    let api = Arc::new(FakeExamApi::new());
    let prompt = Arc::new(FakePrompt::new());

    let state = flow(clock, api.clone(), prompt.clone())
        .run(DEFAULT_REDIRECT)
        .await
        .unwrap();

    assert_eq!(state, DifficultyState::AutoClosedByExpiry);
    // 弹窗一次都没有展示，直接跳转结果页
    assert!(!prompt.saw("show"));
    assert!(prompt.saw(&format!("navigate:{}", DEFAULT_REDIRECT)));
    assert_eq!(api.difficulty_call_count(), 0);
}

#[tokio::test]
async fn liveness_check_closes_dialog_on_expiry() {
    let (clock, store) = running_clock(1).await;
    let api = Arc::new(FakeExamApi::new());
    // 轮询时把时钟耗尽但不给出任何选择
    let prompt = Arc::new(FakePrompt::new().expiring_clock_on_poll(clock.clone()));

    let state = flow(clock, api.clone(), prompt.clone())
        .run(DEFAULT_REDIRECT)
        .await
        .unwrap();

    assert_eq!(state, DifficultyState::AutoClosedByExpiry);
    assert!(prompt.saw("show"));
    assert!(prompt.saw("hide"));
    assert!(prompt.saw("controls:false"));
    assert!(prompt.saw("alert:"));
    assert!(prompt.saw(&format!("navigate:{}", DEFAULT_REDIRECT)));
    // 持久化状态被清除
    assert!(store.load("session-1").await.unwrap().is_none());
    assert_eq!(api.difficulty_call_count(), 0);
}

#[tokio::test]
async fn choice_after_expiry_is_discarded() {
    let (clock, _store) = running_clock(1).await;
    let api = Arc::new(FakeExamApi::new());
    // 用户做出了选择，但选择到达时时钟已经过期
    let prompt = Arc::new(
        FakePrompt::new()
            .with_choice(DifficultyChoice::Adjust(1))
            .expiring_clock_on_poll(clock.clone()),
    );

    let state = flow(clock, api.clone(), prompt.clone())
        .run(DEFAULT_REDIRECT)
        .await
        .unwrap();

    // 与活性巡检发现过期的处理完全一致，不发起选择调用
    assert_eq!(state, DifficultyState::AutoClosedByExpiry);
    assert_eq!(api.difficulty_call_count(), 0);
    assert!(prompt.saw(&format!("navigate:{}", DEFAULT_REDIRECT)));
}

#[tokio::test]
async fn skip_navigates_without_network_call() {
    let (clock, store) = running_clock(600).await;
    let api = Arc::new(FakeExamApi::new());
    let prompt = Arc::new(FakePrompt::new().with_choice(DifficultyChoice::Skip));

    let state = flow(clock.clone(), api.clone(), prompt.clone())
        .run(DEFAULT_REDIRECT)
        .await
        .unwrap();

    assert_eq!(state, DifficultyState::Skipped);
    assert_eq!(api.difficulty_call_count(), 0);
    assert!(prompt.saw(&format!("navigate:{}", DEFAULT_REDIRECT)));
    // 选择落定即停表并清除持久化状态
    assert_eq!(clock.state(), ClockState::Stopped);
    assert!(store.load("session-1").await.unwrap().is_none());
}

#[tokio::test]
async fn adjustment_choice_follows_server_redirect() {
    let (clock, _store) = running_clock(600).await;
    let api = Arc::new(FakeExamApi::new());
    let prompt = Arc::new(FakePrompt::new().with_choice(DifficultyChoice::Adjust(-1)));

    let state = flow(clock, api.clone(), prompt.clone())
        .run(DEFAULT_REDIRECT)
        .await
        .unwrap();

    assert_eq!(state, DifficultyState::ChoiceMade);
    assert_eq!(api.difficulty_call_count(), 1);
    let request = api.difficulty_calls.lock().unwrap().remove(0);
    assert_eq!(request.adjustment, -1);
    assert!(prompt.saw("controls:false"));
    assert!(prompt.saw("navigate:https://exam.test/next"));
}

#[tokio::test]
async fn adjustment_failure_falls_back_to_default_redirect() {
    let (clock, _store) = running_clock(600).await;
    let api = Arc::new(FakeExamApi::new().failing_difficulty());
    let prompt = Arc::new(FakePrompt::new().with_choice(DifficultyChoice::Adjust(1)));

    let state = flow(clock, api.clone(), prompt.clone())
        .run(DEFAULT_REDIRECT)
        .await
        .unwrap();

    assert_eq!(state, DifficultyState::ChoiceMade);
    assert_eq!(api.difficulty_call_count(), 1);
    assert!(prompt.saw("alert:"));
    assert!(prompt.saw(&format!("navigate:{}", DEFAULT_REDIRECT)));
}
