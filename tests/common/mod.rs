//! 测试辅助：判分服务 / 页面快照 / 页面交互的内存替身
#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use exam_answer_submit::clock::CountdownClock;
use exam_answer_submit::config::CompletionPolicy;
use exam_answer_submit::models::protocol::{
    CompleteExamRequest, CompleteExamResponse, DifficultyChoice, DifficultyRequest,
    DifficultyResponse, PersistedTimer, SaveAnswerRequest, SaveAnswerResponse,
};
use exam_answer_submit::models::question::{QuestionSnapshot, QuestionType, QuestionUi};
use exam_answer_submit::models::session::QuestionInfo;
use exam_answer_submit::services::dom_reader::SnapshotSource;
use exam_answer_submit::services::exam_api::ExamApi;
use exam_answer_submit::services::prompt::PromptSurface;
use exam_answer_submit::services::timer_store::MemoryTimerStore;
use exam_answer_submit::workflow::SessionCtx;

// ========== 判分服务替身 ==========

pub struct FakeExamApi {
    pub save_calls: Mutex<Vec<SaveAnswerRequest>>,
    pub complete_calls: Mutex<Vec<CompleteExamRequest>>,
    pub difficulty_calls: Mutex<Vec<DifficultyRequest>>,
    pub fail_save_ids: Mutex<HashSet<String>>,
    pub fail_complete: Mutex<bool>,
    pub fail_difficulty: Mutex<bool>,
    pub complete_response: Mutex<CompleteExamResponse>,
    pub difficulty_response: Mutex<DifficultyResponse>,
}

impl FakeExamApi {
    pub fn new() -> Self {
        Self {
            save_calls: Mutex::new(Vec::new()),
            complete_calls: Mutex::new(Vec::new()),
            difficulty_calls: Mutex::new(Vec::new()),
            fail_save_ids: Mutex::new(HashSet::new()),
            fail_complete: Mutex::new(false),
            fail_difficulty: Mutex::new(false),
            complete_response: Mutex::new(CompleteExamResponse {
                success: true,
                show_difficulty_choice: false,
                redirect_url: "https://exam.test/result".to_string(),
                error: None,
            }),
            difficulty_response: Mutex::new(DifficultyResponse {
                success: true,
                action: Some("next_level".to_string()),
                redirect_url: "https://exam.test/next".to_string(),
                message: None,
                error: None,
            }),
        }
    }

    pub fn fail_saves_for(self, ids: &[&str]) -> Self {
        {
            let mut set = self.fail_save_ids.lock().unwrap();
            for id in ids {
                set.insert(id.to_string());
            }
        }
        self
    }

    pub fn with_complete_response(self, response: CompleteExamResponse) -> Self {
        *self.complete_response.lock().unwrap() = response;
        self
    }

    pub fn failing_completion(self) -> Self {
        *self.fail_complete.lock().unwrap() = true;
        self
    }

    pub fn failing_difficulty(self) -> Self {
        *self.fail_difficulty.lock().unwrap() = true;
        self
    }

    pub fn save_call_count(&self) -> usize {
        self.save_calls.lock().unwrap().len()
    }

    pub fn complete_call_count(&self) -> usize {
        self.complete_calls.lock().unwrap().len()
    }

    pub fn difficulty_call_count(&self) -> usize {
        self.difficulty_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ExamApi for FakeExamApi {
    async fn save_answer(&self, request: &SaveAnswerRequest) -> Result<SaveAnswerResponse> {
        self.save_calls.lock().unwrap().push(request.clone());
        if self
            .fail_save_ids
            .lock()
            .unwrap()
            .contains(&request.question_id)
        {
            return Err(anyhow!("网络不可达"));
        }
        Ok(SaveAnswerResponse {
            success: true,
            error: None,
        })
    }

    async fn complete_exam(&self, request: &CompleteExamRequest) -> Result<CompleteExamResponse> {
        self.complete_calls.lock().unwrap().push(request.clone());
        if *self.fail_complete.lock().unwrap() {
            return Err(anyhow!("网络不可达"));
        }
        Ok(self.complete_response.lock().unwrap().clone())
    }

    async fn submit_difficulty(&self, request: &DifficultyRequest) -> Result<DifficultyResponse> {
        self.difficulty_calls.lock().unwrap().push(request.clone());
        if *self.fail_difficulty.lock().unwrap() {
            return Err(anyhow!("网络不可达"));
        }
        Ok(self.difficulty_response.lock().unwrap().clone())
    }
}

// ========== 页面快照替身 ==========

#[derive(Default)]
pub struct FakeSnapshotSource {
    pub snapshots: Mutex<HashMap<u32, QuestionSnapshot>>,
}

impl FakeSnapshotSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, snapshot: QuestionSnapshot) {
        self.snapshots
            .lock()
            .unwrap()
            .insert(snapshot.question_num, snapshot);
    }
}

#[async_trait]
impl SnapshotSource for FakeSnapshotSource {
    async fn snapshot(&self, info: &QuestionInfo) -> Result<Option<QuestionSnapshot>> {
        Ok(self.snapshots.lock().unwrap().get(&info.num).cloned())
    }
}

// ========== 页面交互替身 ==========

pub struct FakePrompt {
    pub actions: Mutex<Vec<String>>,
    pub choices: Mutex<VecDeque<DifficultyChoice>>,
    /// 设置后，poll_choice 被调用时先把该时钟耗尽再返回
    pub expire_on_poll: Mutex<Option<CountdownClock>>,
}

impl FakePrompt {
    pub fn new() -> Self {
        Self {
            actions: Mutex::new(Vec::new()),
            choices: Mutex::new(VecDeque::new()),
            expire_on_poll: Mutex::new(None),
        }
    }

    pub fn with_choice(self, choice: DifficultyChoice) -> Self {
        self.choices.lock().unwrap().push_back(choice);
        self
    }

    pub fn expiring_clock_on_poll(self, clock: CountdownClock) -> Self {
        *self.expire_on_poll.lock().unwrap() = Some(clock);
        self
    }

    pub fn recorded(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    pub fn saw(&self, action: &str) -> bool {
        self.actions
            .lock()
            .unwrap()
            .iter()
            .any(|a| a.starts_with(action))
    }

    fn record(&self, action: String) {
        self.actions.lock().unwrap().push(action);
    }
}

#[async_trait]
impl PromptSurface for FakePrompt {
    async fn show_difficulty_dialog(&self) -> Result<()> {
        self.record("show".to_string());
        Ok(())
    }

    async fn hide_difficulty_dialog(&self) -> Result<()> {
        self.record("hide".to_string());
        Ok(())
    }

    async fn set_difficulty_controls_enabled(&self, enabled: bool) -> Result<()> {
        self.record(format!("controls:{}", enabled));
        Ok(())
    }

    async fn poll_choice(&self) -> Result<Option<DifficultyChoice>> {
        let clock = self.expire_on_poll.lock().unwrap().clone();
        if let Some(clock) = clock {
            exhaust_clock(&clock).await;
        }
        Ok(self.choices.lock().unwrap().pop_front())
    }

    async fn toast(&self, message: &str) -> Result<()> {
        self.record(format!("toast:{}", message));
        Ok(())
    }

    async fn alert(&self, message: &str) -> Result<()> {
        self.record(format!("alert:{}", message));
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.record(format!("navigate:{}", url));
        Ok(())
    }
}

// ========== 构造辅助 ==========

pub fn question_info(id: &str, num: u32, kind: QuestionType) -> QuestionInfo {
    QuestionInfo {
        id: id.to_string(),
        num,
        kind,
    }
}

pub fn snapshot(id: &str, num: u32, kind: QuestionType, ui: QuestionUi) -> QuestionSnapshot {
    QuestionSnapshot {
        question_id: id.to_string(),
        question_num: num,
        question_type: kind,
        ui,
    }
}

pub fn session_ctx(policy: CompletionPolicy, immediate_sync: bool) -> SessionCtx {
    SessionCtx {
        session_id: "session-1".to_string(),
        fallback_redirect: "https://exam.test/fallback".to_string(),
        immediate_sync,
        policy,
    }
}

/// 新建并启动一个倒计时
pub async fn running_clock(total: u32) -> (CountdownClock, Arc<MemoryTimerStore>) {
    let store = Arc::new(MemoryTimerStore::new());
    let clock = CountdownClock::with_persisted(
        "session-1",
        total,
        vec![300, 60, 30],
        store.clone(),
        None,
        0,
    );
    clock.start().await.unwrap();
    (clock, store)
}

/// 构建一个恢复时即已过期的倒计时
pub fn expired_clock() -> (CountdownClock, Arc<MemoryTimerStore>) {
    let store = Arc::new(MemoryTimerStore::new());
    let persisted = PersistedTimer {
        remaining_time: 10,
        total_time: 10,
        timestamp: 0,
        is_running: true,
    };
    let clock = CountdownClock::with_persisted(
        "session-1",
        10,
        vec![300, 60, 30],
        store.clone(),
        Some(persisted),
        12_000,
    );
    (clock, store)
}

/// 把一个运行中的倒计时耗尽到过期
pub async fn exhaust_clock(clock: &CountdownClock) {
    for _ in 0..10_000 {
        if clock.is_expired() {
            return;
        }
        clock.tick().await;
    }
    panic!("时钟未能在限定步数内过期");
}
