//! 判分服务 API 客户端 - 业务能力层
//!
//! 封装所有与判分服务相关的调用逻辑

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::models::protocol::{
    CompleteExamRequest, CompleteExamResponse, DifficultyRequest, DifficultyResponse,
    SaveAnswerRequest, SaveAnswerResponse,
};

const SAVE_ENDPOINT: &str = "exam/api/answer/save";
const COMPLETE_ENDPOINT: &str = "exam/api/session/complete";
const DIFFICULTY_ENDPOINT: &str = "exam/api/session/difficulty";

/// 判分服务接口
#[async_trait]
pub trait ExamApi: Send + Sync {
    /// 保存单题答案
    async fn save_answer(&self, request: &SaveAnswerRequest) -> Result<SaveAnswerResponse>;
    /// 交卷
    async fn complete_exam(&self, request: &CompleteExamRequest) -> Result<CompleteExamResponse>;
    /// 提交难度调整选择
    async fn submit_difficulty(&self, request: &DifficultyRequest) -> Result<DifficultyResponse>;
}

/// 判分服务 HTTP 客户端
pub struct HttpExamApi {
    http: reqwest::Client,
    base_url: String,
    token: String,
    save_attempts: u32,
    backoff_ms: u64,
}

impl HttpExamApi {
    /// 创建新的判分服务客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.exam_api_base_url.clone(),
            token: config.exam_token.clone(),
            save_attempts: config.save_retry_attempts.max(1),
            backoff_ms: config.save_retry_backoff_ms,
        }
    }

    async fn post_json<B, R>(&self, endpoint: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header("examtoken", &self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.ok();
            return Err(AppError::api_bad_response(endpoint, Some(status.as_u16()), message).into());
        }

        let parsed = response
            .json::<R>()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;
        Ok(parsed)
    }
}

#[async_trait]
impl ExamApi for HttpExamApi {
    /// 保存单题答案，线性退避重试
    ///
    /// 服务端明确拒绝（success=false）不重试，只有网络层失败才重试
    async fn save_answer(&self, request: &SaveAnswerRequest) -> Result<SaveAnswerResponse> {
        let mut last_err = None;
        for attempt in 1..=self.save_attempts {
            match self
                .post_json::<_, SaveAnswerResponse>(SAVE_ENDPOINT, request)
                .await
            {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    warn!(
                        "保存题目 {} 第 {}/{} 次尝试失败: {}",
                        request.question_id, attempt, self.save_attempts, e
                    );
                    last_err = Some(e);
                    if attempt < self.save_attempts {
                        sleep(Duration::from_millis(self.backoff_ms * attempt as u64)).await;
                    }
                }
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("保存请求未执行")))
    }

    async fn complete_exam(&self, request: &CompleteExamRequest) -> Result<CompleteExamResponse> {
        debug!(
            "交卷请求: {} 题, timer_expired={}, unsaved_count={}",
            request.answers.len(),
            request.timer_expired,
            request.unsaved_count
        );
        self.post_json(COMPLETE_ENDPOINT, request).await
    }

    async fn submit_difficulty(&self, request: &DifficultyRequest) -> Result<DifficultyResponse> {
        debug!("难度调整请求: adjustment={}", request.adjustment);
        self.post_json(DIFFICULTY_ENDPOINT, request).await
    }
}
