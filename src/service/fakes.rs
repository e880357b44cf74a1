//! Recording test doubles for the service's collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::clients::{
    ClientError, GeneratedImage, GenerationResponse, ImageGenerator, ImageHost, MessagingClient,
    PushMessage,
};
use crate::domain::{GenerationRecord, UserId};
use crate::imaging::ConvertedImage;
use crate::persistence::{GenerationStore, PersistenceError};

/// What the fake generator answers.
#[derive(Debug, Clone)]
pub(crate) enum Script {
    Generated(GeneratedImage),
    Rejected(String),
    Fail(String),
}

#[derive(Debug)]
pub(crate) struct FakeGenerator {
    script: Script,
    delay: Duration,
    pub(crate) prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub(crate) fn new(script: Script) -> Self {
        Self {
            script,
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Sleeps for `delay` before answering (use with a paused clock).
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl ImageGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<GenerationResponse, ClientError> {
        self.prompts.lock().await.push(prompt.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.script {
            Script::Generated(image) => Ok(GenerationResponse::Generated(image.clone())),
            Script::Rejected(message) => Ok(GenerationResponse::Rejected(message.clone())),
            Script::Fail(message) => Err(ClientError::Decode(message.clone())),
        }
    }
}

#[derive(Debug)]
pub(crate) struct FakeMessaging {
    display_name: Option<String>,
    /// Push number (1-based) that fails, if any.
    fail_push_at: Option<usize>,
    /// Push number (1-based) that is delayed, and by how long.
    slow_push_at: Option<(usize, Duration)>,
    push_attempts: AtomicUsize,
    pub(crate) profile_calls: AtomicUsize,
    pub(crate) pushes: Mutex<Vec<(UserId, Vec<PushMessage>)>>,
}

impl FakeMessaging {
    pub(crate) fn new(display_name: Option<&str>) -> Self {
        Self {
            display_name: display_name.map(str::to_string),
            fail_push_at: None,
            slow_push_at: None,
            push_attempts: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
            pushes: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing_push_at(mut self, attempt: usize) -> Self {
        self.fail_push_at = Some(attempt);
        self
    }

    /// Sleeps for `delay` before completing push number `attempt` (use
    /// with a paused clock).
    pub(crate) fn slow_push_at(mut self, attempt: usize, delay: Duration) -> Self {
        self.slow_push_at = Some((attempt, delay));
        self
    }

    pub(crate) fn profile_call_count(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    /// Every successfully delivered text message, in order.
    pub(crate) async fn texts(&self) -> Vec<String> {
        self.pushes
            .lock()
            .await
            .iter()
            .flat_map(|(_, messages)| messages.iter())
            .filter_map(|message| match message {
                PushMessage::Text { text } => Some(text.clone()),
                PushMessage::Image { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl MessagingClient for FakeMessaging {
    async fn display_name(&self, _user_id: &UserId) -> Result<String, ClientError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.display_name
            .clone()
            .ok_or(ClientError::MissingField("displayName"))
    }

    async fn push(&self, to: &UserId, messages: Vec<PushMessage>) -> Result<(), ClientError> {
        let attempt = self.push_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((_, delay)) = self.slow_push_at.filter(|(slow, _)| *slow == attempt) {
            tokio::time::sleep(delay).await;
        }
        if self.fail_push_at == Some(attempt) {
            return Err(ClientError::Status {
                status: 500,
                body: "push failed".to_string(),
            });
        }
        self.pushes.lock().await.push((to.clone(), messages));
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct FakeHost {
    url: Option<String>,
    pub(crate) uploads: Mutex<Vec<ConvertedImage>>,
}

impl FakeHost {
    pub(crate) fn new(url: Option<&str>) -> Self {
        Self {
            url: url.map(str::to_string),
            uploads: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ImageHost for FakeHost {
    async fn upload(&self, image: &ConvertedImage) -> Result<String, ClientError> {
        self.uploads.lock().await.push(image.clone());
        self.url.clone().ok_or(ClientError::MissingField("url"))
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeStore {
    fail: bool,
    pub(crate) records: Mutex<Vec<GenerationRecord>>,
}

impl FakeStore {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            records: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl GenerationStore for FakeStore {
    async fn put(&self, record: &GenerationRecord) -> Result<(), PersistenceError> {
        if self.fail {
            return Err(PersistenceError::Database(sqlx::Error::PoolTimedOut));
        }
        self.records.lock().await.push(record.clone());
        Ok(())
    }
}
