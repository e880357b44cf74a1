//! Webhook service: runs one inbound envelope to a terminal [`Outcome`].

use std::sync::Arc;

use tokio::time::Instant;

use crate::clients::{GenerationResponse, ImageGenerator, ImageHost, MessagingClient, PushMessage};
use crate::domain::inbound::WebhookEnvelope;
use crate::domain::notice;
use crate::domain::outcome::whole_seconds;
use crate::domain::{InboundMessage, Outcome, UserId};
use crate::error::WebhookError;
use crate::persistence::GenerationStore;

use super::Materializer;

/// Orchestration layer for a single webhook invocation.
///
/// Every invocation follows the same line: parse → acknowledge → generate
/// → (materialize → publish → notify) or notify-rejected. Any error ends
/// the invocation with the generic error text and a 500 outcome. No step
/// is retried.
#[derive(Debug, Clone)]
pub struct WebhookService {
    generator: Arc<dyn ImageGenerator>,
    messaging: Arc<dyn MessagingClient>,
    image_host: Arc<dyn ImageHost>,
    materializer: Materializer,
}

impl WebhookService {
    /// Creates a new `WebhookService` from its collaborators.
    #[must_use]
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        messaging: Arc<dyn MessagingClient>,
        image_host: Arc<dyn ImageHost>,
        store: Arc<dyn GenerationStore>,
    ) -> Self {
        let materializer = Materializer::new(Arc::clone(&messaging), store);
        Self {
            generator,
            messaging,
            image_host,
            materializer,
        }
    }

    /// Handles a raw webhook body and returns how the invocation ended.
    ///
    /// Never fails: errors are reported to the user and folded into
    /// [`Outcome::Failed`].
    pub async fn handle(&self, body: &[u8]) -> Outcome {
        let envelope = match WebhookEnvelope::from_body(body) {
            Ok(envelope) => envelope,
            Err(err) => return self.fail(None, err).await,
        };
        let sender = envelope.first_sender();

        let message = match InboundMessage::try_from(&envelope) {
            Ok(message) => message,
            Err(err) => return self.fail(sender.as_ref(), err).await,
        };
        if envelope.events.len() > 1 {
            tracing::warn!(
                user_id = %message.user_id,
                ignored = envelope.events.len() - 1,
                "only the first event of the envelope is processed"
            );
        }

        let outcome = match self.run(&message).await {
            Ok(outcome) => outcome,
            Err(WebhookError::UpstreamRejection(reason)) => {
                self.reject(&message.user_id, &reason).await
            }
            Err(err) => self.fail(Some(&message.user_id), err).await,
        };
        tracing::info!(user_id = %message.user_id, outcome = outcome.label(), "invocation finished");
        outcome
    }

    async fn run(&self, message: &InboundMessage) -> Result<Outcome, WebhookError> {
        let user_id = &message.user_id;
        tracing::info!(%user_id, "prompt received");

        self.notify(user_id, vec![PushMessage::text(notice::GENERATING)])
            .await?;
        let started = Instant::now();

        let response = self
            .generator
            .generate(&message.text)
            .await
            .map_err(|e| WebhookError::GenerationFailure(e.to_string()))?;
        let image = match response {
            GenerationResponse::Generated(image) => image,
            GenerationResponse::Rejected(reason) => {
                return Err(WebhookError::UpstreamRejection(reason));
            }
        };

        let converted = self
            .materializer
            .materialize(&image, user_id, &message.text)
            .await?;

        let url = self
            .image_host
            .upload(&converted)
            .await
            .map_err(|e| WebhookError::PublishFailure(e.to_string()))?;
        drop(converted);

        let elapsed_secs = whole_seconds(started.elapsed());
        self.notify(
            user_id,
            vec![
                PushMessage::text(notice::elapsed_text(elapsed_secs)),
                PushMessage::image(&url),
            ],
        )
        .await?;

        tracing::info!(%user_id, elapsed_secs, %url, "image delivered");
        Ok(Outcome::NotifiedSuccess { url, elapsed_secs })
    }

    /// Reports a refused prompt. The refusal itself is a handled case.
    async fn reject(&self, user_id: &UserId, reason: &str) -> Outcome {
        tracing::info!(%user_id, reason, "prompt rejected by generation service");
        match self
            .notify(user_id, vec![PushMessage::text(notice::REJECTED)])
            .await
        {
            Ok(()) => Outcome::NotifiedRejected,
            Err(err) => self.fail(Some(user_id), err).await,
        }
    }

    /// Logs `err`, sends the generic error text when a recipient is known,
    /// and ends the invocation.
    async fn fail(&self, user_id: Option<&UserId>, err: WebhookError) -> Outcome {
        tracing::error!(user_id = ?user_id.map(UserId::as_str), kind = err.kind(), error = %err, "invocation failed");

        match user_id {
            Some(user_id) => {
                if let Err(push_err) = self
                    .messaging
                    .push(user_id, vec![PushMessage::text(notice::GENERIC_ERROR)])
                    .await
                {
                    tracing::warn!(%user_id, error = %push_err, "could not deliver error notice");
                }
            }
            None => tracing::warn!("no sender in envelope; error notice not sent"),
        }

        Outcome::Failed(err)
    }

    async fn notify(&self, user_id: &UserId, messages: Vec<PushMessage>) -> Result<(), WebhookError> {
        self.messaging
            .push(user_id, messages)
            .await
            .map_err(|e| WebhookError::NotificationFailure(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::clients::GeneratedImage;
    use crate::domain::GenerationRecord;
    use crate::imaging::tests::sample_png_b64;
    use crate::service::fakes::{FakeGenerator, FakeHost, FakeMessaging, FakeStore, Script};

    const HOSTED_URL: &str = "https://i.gyazo.com/abc.png";

    struct Harness {
        generator: Arc<FakeGenerator>,
        messaging: Arc<FakeMessaging>,
        host: Arc<FakeHost>,
        store: Arc<FakeStore>,
        service: WebhookService,
    }

    fn harness_with(generator: FakeGenerator, messaging: FakeMessaging, host: FakeHost) -> Harness {
        let generator = Arc::new(generator);
        let messaging = Arc::new(messaging);
        let host = Arc::new(host);
        let store = Arc::new(FakeStore::default());
        let service = WebhookService::new(
            Arc::clone(&generator) as Arc<dyn ImageGenerator>,
            Arc::clone(&messaging) as Arc<dyn MessagingClient>,
            Arc::clone(&host) as Arc<dyn ImageHost>,
            Arc::clone(&store) as Arc<dyn GenerationStore>,
        );
        Harness {
            generator,
            messaging,
            host,
            store,
            service,
        }
    }

    fn harness(script: Script) -> Harness {
        harness_with(
            FakeGenerator::new(script),
            FakeMessaging::new(Some("Taro")),
            FakeHost::new(Some(HOSTED_URL)),
        )
    }

    fn fox() -> Script {
        Script::Generated(GeneratedImage {
            b64_json: sample_png_b64(),
            revised_prompt: Some("A red fox standing in snow".to_string()),
            created: 1_700_000_000,
        })
    }

    fn body(text: &str) -> Vec<u8> {
        serde_json::json!({
            "destination": "Uxxxxxxxx",
            "events": [{
                "type": "message",
                "source": {"type": "user", "userId": "U1"},
                "message": {"type": "text", "id": "1", "text": text}
            }]
        })
        .to_string()
        .into_bytes()
    }

    #[tokio::test(start_paused = true)]
    async fn success_flow_records_publishes_and_notifies() {
        let h = harness_with(
            FakeGenerator::new(fox()).with_delay(Duration::from_millis(12_700)),
            FakeMessaging::new(Some("Taro")),
            FakeHost::new(Some(HOSTED_URL)),
        );

        let outcome = h.service.handle(&body("a red fox in snow")).await;
        let Outcome::NotifiedSuccess { url, elapsed_secs } = outcome else {
            panic!("expected success");
        };
        assert_eq!(url, HOSTED_URL);
        assert_eq!(elapsed_secs, 12);

        assert_eq!(
            h.generator.prompts.lock().await.as_slice(),
            ["a red fox in snow".to_string()]
        );
        assert_eq!(
            h.store.records.lock().await.as_slice(),
            [GenerationRecord {
                user_id: UserId::from("U1"),
                user_name: "Taro".to_string(),
                timestamp: 1_700_000_000,
                user_prompt: "a red fox in snow".to_string(),
                revised_prompt: "A red fox standing in snow".to_string(),
            }]
        );
        assert_eq!(h.host.uploads.lock().await.len(), 1);

        let pushes = h.messaging.pushes.lock().await;
        assert_eq!(pushes.len(), 2);
        assert_eq!(
            pushes.first().map(|(_, m)| m.clone()),
            Some(vec![PushMessage::text(notice::GENERATING)])
        );
        assert_eq!(
            pushes.get(1).map(|(to, m)| (to.clone(), m.clone())),
            Some((
                UserId::from("U1"),
                vec![
                    PushMessage::text("生成に掛かった時間: 12秒"),
                    PushMessage::image(HOSTED_URL),
                ]
            ))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_time_excludes_the_acknowledgment() {
        let h = harness_with(
            FakeGenerator::new(fox()).with_delay(Duration::from_millis(3_400)),
            FakeMessaging::new(Some("Taro")).slow_push_at(1, Duration::from_secs(5)),
            FakeHost::new(Some(HOSTED_URL)),
        );

        let started = tokio::time::Instant::now();
        let outcome = h.service.handle(&body("quick")).await;
        assert!(started.elapsed() >= Duration::from_millis(8_400));
        assert!(matches!(
            outcome,
            Outcome::NotifiedSuccess { elapsed_secs: 3, .. }
        ));
    }

    #[tokio::test]
    async fn rejection_sends_one_message_and_skips_the_pipeline() {
        let h = harness(Script::Rejected("content_policy_violation".to_string()));

        let outcome = h.service.handle(&body("something unsafe")).await;
        assert!(matches!(outcome, Outcome::NotifiedRejected));
        assert_eq!(outcome.status_code(), axum::http::StatusCode::OK);

        assert_eq!(
            h.messaging.texts().await,
            [notice::GENERATING.to_string(), notice::REJECTED.to_string()]
        );
        assert_eq!(h.messaging.profile_call_count(), 0);
        assert!(h.host.uploads.lock().await.is_empty());
        assert!(h.store.records.lock().await.is_empty());
    }

    #[tokio::test]
    async fn missing_text_fails_and_notifies_once() {
        let h = harness(fox());
        let body = br#"{"events":[{"type":"message","source":{"userId":"U1"},"message":{"type":"sticker"}}]}"#;

        let outcome = h.service.handle(body).await;
        assert!(matches!(outcome, Outcome::Failed(WebhookError::Parse(_))));
        assert_eq!(
            outcome.status_code(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(h.messaging.texts().await, [notice::GENERIC_ERROR.to_string()]);
        assert!(h.generator.prompts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn non_string_text_fails_and_notifies_once() {
        let h = harness(fox());
        let body = br#"{"events":[{"source":{"userId":"U1"},"message":{"type":"text","text":42}}]}"#;

        let outcome = h.service.handle(body).await;
        assert!(matches!(outcome, Outcome::Failed(WebhookError::Parse(_))));
        assert_eq!(h.messaging.texts().await, [notice::GENERIC_ERROR.to_string()]);
        assert!(h.generator.prompts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_later_event_does_not_block_the_first() {
        let h = harness(fox());
        let body = serde_json::json!({
            "events": [
                {"source": {"userId": "U1"}, "message": {"type": "text", "text": "first"}},
                {"source": {"userId": 7}, "message": {"type": "text", "text": ["x"]}}
            ]
        })
        .to_string();

        let outcome = h.service.handle(body.as_bytes()).await;
        assert!(matches!(outcome, Outcome::NotifiedSuccess { .. }));
        assert_eq!(
            h.generator.prompts.lock().await.as_slice(),
            ["first".to_string()]
        );
    }

    #[tokio::test]
    async fn missing_sender_fails_without_notifying() {
        let h = harness(fox());
        let body = br#"{"events":[{"type":"message","source":{"type":"group"},"message":{"text":"hi"}}]}"#;

        let outcome = h.service.handle(body).await;
        assert!(matches!(outcome, Outcome::Failed(WebhookError::Parse(_))));
        assert!(h.messaging.pushes.lock().await.is_empty());
    }

    #[tokio::test]
    async fn generation_transport_error_is_a_generation_failure() {
        let h = harness(Script::Fail("connection reset".to_string()));

        let outcome = h.service.handle(&body("a cat")).await;
        assert!(matches!(
            outcome,
            Outcome::Failed(WebhookError::GenerationFailure(_))
        ));
        assert_eq!(
            h.messaging.texts().await,
            [notice::GENERATING.to_string(), notice::GENERIC_ERROR.to_string()]
        );
    }

    #[tokio::test]
    async fn publish_failure_keeps_the_record() {
        let h = harness_with(
            FakeGenerator::new(fox()),
            FakeMessaging::new(Some("Taro")),
            FakeHost::new(None),
        );

        let outcome = h.service.handle(&body("a red fox in snow")).await;
        assert!(matches!(
            outcome,
            Outcome::Failed(WebhookError::PublishFailure(_))
        ));
        assert_eq!(h.store.records.lock().await.len(), 1);
        assert_eq!(
            h.messaging.texts().await,
            [notice::GENERATING.to_string(), notice::GENERIC_ERROR.to_string()]
        );
    }

    #[tokio::test]
    async fn failed_acknowledgment_stops_before_generation() {
        let h = harness_with(
            FakeGenerator::new(fox()),
            FakeMessaging::new(Some("Taro")).failing_push_at(1),
            FakeHost::new(Some(HOSTED_URL)),
        );

        let outcome = h.service.handle(&body("a red fox in snow")).await;
        assert!(matches!(
            outcome,
            Outcome::Failed(WebhookError::NotificationFailure(_))
        ));
        assert!(h.generator.prompts.lock().await.is_empty());
        assert_eq!(h.messaging.texts().await, [notice::GENERIC_ERROR.to_string()]);
    }

    #[tokio::test]
    async fn only_the_first_event_is_processed() {
        let h = harness(fox());
        let body = serde_json::json!({
            "events": [
                {"source": {"userId": "U1"}, "message": {"type": "text", "text": "first"}},
                {"source": {"userId": "U2"}, "message": {"type": "text", "text": "second"}}
            ]
        })
        .to_string();

        let outcome = h.service.handle(body.as_bytes()).await;
        assert!(matches!(outcome, Outcome::NotifiedSuccess { .. }));
        assert_eq!(
            h.generator.prompts.lock().await.as_slice(),
            ["first".to_string()]
        );
        assert!(
            h.messaging
                .pushes
                .lock()
                .await
                .iter()
                .all(|(to, _)| to.as_str() == "U1")
        );
    }
}
