//! Service layer: per-invocation orchestration.
//!
//! [`WebhookService`] drives one inbound envelope through acknowledgment,
//! generation, materialization, publishing, and notification. The
//! [`Materializer`] owns the decode/convert/record step.

pub mod materializer;
pub mod webhook_service;

pub use materializer::Materializer;
pub use webhook_service::WebhookService;

#[cfg(test)]
pub(crate) mod fakes;
