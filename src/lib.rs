//! # imagegen-webhook
//!
//! Chat webhook that turns a user's message into a generated image.
//!
//! The messaging platform posts a callback, the service asks the image
//! generation API for one picture, converts it to PNG, records who asked
//! for what, uploads it to the image host, and pushes the link back to the
//! user together with how long it took.
//!
//! ## Architecture
//!
//! ```text
//! Messaging platform (POST /callback)
//!     │
//!     ├── Webhook Handler (api/)
//!     │
//!     ├── WebhookService (service/)
//!     │     └── Materializer ── imaging (PNG conversion)
//!     │
//!     ├── Clients (clients/): generator, messaging, image host
//!     │
//!     └── PostgreSQL Persistence (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod imaging;
pub mod persistence;
pub mod service;
