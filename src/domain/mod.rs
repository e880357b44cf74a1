//! Domain layer: identifiers, the generation record, and invocation outcomes.
//!
//! Everything here is free of I/O. Outbound calls live in
//! [`crate::clients`] and the orchestration in [`crate::service`].

pub mod generation_record;
pub mod inbound;
pub mod notice;
pub mod outcome;
pub mod user_id;

pub use generation_record::GenerationRecord;
pub use inbound::InboundMessage;
pub use outcome::Outcome;
pub use user_id::UserId;
