//! The metadata row written once per successful generation.

use serde::{Deserialize, Serialize};

use super::UserId;

/// Metadata describing one generated image.
///
/// Built immediately after the image bytes decode, written once through a
/// [`crate::persistence::GenerationStore`], and never updated. The pair
/// `(user_id, timestamp)` identifies the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Requester on the messaging platform.
    pub user_id: UserId,
    /// Display name resolved for this invocation.
    pub user_name: String,
    /// `created` value assigned by the generation service (unix seconds).
    pub timestamp: i64,
    /// Prompt exactly as the user sent it.
    pub user_prompt: String,
    /// Prompt as rewritten by the generation model.
    pub revised_prompt: String,
}
