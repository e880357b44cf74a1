//! Fixed user-facing texts pushed back to the chat.

/// Sent as soon as a prompt is accepted.
pub const GENERATING: &str = "〜生成中〜";

/// Sent when the generation API refuses the prompt.
pub const REJECTED: &str =
    "安全性の低い指示文を検出したためエラーが発生しました。\n指示文を変えて送り直してください。";

/// Sent for every unexpected failure.
pub const GENERIC_ERROR: &str = "エラーが発生しました。";

/// Body of the response envelope on success and rejection.
pub const OK_BODY: &str = "";

/// Body of the response envelope on failure.
pub const ERROR_BODY: &str = "Error";

/// Formats the elapsed-time message sent ahead of the image.
#[must_use]
pub fn elapsed_text(elapsed_secs: u64) -> String {
    format!("生成に掛かった時間: {elapsed_secs}秒")
}
