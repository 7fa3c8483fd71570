use crate::mentions::{self, Directory};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Upper bound on transcript body plus persona prompt, in characters.
pub const CHAR_CEILING: usize = 4500;

/// How many recent channel messages feed one transcript.
pub const HISTORY_LIMIT: u8 = 60;

/// Prefix that redacts a message from transcripts and from triggering.
pub const HIDE_MARKER: &str = "!hide";

/// Operator prefix that truncates history visible to the model.
pub const FORGET_MARKER: &str = "!forget";

/// Read-only view of one channel message, as needed for transcript lines.
pub struct HistoryMessage {
    pub author_id: u64,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub attachment_url: Option<String>,
}

/// Builds the instruction-prefixed transcript sent as the user turn.
///
/// `window` is the recent-message window in the order the platform returns
/// it: newest first. The body comes out chronological because accepted lines
/// are prepended.
pub fn build(
    window: &[HistoryMessage],
    persona_prompt: &str,
    persona_name: &str,
    bot_name: &str,
    operator_id: Option<u64>,
    directory: &dyn Directory,
) -> String {
    let body = collect(window, persona_prompt, operator_id, directory);
    format!(
        "Please generate a short message as \"{}\". Only generate a single message. \
        Format the message like the other messages but with your own message, \
        starting with date and \"{}: \". The message itself should be in citations \n\n{}",
        persona_name, bot_name, body
    )
}

fn collect(
    window: &[HistoryMessage],
    persona_prompt: &str,
    operator_id: Option<u64>,
    directory: &dyn Directory,
) -> String {
    let prompt_len = persona_prompt.chars().count();
    let mut transcript = String::new();
    let mut total = 0usize;
    let mut keep_older = true;
    let mut added = 0usize;

    for message in window {
        if message.content.is_empty() {
            continue;
        }

        let mut line = format!(
            "Date: {}, time: {} @{}: \"{}\"\n",
            message.created_at.format("%a %b %d %Y"),
            message.created_at.format("%H:%M:%S"),
            message.author_name,
            mentions::encode(&message.content, directory),
        );
        if let Some(url) = &message.attachment_url {
            line.push_str(url);
            line.push('\n');
        }

        // Over-budget lines are skipped, not a stop condition: a shorter
        // older message may still fit.
        let line_len = line.chars().count();
        if total + line_len + prompt_len > CHAR_CEILING {
            continue;
        }

        // Scanning newest-first, so the latch suppresses everything older
        // than the forget marker, marker line included.
        if operator_id == Some(message.author_id) && message.content.starts_with(FORGET_MARKER) {
            keep_older = false;
        }
        if !keep_older {
            continue;
        }

        if message.content.starts_with(HIDE_MARKER) {
            continue;
        }

        transcript.insert_str(0, &line);
        total += line_len;
        added += 1;
    }

    debug!("Transcript holds {} of {} messages", added, window.len());
    transcript
}
