use crate::VideoId;
use crate::summarize::ChatMessage;

/// Transcript budget in characters, keeping the request well inside the LLM latency budget
pub const MAX_TRANSCRIPT_CHARS: usize = 12_000;

pub const PROMPT_VERSION: &str = "summary_v1";
pub const SYSTEM_PROMPT: &str = include_str!("./prompts/summary_v1.txt");

/// Cut `text` to at most `max_chars` characters, on a character boundary.
pub fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Build the `[system, user]` message pair for one transcript
pub fn build_prompt(transcript: &str, video_id: &VideoId) -> Vec<ChatMessage> {
    let transcript = truncate(transcript, MAX_TRANSCRIPT_CHARS);
    // The caption source carries no title.
    let title = format!("Video ID: {video_id}");

    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(format!("Video title: {title}\n\nRaw transcript:\n{transcript}")),
    ]
}
