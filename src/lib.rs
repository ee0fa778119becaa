pub mod config;
pub mod error;
pub mod executor;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod summarize;
pub mod summary;
pub mod youtube;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

pub use error::{ErrorKind, PipelineError};
pub use pipeline::Pipeline;
pub use summarize::{ChatMessage, CompletionClient, OpenAiClient, Role};
pub use summary::{Chapter, StructuredSummary};
pub use youtube::{CaptionClient, TranscriptProvider};

/// A single captioned segment
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// An 11-character YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub const LEN: usize = 11;

    /// Accepts exactly 11 characters drawn from `[A-Za-z0-9_-]`.
    pub fn parse(token: &str) -> Option<Self> {
        let valid = token.len() == Self::LEN
            && token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        valid.then(|| VideoId(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static YOUTUBE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(https?://)?(www\.)?(youtube|youtu|youtube-nocookie)\.(com|be)/(watch\?v=|embed/|v/|.+\?v=)?([^&=%?]{11})",
    )
    .expect("static regex")
});

static V_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[?&#/])v=([0-9A-Za-z_-]{11})").expect("static regex"));

static PATH_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([0-9A-Za-z_-]{11})(?:[/?&#]|$)").expect("static regex"));

/// Syntactic check that the input looks like a YouTube video URL
pub fn validate_url(url: &str) -> Result<(), PipelineError> {
    if YOUTUBE_URL.is_match(url.trim()) {
        Ok(())
    } else {
        Err(PipelineError::InvalidUrl { url: url.to_string() })
    }
}

/// Extract the video ID from a `watch?v=`, `youtu.be/`, `embed/` or `shorts/` URL
pub fn extract_video_id(url: &str) -> Result<VideoId, PipelineError> {
    let input = url.trim();

    V_PARAM
        .captures(input)
        .or_else(|| PATH_SEGMENT.captures(input))
        .and_then(|caps| VideoId::parse(&caps[1]))
        .ok_or_else(|| PipelineError::VideoIdNotFound { url: url.to_string() })
}
