use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use ytdigest::{TranscriptProvider, VideoId};
use ytdigest::youtube::TrackList;

#[derive(Clone)]
pub struct MockTranscripts {
    pub text: String,
    pub delay: Duration,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockTranscripts {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::new("")
        }
    }

    /// Blocks the worker for `delay` before answering
    pub fn stalled(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl TranscriptProvider for MockTranscripts {
    fn fetch_transcript(&self, video_id: &VideoId) -> eyre::Result<String> {
        self.calls.lock().unwrap().push(video_id.to_string());
        thread::sleep(self.delay);
        if let Some(ref msg) = self.fail_with {
            return Err(eyre::eyre!("{}", msg));
        }
        Ok(self.text.clone())
    }
}

/// Runs real track selection over a fixed listing, then returns `text`
pub struct ListedTranscripts {
    pub tracks: TrackList,
    pub languages: Vec<String>,
    pub text: String,
}

impl TranscriptProvider for ListedTranscripts {
    fn fetch_transcript(&self, _video_id: &VideoId) -> eyre::Result<String> {
        self.tracks.select(&self.languages)?;
        Ok(self.text.clone())
    }
}
