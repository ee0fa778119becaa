use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::config::Config;
use crate::error::PipelineError;
use crate::executor::{BoundedError, run_bounded};
use crate::prompt::{self, PROMPT_VERSION};
use crate::summarize::{CompletionClient, OpenAiClient, summarize};
use crate::summary::{StructuredSummary, parse_summary};
use crate::youtube::{CaptionClient, TranscriptProvider};
use crate::{VideoId, extract_video_id};

/// URL → video ID → transcript → prompt → completion → validated summary.
///
/// Holds no per-request state; one instance serves any number of concurrent calls.
pub struct Pipeline<T, C> {
    transcripts: Arc<T>,
    completions: C,
    extract_timeout: Duration,
    llm_timeout: Duration,
}

impl Pipeline<CaptionClient, OpenAiClient> {
    /// Production pipeline: InnerTube captions and an OpenAI-compatible LLM
    pub fn from_config(config: &Config) -> eyre::Result<Self> {
        config.validate()?;
        Ok(Self::new(
            CaptionClient::from_config(config),
            OpenAiClient::from_config(config)?,
            config.extract_timeout()?,
            config.llm_timeout()?,
        ))
    }
}

impl<T, C> Pipeline<T, C>
where
    T: TranscriptProvider,
    C: CompletionClient,
{
    pub fn new(transcripts: T, completions: C, extract_timeout: Duration, llm_timeout: Duration) -> Self {
        Self {
            transcripts: Arc::new(transcripts),
            completions,
            extract_timeout,
            llm_timeout,
        }
    }

    /// Run every stage once for `url`; the first failing stage ends the run.
    pub async fn process(&self, url: &str) -> Result<StructuredSummary, PipelineError> {
        let video_id = extract_video_id(url)?;
        info!("Processing video {video_id}");

        let transcript = self.acquire_transcript(&video_id).await?;
        if transcript.trim().is_empty() {
            return Err(PipelineError::TranscriptEmpty {
                video_id: video_id.to_string(),
            });
        }
        debug!("Transcript for {video_id}: {} chars", transcript.chars().count());

        let messages = prompt::build_prompt(&transcript, &video_id);
        debug!("Built prompt {PROMPT_VERSION} for {video_id}");

        let raw = summarize(&self.completions, &messages, self.llm_timeout).await?;
        let summary = parse_summary(&raw)?;

        info!("Summarized {video_id}: {:?}", summary.title);
        Ok(summary)
    }

    async fn acquire_transcript(&self, video_id: &VideoId) -> Result<String, PipelineError> {
        let provider = Arc::clone(&self.transcripts);
        let id = video_id.clone();

        run_bounded("transcript", self.extract_timeout, move || provider.fetch_transcript(&id))
            .await
            .map_err(|e| match e {
                BoundedError::TimedOut(timeout) => PipelineError::ExtractionTimeout {
                    video_id: video_id.to_string(),
                    timeout,
                },
                BoundedError::Failed(cause) => PipelineError::TranscriptUnavailable {
                    video_id: video_id.to_string(),
                    cause: format!("{cause:#}"),
                },
            })
    }
}
