use std::fmt;

use eyre::{Result, bail, eyre};
use log::{debug, info};
use regex::Regex;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::{Segment, VideoId};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

/// Source of transcript text for a video.
///
/// Implementations are blocking and are always driven from a worker thread, never from an async
/// task.
pub trait TranscriptProvider: Send + Sync + 'static {
    fn fetch_transcript(&self, video_id: &VideoId) -> Result<String>;
}

/// Whether a caption track was authored by a person or generated by speech recognition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Manual,
    Generated,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Manual => write!(f, "manual"),
            TrackKind::Generated => write!(f, "generated"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub language_code: String,
    pub kind: TrackKind,
    pub base_url: String,
}

/// Which track kinds a selection attempt accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackFilter {
    Any,
    Generated,
    Manual,
}

impl TrackFilter {
    fn kinds(self) -> &'static [TrackKind] {
        match self {
            TrackFilter::Any => &[TrackKind::Manual, TrackKind::Generated],
            TrackFilter::Generated => &[TrackKind::Generated],
            TrackFilter::Manual => &[TrackKind::Manual],
        }
    }
}

/// Every caption track published for one video
#[derive(Debug, Clone)]
pub struct TrackList {
    video_id: String,
    tracks: Vec<CaptionTrack>,
}

impl TrackList {
    pub fn new(video_id: impl Into<String>, tracks: Vec<CaptionTrack>) -> Self {
        Self {
            video_id: video_id.into(),
            tracks,
        }
    }

    pub fn tracks(&self) -> &[CaptionTrack] {
        &self.tracks
    }

    pub fn has_generated(&self) -> bool {
        self.tracks.iter().any(|t| t.kind == TrackKind::Generated)
    }

    /// First track in `languages` order whose kind passes `filter`; manual beats generated
    /// within the same language.
    pub fn find(&self, filter: TrackFilter, languages: &[String]) -> Option<&CaptionTrack> {
        languages.iter().find_map(|lang| {
            filter.kinds().iter().find_map(|kind| {
                self.tracks
                    .iter()
                    .find(|t| t.kind == *kind && t.language_code == *lang)
            })
        })
    }

    /// Ordered selector attempts: any kind, then generated-only if the video has generated
    /// tracks, else manual-only.
    fn selection_plan(&self) -> [TrackFilter; 2] {
        let fallback = if self.has_generated() {
            TrackFilter::Generated
        } else {
            TrackFilter::Manual
        };
        [TrackFilter::Any, fallback]
    }

    /// Pick a track in one of the preferred languages. Never falls back to another language.
    pub fn select(&self, languages: &[String]) -> Result<&CaptionTrack> {
        for filter in self.selection_plan() {
            if let Some(track) = self.find(filter, languages) {
                debug!(
                    "Selected {} track '{}' for {} ({filter:?})",
                    track.kind, track.language_code, self.video_id
                );
                return Ok(track);
            }
        }

        let available = self
            .tracks
            .iter()
            .map(|t| format!("{} ({})", t.language_code, t.kind))
            .collect::<Vec<_>>()
            .join(", ");
        bail!(
            "no transcript in [{}] for video {}; available: {}",
            languages.join(", "),
            self.video_id,
            if available.is_empty() { "none" } else { available.as_str() }
        );
    }
}

/// Caption fetcher backed by YouTube's InnerTube player API
#[derive(Debug, Clone)]
pub struct CaptionClient {
    proxy: Option<String>,
    languages: Vec<String>,
}

impl CaptionClient {
    pub fn new(proxy: Option<String>, languages: Vec<String>) -> Self {
        Self { proxy, languages }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.proxy(), config.languages.clone())
    }

    /// Build the blocking HTTP client; must run on the worker thread.
    fn http(&self) -> Result<Client> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(proxy) = &self.proxy {
            debug!("Routing transcript requests through proxy");
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }
        Ok(builder.build()?)
    }

    /// List every caption track for the video
    pub fn list_tracks(&self, http: &Client, video_id: &VideoId) -> Result<TrackList> {
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        debug!("Fetching watch page: {watch_url}");

        let page_html = http
            .get(&watch_url)
            .header("Accept-Language", "en-US")
            .send()?
            .error_for_status()?
            .text()?;

        let api_key = extract_api_key(&page_html)?;
        debug!("Extracted InnerTube API key: {api_key}");

        let player_url = format!("https://www.youtube.com/youtubei/v1/player?key={api_key}&prettyPrint=false");

        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION
                }
            },
            "videoId": video_id.as_str()
        });

        let player_json = http
            .post(&player_url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()?
            .error_for_status()?
            .text()?;

        parse_player_response(video_id, &player_json)
    }

    /// Download and decode the caption segments of one track
    pub fn fetch_segments(&self, http: &Client, track: &CaptionTrack) -> Result<Vec<Segment>> {
        let caption_xml = http
            .get(track.base_url.replace("&fmt=srv3", ""))
            .send()?
            .error_for_status()?
            .text()?;

        parse_caption_xml(&caption_xml)
    }
}

impl TranscriptProvider for CaptionClient {
    fn fetch_transcript(&self, video_id: &VideoId) -> Result<String> {
        let http = self.http()?;
        let tracks = self.list_tracks(&http, video_id)?;
        let track = tracks.select(&self.languages)?;
        let segments = self.fetch_segments(&http, track)?;

        info!(
            "Fetched {} caption segments for {video_id} ({} {})",
            segments.len(),
            track.language_code,
            track.kind
        );
        Ok(join_segments(&segments))
    }
}

/// Concatenate segment texts in order, space-separated
pub fn join_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<RawCaptionTrack>>,
}

#[derive(Debug, Deserialize)]
struct RawCaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    kind: Option<String>,
}

fn parse_player_response(video_id: &VideoId, json: &str) -> Result<TrackList> {
    let resp: PlayerResponse =
        serde_json::from_str(json).map_err(|e| eyre!("unparsable player response for {video_id}: {e}"))?;

    if let Some(status) = &resp.playability_status {
        let state = status.status.as_deref().unwrap_or("OK");
        if state != "OK" {
            let reason = status.reason.as_deref().unwrap_or("no reason given");
            bail!("video {video_id} is not playable ({state}): {reason}");
        }
    }

    let tracks: Vec<CaptionTrack> = resp
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .and_then(|r| r.caption_tracks)
        .unwrap_or_default()
        .into_iter()
        .map(|t| CaptionTrack {
            kind: match t.kind.as_deref() {
                Some("asr") => TrackKind::Generated,
                _ => TrackKind::Manual,
            },
            language_code: t.language_code,
            base_url: t.base_url,
        })
        .collect();

    if tracks.is_empty() {
        bail!("captions are disabled for video {video_id}");
    }

    Ok(TrackList::new(video_id.as_str(), tracks))
}

fn extract_api_key(html: &str) -> Result<String> {
    if html.contains("g-recaptcha") {
        bail!("YouTube is blocking requests from this IP (captcha challenge); configure a proxy");
    }
    if html.contains("action=\"https://consent.youtube.com/s\"") {
        bail!("YouTube returned a cookie consent page instead of the video");
    }

    let re = Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#)?;
    if let Some(caps) = re.captures(html) {
        return Ok(caps[1].to_string());
    }

    // Fallback: try the newer pattern
    let re2 = Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#)?;
    if let Some(caps) = re2.captures(html) {
        return Ok(caps[1].to_string());
    }

    bail!("could not extract InnerTube API key from watch page");
}

fn parse_caption_xml(xml: &str) -> Result<Vec<Segment>> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current_start: Option<f64> = None;
    let mut current_dur: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut dur = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"start" => {
                            start = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        b"dur" => {
                            dur = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        _ => {}
                    }
                }
                current_start = start;
                current_dur = dur;
            }
            Ok(Event::Text(ref e)) => {
                if let Some(start) = current_start.take() {
                    let raw_text = e.unescape().unwrap_or_default().to_string();
                    let text = html_escape::decode_html_entities(&raw_text).trim().to_string();
                    if !text.is_empty() {
                        segments.push(Segment {
                            text,
                            start,
                            duration: current_dur.take().unwrap_or(0.0),
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => bail!("error parsing caption XML: {e}"),
            _ => {}
        }
    }

    Ok(segments)
}
