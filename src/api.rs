//! Client for the remote score service (`GET`/`POST {base}/api/scores/`).

use std::fmt;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const SCORES_PATH: &str = "/api/scores/";
const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRecord")]
pub struct ScoreRecord {
    pub name: Option<String>,
    pub score: i64,
    pub game: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

/// Wire shape; the name may arrive as `name`, `user_name` or both
#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
    score: i64,
    #[serde(default)]
    game: Option<String>,
    #[serde(default)]
    created: Option<String>,
}

impl From<RawRecord> for ScoreRecord {
    fn from(raw: RawRecord) -> Self {
        Self {
            name: raw.name.or(raw.user_name),
            score: raw.score,
            game: raw.game,
            created: raw.created,
        }
    }
}

/// Body of a submission. The name goes out under both `name` and
/// `user_name` so either backend flavour accepts it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewScore {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_name: Option<String>,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<String>,
}

impl NewScore {
    pub fn new(name: Option<String>, score: u32, game: Option<String>) -> Self {
        Self { user_name: name.clone(), name, score, game }
    }
}

impl From<&NewScore> for ScoreRecord {
    fn from(s: &NewScore) -> Self {
        Self {
            name: s.name.clone(),
            score: i64::from(s.score),
            game: s.game.clone(),
            created: None,
        }
    }
}

/// A list of scores either bare or wrapped as `{"results": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreList {
    Bare(Vec<ScoreRecord>),
    Wrapped { results: Vec<ScoreRecord> },
}

impl From<ScoreList> for Vec<ScoreRecord> {
    fn from(list: ScoreList) -> Self {
        match list {
            ScoreList::Bare(v) | ScoreList::Wrapped { results: v } => v,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiError {
    FetchFailed,
    SubmitFailed,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchFailed => write!(f, "Failed to fetch scores"),
            Self::SubmitFailed => write!(f, "Failed to post score"),
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Clone)]
pub struct ScoreClient {
    base: String,
    agent: ureq::Agent,
}

impl ScoreClient {
    /// `base` is the service root, with or without a trailing slash.
    /// The agent keeps session cookies between calls.
    pub fn new(base: &str) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(TIMEOUT).build();
        Self {
            base: base.trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn url(&self) -> String {
        format!("{}{}", self.base, SCORES_PATH)
    }

    pub fn fetch_scores(&self) -> Result<Vec<ScoreRecord>, ApiError> {
        let response = self.agent.get(&self.url()).call().map_err(|e| {
            log::warn!("GET {} failed: {e}", self.url());
            ApiError::FetchFailed
        })?;
        let list: ScoreList = response.into_json().map_err(|e| {
            log::warn!("Unreadable score list: {e}");
            ApiError::FetchFailed
        })?;
        let scores: Vec<ScoreRecord> = list.into();
        log::debug!("Fetched {} scores", scores.len());
        Ok(scores)
    }

    /// Post a score. A reply that isn't a record (`{"ok": true}`) echoes the submission.
    pub fn submit_score(&self, score: &NewScore) -> Result<ScoreRecord, ApiError> {
        let response = self.agent.post(&self.url()).send_json(score).map_err(|e| {
            log::warn!("POST {} failed: {e}", self.url());
            ApiError::SubmitFailed
        })?;
        let body: serde_json::Value = response.into_json().map_err(|e| {
            log::warn!("Unreadable submit reply: {e}");
            ApiError::SubmitFailed
        })?;
        let record = serde_json::from_value(body).unwrap_or_else(|_| ScoreRecord::from(score));
        log::info!("Submitted score {} for {:?}", record.score, record.game);
        Ok(record)
    }
}

/// Results coming back from background calls
#[derive(Debug)]
pub enum ApiEvent {
    Scores(Result<Vec<ScoreRecord>, ApiError>),
    Submitted(Result<ScoreRecord, ApiError>),
}

/// Fetch on a worker thread; the result arrives on `tx`.
pub fn spawn_fetch(client: &ScoreClient, tx: Sender<ApiEvent>) {
    let client = client.clone();
    thread::spawn(move || {
        let _ = tx.send(ApiEvent::Scores(client.fetch_scores()));
    });
}

pub fn spawn_submit(client: &ScoreClient, score: NewScore, tx: Sender<ApiEvent>) {
    let client = client.clone();
    thread::spawn(move || {
        let _ = tx.send(ApiEvent::Submitted(client.submit_score(&score)));
    });
}
