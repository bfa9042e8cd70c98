// src/pipeline/mod.rs

pub mod state;

pub use state::Phase;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::config::Settings;
use crate::fetch::{FetchError, Fetcher};
use crate::normalize::{AlignmentError, Normalizer, TransformError};
use crate::parse::{parse_tables, RawTable, TABLE_KEYWORD};
use crate::record::ChampionRecord;
use crate::store::{ChampionStore, PersistenceError};

pub const SUCCESS_MESSAGE: &str = "pipeline executed successfully";
pub const NO_DATA_MESSAGE: &str = "no championship tables found on the source page";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("no tables containing {keyword:?} on the source page")]
    NoData { keyword: String },
    #[error(transparent)]
    Alignment(AlignmentError),
    #[error(transparent)]
    Transform(TransformError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("pipeline run exceeded its {limit:?} deadline while {phase}")]
    Deadline { limit: Duration, phase: Phase },
    #[error("load task aborted: {0}")]
    Task(String),
}

impl From<TransformError> for PipelineError {
    fn from(e: TransformError) -> Self {
        match e {
            TransformError::Alignment(a) => PipelineError::Alignment(a),
            other => PipelineError::Transform(other),
        }
    }
}

impl PipelineError {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Fetch(_) => "fetch",
            PipelineError::NoData { .. } => "no_data",
            PipelineError::Alignment(_) => "alignment",
            PipelineError::Transform(_) => "transform",
            PipelineError::Persistence(_) => "persistence",
            PipelineError::Deadline { .. } => "deadline",
            PipelineError::Task(_) => "task",
        }
    }
}

/// What the caller of a run sees: a message and an HTTP-style status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub message: String,
    pub status: u16,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    pub fn into_pair(self) -> (String, u16) {
        (self.message, self.status)
    }
}

impl From<&PipelineError> for RunOutcome {
    fn from(e: &PipelineError) -> Self {
        let message = match e {
            PipelineError::NoData { .. } => NO_DATA_MESSAGE.to_string(),
            other => format!("pipeline failed: {}", other),
        };
        RunOutcome {
            message,
            status: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub tables: usize,
    pub records: usize,
    pub stored: usize,
}

/// Fetch → parse → normalize → replace collection, once per call.
pub struct Pipeline<S> {
    fetcher: Fetcher,
    keyword: String,
    normalizer: Normalizer,
    store: Arc<Mutex<S>>,
    deadline: Duration,
}

impl<S> Pipeline<S>
where
    S: ChampionStore + 'static,
{
    pub fn new(fetcher: Fetcher, normalizer: Normalizer, store: S, deadline: Duration) -> Self {
        Self {
            fetcher,
            keyword: TABLE_KEYWORD.to_string(),
            normalizer,
            store: Arc::new(Mutex::new(store)),
            deadline,
        }
    }

    pub fn from_settings(settings: &Settings, store: S) -> Result<Self, FetchError> {
        let fetcher = Fetcher::new(&settings.source_url, settings.fetch_timeout())?;
        Ok(Self::new(
            fetcher,
            Normalizer::new(settings.alignment),
            store,
            settings.run_deadline(),
        ))
    }

    pub fn store(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.store)
    }

    /// Invocation entry point. The trigger payload carries nothing we use.
    pub async fn handle_trigger<T>(&self, _trigger: T) -> (String, u16) {
        self.run().await.into_pair()
    }

    /// Run once and collapse the result into a [`RunOutcome`].
    pub async fn run(&self) -> RunOutcome {
        match self.execute().await {
            Ok(report) => {
                info!(
                    tables = report.tables,
                    records = report.records,
                    stored = report.stored,
                    "pipeline finished"
                );
                RunOutcome {
                    message: SUCCESS_MESSAGE.to_string(),
                    status: 200,
                }
            }
            Err(e @ PipelineError::NoData { .. }) => {
                warn!(kind = e.kind(), "{}", e);
                RunOutcome::from(&e)
            }
            Err(e) => {
                error!(kind = e.kind(), error = %e, "pipeline failed");
                RunOutcome::from(&e)
            }
        }
    }

    /// Run once under the configured deadline.
    #[instrument(level = "info", skip(self), fields(url = %self.fetcher.url()))]
    pub async fn execute(&self) -> Result<LoadReport, PipelineError> {
        let start = Instant::now();
        let mut phase = Phase::Idle;
        let timed = tokio::time::timeout(self.deadline, self.phases(&mut phase)).await;
        let result = match timed {
            Ok(result) => result,
            Err(_) => Err(PipelineError::Deadline {
                limit: self.deadline,
                phase,
            }),
        };
        if result.is_err() && !phase.is_terminal() {
            warn!(%phase, "run stopped before finishing");
            advance(&mut phase, Phase::Failed);
        }
        info!(elapsed = ?start.elapsed(), %phase, "run complete");
        result
    }

    async fn phases(&self, phase: &mut Phase) -> Result<LoadReport, PipelineError> {
        advance(phase, Phase::Extracting);
        let tables = self.extract().await?;
        if tables.is_empty() {
            advance(phase, Phase::NoData);
            return Err(PipelineError::NoData {
                keyword: self.keyword.clone(),
            });
        }
        advance(phase, Phase::Extracted);
        let table_count = tables.len();

        advance(phase, Phase::Transforming);
        let records = self.normalizer.normalize(tables)?;
        advance(phase, Phase::Transformed);
        let record_count = records.len();

        advance(phase, Phase::Loading);
        let stored = self.load(records).await?;
        advance(phase, Phase::Loaded);

        Ok(LoadReport {
            tables: table_count,
            records: record_count,
            stored,
        })
    }

    async fn extract(&self) -> Result<Vec<RawTable>, PipelineError> {
        let html = self.fetcher.fetch_page().await?;
        let tables = parse_tables(&html, &self.keyword);
        info!(tables = tables.len(), keyword = %self.keyword, "extracted tables");
        Ok(tables)
    }

    async fn load(&self, records: Vec<ChampionRecord>) -> Result<usize, PipelineError> {
        let store = Arc::clone(&self.store);
        let stored = tokio::task::spawn_blocking(move || {
            let mut guard = store.lock().map_err(|_| PersistenceError::Poisoned)?;
            guard.replace_collection(&records)
        })
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))??;
        Ok(stored)
    }
}

fn advance(phase: &mut Phase, next: Phase) {
    debug_assert!(phase.can_advance_to(next), "{} -> {}", phase, next);
    debug!(from = %phase, to = %next, "phase");
    *phase = next;
}
