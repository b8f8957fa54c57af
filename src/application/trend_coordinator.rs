// Trend fetch coordinator - concurrent per-parameter fetches with staleness guard
use crate::application::analytics_repository::AnalyticsRepository;
use crate::domain::trend::{SeriesError, TrendResultSet, TrendSeries};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Published coordinator state.
///
/// `latest_sequence` is the tag of the most recently initiated refresh;
/// `results` always belongs to `committed_sequence`, which only ever moves to
/// the latest tag.
#[derive(Debug, Clone, Default)]
pub struct TrendState {
    pub latest_sequence: u64,
    pub committed_sequence: Option<u64>,
    pub loading: bool,
    pub days: Option<u32>,
    pub results: TrendResultSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Committed { sequence: u64 },
    /// A later refresh started before this one settled; results were dropped
    Superseded { sequence: u64, latest: u64 },
}

pub struct TrendFetchCoordinator {
    repository: Arc<dyn AnalyticsRepository>,
    state: watch::Sender<TrendState>,
}

impl TrendFetchCoordinator {
    pub fn new(repository: Arc<dyn AnalyticsRepository>) -> Self {
        Self {
            repository,
            state: watch::Sender::new(TrendState::default()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TrendState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> TrendState {
        self.state.borrow().clone()
    }

    /// Fetch every parameter concurrently and commit if still the latest
    /// request. Individual failures become error series; nothing here fails.
    ///
    /// The sequence tag is taken when this is called, not when the returned
    /// future is first polled. Dropping the future before it settles clears
    /// `loading` if its tag is still the latest; earlier refreshes still in
    /// flight stay superseded by it.
    pub fn refresh(
        &self,
        parameter_ids: Vec<String>,
        days: u32,
    ) -> impl Future<Output = RefreshOutcome> + Send + '_ {
        let guard = AbandonGuard {
            state: &self.state,
            sequence: self.begin(),
            armed: true,
        };
        async move {
            let outcome = self.run(guard.sequence, parameter_ids, days).await;
            guard.disarm();
            outcome
        }
    }

    async fn run(&self, sequence: u64, parameter_ids: Vec<String>, days: u32) -> RefreshOutcome {
        let start_time = Instant::now();

        tracing::debug!(
            "Trend refresh #{} for {:?} over {} days",
            sequence,
            parameter_ids,
            days
        );

        let fetches = parameter_ids.iter().map(|id| {
            let repo = self.repository.clone();
            async move {
                let series = match repo.fetch_trend(id, days).await {
                    Ok(series) => series,
                    Err(e) => {
                        let error = SeriesError::from(e);
                        match &error {
                            SeriesError::NoData(msg) => {
                                tracing::debug!("No trend data for {}: {}", id, msg)
                            }
                            SeriesError::FetchFailed(msg) => {
                                tracing::warn!("Error fetching trend {}: {}", id, msg)
                            }
                        }
                        TrendSeries::failed(error)
                    }
                };
                (id.clone(), Arc::new(series))
            }
        });

        let entries = join_all(fetches).await;
        let outcome = self.commit(sequence, days, TrendResultSet::new(entries));

        match outcome {
            RefreshOutcome::Committed { .. } => tracing::info!(
                "Committed trend refresh #{} ({} series) in {} ms",
                sequence,
                parameter_ids.len(),
                start_time.elapsed().as_millis()
            ),
            RefreshOutcome::Superseded { latest, .. } => tracing::debug!(
                "Dropping stale trend refresh #{} (latest is #{})",
                sequence,
                latest
            ),
        }

        outcome
    }

    // Tag allocation and the loading flag change together under the watch lock
    fn begin(&self) -> u64 {
        let mut sequence = 0;
        self.state.send_modify(|state| {
            state.latest_sequence += 1;
            state.loading = true;
            sequence = state.latest_sequence;
        });
        sequence
    }

    fn commit(&self, sequence: u64, days: u32, results: TrendResultSet) -> RefreshOutcome {
        let mut latest = sequence;
        let committed = self.state.send_if_modified(|state| {
            latest = state.latest_sequence;
            if state.latest_sequence != sequence {
                return false;
            }
            state.committed_sequence = Some(sequence);
            state.loading = false;
            state.days = Some(days);
            state.results = results;
            true
        });

        if committed {
            RefreshOutcome::Committed { sequence }
        } else {
            RefreshOutcome::Superseded { sequence, latest }
        }
    }
}

/// Clears the loading flag for a refresh dropped before it settled
struct AbandonGuard<'a> {
    state: &'a watch::Sender<TrendState>,
    sequence: u64,
    armed: bool,
}

impl AbandonGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let sequence = self.sequence;
        let cleared = self.state.send_if_modified(|state| {
            if state.latest_sequence != sequence || !state.loading {
                return false;
            }
            state.loading = false;
            true
        });
        if cleared {
            tracing::debug!("Trend refresh #{} abandoned before settling", sequence);
        }
    }
}
