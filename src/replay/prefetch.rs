use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::join_all;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::buffers::SessionBuffers;
use crate::source::{DataSource, RangeQuery, fetch_or_empty};
use crate::telemetry::{DriverNumber, StreamBatch, StreamGroup, StreamKind};

/// One range request for a stream group, tagged with the generation of the
/// buffers it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    pub group: StreamGroup,
    pub generation: u64,
    pub start_ms: u64,
    pub end_ms: u64,
    /// Start for history-keeping streams when they must be backfilled.
    pub history_from_ms: Option<u64>,
    pub driver_number: Option<DriverNumber>,
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub plan: FetchPlan,
    pub batches: Vec<StreamBatch>,
}

#[derive(Debug, Default)]
struct GroupState {
    generation: u64,
    in_flight: Option<JoinHandle<FetchOutcome>>,
}

impl GroupState {
    fn invalidate(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    fn take_finished(&mut self) -> Option<FetchOutcome> {
        if !self.in_flight.as_ref().is_some_and(JoinHandle::is_finished) {
            return None;
        }
        match self.in_flight.take()?.now_or_never() {
            Some(Ok(outcome)) => Some(outcome),
            Some(Err(err)) => {
                tracing::warn!("Fetch task failed: {}", err);
                None
            }
            None => None,
        }
    }
}

/// Issues range fetches as independent tasks and is the only writer to the
/// session buffers.
///
/// Each group allows one outstanding fetch. Invalidating a group aborts its
/// fetch and bumps the generation, so a result that still slips through is
/// recognised as stale and dropped at merge time.
pub struct Prefetcher {
    source: Arc<dyn DataSource>,
    session_key: u32,
    runtime: Option<Handle>,
    shared: GroupState,
    focus: GroupState,
}

impl Prefetcher {
    /// Captures the current Tokio runtime for spawning fetches. Outside a
    /// runtime fetches are skipped and the replay runs on whatever is
    /// buffered.
    #[must_use]
    pub fn new(source: Arc<dyn DataSource>, session_key: u32) -> Self {
        Self {
            source,
            session_key,
            runtime: Handle::try_current().ok(),
            shared: GroupState::default(),
            focus: GroupState::default(),
        }
    }

    const fn state(&self, group: StreamGroup) -> &GroupState {
        match group {
            StreamGroup::Shared => &self.shared,
            StreamGroup::Focus => &self.focus,
        }
    }

    const fn state_mut(&mut self, group: StreamGroup) -> &mut GroupState {
        match group {
            StreamGroup::Shared => &mut self.shared,
            StreamGroup::Focus => &mut self.focus,
        }
    }

    #[must_use]
    pub const fn generation(&self, group: StreamGroup) -> u64 {
        self.state(group).generation
    }

    #[must_use]
    pub const fn is_idle(&self, group: StreamGroup) -> bool {
        self.state(group).in_flight.is_none()
    }

    #[must_use]
    pub const fn has_in_flight(&self) -> bool {
        self.shared.in_flight.is_some() || self.focus.in_flight.is_some()
    }

    pub fn invalidate(&mut self, group: StreamGroup) {
        self.state_mut(group).invalidate();
        tracing::debug!(
            "Invalidated {:?} buffers (generation {}).",
            group,
            self.generation(group)
        );
    }

    /// Spawns `plan` unless its group already has a fetch outstanding.
    pub fn issue(&mut self, plan: FetchPlan) -> bool {
        if !self.is_idle(plan.group) {
            return false;
        }
        let Some(runtime) = self.runtime.clone() else {
            tracing::debug!("No async runtime available; skipping {:?} fetch.", plan.group);
            return false;
        };
        tracing::debug!(
            "Fetching {:?} [{}, {}) generation {}.",
            plan.group,
            plan.start_ms,
            plan.end_ms,
            plan.generation
        );
        let group = plan.group;
        let source = Arc::clone(&self.source);
        let handle = runtime.spawn(run_fetch(source, self.session_key, plan));
        self.state_mut(group).in_flight = Some(handle);
        true
    }

    /// Completed fetches, without waiting.
    pub fn collect_finished(&mut self) -> Vec<FetchOutcome> {
        [self.shared.take_finished(), self.focus.take_finished()]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Waits for the next outstanding fetch, shared group first.
    pub async fn next_finished(&mut self) -> Option<FetchOutcome> {
        let state = if self.shared.in_flight.is_some() {
            &mut self.shared
        } else {
            &mut self.focus
        };
        let handle = state.in_flight.as_mut()?;
        let result = handle.await;
        state.in_flight = None;
        match result {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                tracing::warn!("Fetch task failed: {}", err);
                None
            }
        }
    }

    /// Merges a completed fetch into `buffers`.
    ///
    /// Results from an older generation, or that no longer line up with the
    /// group's watermark, are dropped.
    pub fn apply(&self, buffers: &mut SessionBuffers, outcome: FetchOutcome) -> bool {
        let FetchOutcome { plan, batches } = outcome;
        let current = self.generation(plan.group);
        if plan.generation != current {
            tracing::debug!(
                "Discarding stale {:?} fetch (generation {} != {}).",
                plan.group,
                plan.generation,
                current
            );
            return false;
        }
        let until_ms = buffers.window(plan.group).until_ms;
        if until_ms != plan.start_ms {
            tracing::debug!(
                "Discarding {:?} fetch starting at {} (buffered until {}).",
                plan.group,
                plan.start_ms,
                until_ms
            );
            return false;
        }
        for batch in batches {
            let history_from_ms = if batch.kind().keeps_history() {
                plan.history_from_ms
            } else {
                None
            };
            buffers.merge(batch, plan.end_ms, history_from_ms);
        }
        if plan.group == StreamGroup::Shared && plan.history_from_ms.is_some() {
            buffers.mark_history_loaded();
        }
        true
    }
}

impl Drop for Prefetcher {
    fn drop(&mut self) {
        for state in [&mut self.shared, &mut self.focus] {
            if let Some(handle) = state.in_flight.take() {
                handle.abort();
            }
        }
    }
}

async fn run_fetch(source: Arc<dyn DataSource>, session_key: u32, plan: FetchPlan) -> FetchOutcome {
    let kinds: &[StreamKind] = match plan.group {
        StreamGroup::Shared => &StreamKind::SHARED,
        StreamGroup::Focus => &[StreamKind::CarData],
    };
    let queries: Vec<RangeQuery> = kinds
        .iter()
        .map(|kind| RangeQuery {
            session_key,
            kind: *kind,
            start_ms: match plan.history_from_ms {
                Some(from_ms) if kind.keeps_history() => from_ms,
                Some(_) | None => plan.start_ms,
            },
            end_ms: plan.end_ms,
            driver_number: plan.driver_number,
        })
        .collect();
    let batches = join_all(
        queries
            .iter()
            .map(|query| fetch_or_empty(source.as_ref(), query)),
    )
    .await;
    FetchOutcome { plan, batches }
}
