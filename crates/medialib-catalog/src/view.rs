//! Catalog view
//!
//! Holds the full record set fetched from the repository and derives the visible,
//! filtered, sorted and paginated list from it. Local mutations (`prepend`, `replace`,
//! `remove`) are copy-on-write, so readers always work on a consistent snapshot.
//!
//! Concurrent `load` calls resolve by start order: the most recently started load wins,
//! and a load that finishes after a newer one has been applied is discarded. Local
//! mutations made while a load is in flight are replayed onto its result, so a record
//! prepended by a finished upload survives a reload that fetched before the insert.

use chrono::{DateTime, Utc};
use medialib_core::{AppError, MediaRecord, QueryState};
use medialib_db::CatalogRepository;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::pagination::{Page, Paginator, DEFAULT_PAGE_SIZE};
use crate::query;

/// Local mutation recorded while a load is in flight
#[derive(Debug, Clone)]
enum LocalChange {
    Prepend(MediaRecord),
    Replace(MediaRecord),
    Remove(Uuid),
}

impl LocalChange {
    fn apply(&self, records: &mut Vec<MediaRecord>) {
        match self {
            LocalChange::Prepend(record) => {
                records.retain(|r| r.id != record.id);
                records.insert(0, record.clone());
            }
            LocalChange::Replace(record) => {
                if let Some(existing) = records.iter_mut().find(|r| r.id == record.id) {
                    *existing = record.clone();
                }
            }
            LocalChange::Remove(id) => records.retain(|r| r.id != *id),
        }
    }
}

struct ViewState {
    records: Arc<Vec<MediaRecord>>,
    query: QueryState,
    paginator: Paginator,
    /// Sequence number of the load currently reflected in `records`
    applied_load: u64,
    /// Count of local mutations so far
    generation: u64,
    /// Mutations made while at least one load was in flight, tagged with their generation
    pending_changes: Vec<(u64, LocalChange)>,
    loads_in_flight: usize,
}

impl ViewState {
    fn record_change(&mut self, change: LocalChange) {
        self.generation += 1;
        if self.loads_in_flight > 0 {
            self.pending_changes.push((self.generation, change));
        }
    }
}

/// Keeps the in-flight load count accurate even when a load future is dropped
struct LoadGuard<'a> {
    view: &'a CatalogView,
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.view.write();
        state.loads_in_flight = state.loads_in_flight.saturating_sub(1);
        if state.loads_in_flight == 0 {
            state.pending_changes.clear();
        }
    }
}

pub struct CatalogView {
    repository: Arc<dyn CatalogRepository>,
    state: RwLock<ViewState>,
    load_seq: AtomicU64,
}

impl CatalogView {
    pub fn new(repository: Arc<dyn CatalogRepository>) -> Self {
        Self::with_page_size(repository, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(repository: Arc<dyn CatalogRepository>, page_size: usize) -> Self {
        Self {
            repository,
            state: RwLock::new(ViewState {
                records: Arc::new(Vec::new()),
                query: QueryState::default(),
                paginator: Paginator::new(page_size),
                applied_load: 0,
                generation: 0,
                pending_changes: Vec::new(),
                loads_in_flight: 0,
            }),
            load_seq: AtomicU64::new(0),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ViewState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ViewState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch every record from the repository and replace local state
    ///
    /// Resets pagination. On failure the current state is left untouched. Local mutations
    /// made while the fetch was running are replayed onto the fetched records. Returns the
    /// records fetched by this call, even when a newer load superseded them.
    pub async fn load(&self) -> Result<Arc<Vec<MediaRecord>>, AppError> {
        let seq = self.load_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let start = std::time::Instant::now();

        let started_at_generation = {
            let mut state = self.write();
            state.loads_in_flight += 1;
            state.generation
        };
        let _guard = LoadGuard { view: self };

        let records = match self.repository.list().await {
            Ok(records) => Arc::new(records),
            Err(e) => {
                tracing::error!(error = %e, load_seq = seq, "Catalog load failed");
                return Err(e.into());
            }
        };

        let mut state = self.write();
        if seq > state.applied_load {
            let replayed: Vec<LocalChange> = state
                .pending_changes
                .iter()
                .filter(|(generation, _)| *generation > started_at_generation)
                .map(|(_, change)| change.clone())
                .collect();
            if replayed.is_empty() {
                state.records = Arc::clone(&records);
            } else {
                let mut merged = records.as_ref().clone();
                for change in &replayed {
                    change.apply(&mut merged);
                }
                tracing::debug!(
                    load_seq = seq,
                    replayed = replayed.len(),
                    "Replayed local changes onto catalog load"
                );
                state.records = Arc::new(merged);
            }
            state.applied_load = seq;
            state.paginator.reset();
            tracing::info!(
                load_seq = seq,
                count = records.len(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Catalog loaded"
            );
        } else {
            tracing::debug!(
                load_seq = seq,
                applied_load = state.applied_load,
                "Discarding stale catalog load"
            );
        }

        Ok(records)
    }

    /// Current full record set
    pub fn snapshot(&self) -> Arc<Vec<MediaRecord>> {
        Arc::clone(&self.read().records)
    }

    /// Filter and sort the snapshot without touching view state
    pub fn apply_query(&self, query: &QueryState) -> Vec<MediaRecord> {
        self.apply_query_at(query, Utc::now())
    }

    pub fn apply_query_at(&self, query: &QueryState, now: DateTime<Utc>) -> Vec<MediaRecord> {
        let records = self.snapshot();
        query::apply_query(&records, query, now)
    }

    /// Replace the query state, reset the cursor and return the first page
    pub fn set_query(&self, query: QueryState) -> Page {
        {
            let mut state = self.write();
            state.query = query;
            state.paginator.reset();
        }
        self.load_more()
    }

    pub fn query_state(&self) -> QueryState {
        self.read().query.clone()
    }

    /// Next page of the filtered view for the current query
    pub fn load_more(&self) -> Page {
        let now = Utc::now();
        let mut state = self.write();
        let filtered = query::apply_query(&state.records, &state.query, now);
        state.paginator.next_page(&filtered)
    }

    /// Records handed out by the pages so far, in current query order
    pub fn visible(&self) -> Vec<MediaRecord> {
        let state = self.read();
        let filtered = query::apply_query(&state.records, &state.query, Utc::now());
        filtered
            .into_iter()
            .filter(|r| state.paginator.is_handed_out(r.id))
            .collect()
    }

    pub fn has_more(&self) -> bool {
        self.read().paginator.has_more()
    }

    /// Insert a record at the front, replacing any record with the same ID
    pub fn prepend(&self, record: MediaRecord) {
        let mut state = self.write();
        let change = LocalChange::Prepend(record);
        change.apply(Arc::make_mut(&mut state.records));
        state.record_change(change);
    }

    /// Replace a record in place. Returns false if the ID is not in the view.
    pub fn replace(&self, record: MediaRecord) -> bool {
        let mut state = self.write();
        let index = state.records.iter().position(|r| r.id == record.id);
        if let Some(index) = index {
            Arc::make_mut(&mut state.records)[index] = record.clone();
        }
        // A load in flight may still return the old version
        state.record_change(LocalChange::Replace(record));
        index.is_some()
    }

    pub fn remove(&self, id: Uuid) -> Option<MediaRecord> {
        let mut state = self.write();
        let index = state.records.iter().position(|r| r.id == id);
        let removed = index.map(|index| Arc::make_mut(&mut state.records).remove(index));
        state.record_change(LocalChange::Remove(id));
        removed
    }

    pub fn get(&self, id: Uuid) -> Option<MediaRecord> {
        self.read().records.iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().records.is_empty()
    }

    pub fn page_size(&self) -> usize {
        self.read().paginator.page_size()
    }
}
