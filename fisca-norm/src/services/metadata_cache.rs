//! Time-bounded cache over the variable metadata authority
//!
//! Lookup is two-tier: a still-valid cache entry answers immediately; a
//! cache miss tries the per-variable endpoint first (cheap on the common
//! path), and only falls back to the bulk index when the direct fetch
//! reports "not found". The index itself is refreshed at most once per TTL
//! window and every variable it names is cached wholesale.
//!
//! Negative results are not cached: a variable unknown to the authority is
//! re-fetched on the next call, so newly published variables become visible
//! without waiting for the TTL to lapse.

use crate::services::authority::{AuthorityError, MetadataAuthority, VariableMetadata};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

/// How long cached metadata stays valid (10 minutes)
pub const METADATA_CACHE_TTL: Duration = Duration::from_secs(600);

/// Time source for cache freshness decisions
///
/// Production uses [`SystemClock`]; tests inject a manual clock to exercise
/// TTL expiry without real delays.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheEntry {
    metadata: VariableMetadata,
    stored_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    index: Option<HashMap<String, VariableMetadata>>,
    index_refreshed_at: Option<Instant>,
}

/// Cached access to the metadata authority
///
/// State lives behind a `std::sync::Mutex` with short, non-await critical
/// sections; the engine awaits one fetch at a time, so there is never more
/// than one in-flight fetch per variable.
pub struct MetadataService {
    authority: Arc<dyn MetadataAuthority>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState>,
}

impl MetadataService {
    pub fn new(authority: Arc<dyn MetadataAuthority>) -> Self {
        Self::with_ttl_and_clock(authority, METADATA_CACHE_TTL, Arc::new(SystemClock))
    }

    pub fn with_ttl_and_clock(
        authority: Arc<dyn MetadataAuthority>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            authority,
            ttl,
            clock,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Look up metadata for a variable.
    ///
    /// Returns `Ok(None)` when the authority has no metadata for it; only
    /// transport failures other than "not found" propagate as errors.
    pub async fn variable_metadata(
        &self,
        variable: &str,
    ) -> Result<Option<VariableMetadata>, AuthorityError> {
        if let Some(hit) = self.valid_entry(variable) {
            return Ok(Some(hit));
        }

        match self.authority.fetch_variable(variable).await {
            Ok(metadata) => {
                self.store(variable, metadata.clone());
                return Ok(Some(metadata));
            }
            Err(err) if err.is_not_found() => {
                debug!(variable = %variable, "No direct metadata, falling back to variable index");
            }
            Err(err) => return Err(err),
        }

        if self.index_is_stale() {
            let index = self.authority.fetch_index().await?;
            self.replace_index(index);
        }

        Ok(self.lookup_index(variable))
    }

    /// Drop all cached metadata, the bulk index, and its freshness stamp.
    ///
    /// Used for test isolation; also suitable as an operational cache-flush
    /// control.
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("metadata cache lock poisoned");
        *state = CacheState::default();
    }

    fn valid_entry(&self, variable: &str) -> Option<VariableMetadata> {
        let now = self.clock.now();
        let state = self.state.lock().expect("metadata cache lock poisoned");
        state
            .entries
            .get(variable)
            .filter(|entry| now.duration_since(entry.stored_at) < self.ttl)
            .map(|entry| entry.metadata.clone())
    }

    fn store(&self, variable: &str, metadata: VariableMetadata) {
        let now = self.clock.now();
        let mut state = self.state.lock().expect("metadata cache lock poisoned");
        state.entries.insert(
            variable.to_string(),
            CacheEntry {
                metadata,
                stored_at: now,
            },
        );
    }

    fn index_is_stale(&self) -> bool {
        let now = self.clock.now();
        let state = self.state.lock().expect("metadata cache lock poisoned");
        match (&state.index, state.index_refreshed_at) {
            (Some(_), Some(refreshed_at)) => now.duration_since(refreshed_at) >= self.ttl,
            _ => true,
        }
    }

    fn replace_index(&self, index: HashMap<String, VariableMetadata>) {
        let now = self.clock.now();
        let mut state = self.state.lock().expect("metadata cache lock poisoned");
        for (name, metadata) in &index {
            state.entries.insert(
                name.clone(),
                CacheEntry {
                    metadata: metadata.clone(),
                    stored_at: now,
                },
            );
        }
        debug!(variables = index.len(), "Refreshed variable index");
        state.index = Some(index);
        state.index_refreshed_at = Some(now);
    }

    fn lookup_index(&self, variable: &str) -> Option<VariableMetadata> {
        let now = self.clock.now();
        let mut state = self.state.lock().expect("metadata cache lock poisoned");
        let metadata = state.index.as_ref()?.get(variable)?.clone();
        state.entries.insert(
            variable.to_string(),
            CacheEntry {
                metadata: metadata.clone(),
                stored_at: now,
            },
        );
        Some(metadata)
    }
}
