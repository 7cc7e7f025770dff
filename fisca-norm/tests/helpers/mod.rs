//! Shared test doubles for the engine integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use fisca_norm::services::{AuthorityError, Clock, MetadataAuthority, VariableMetadata};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Build metadata declaring an owning entity type
pub fn meta(entity: &str) -> VariableMetadata {
    VariableMetadata {
        entity: Some(entity.to_string()),
        description: None,
    }
}

/// In-memory metadata authority with call counters
#[derive(Default)]
pub struct FakeAuthority {
    variables: HashMap<String, VariableMetadata>,
    index: HashMap<String, VariableMetadata>,
    failing: HashSet<String>,
    direct_calls: AtomicUsize,
    index_calls: AtomicUsize,
}

impl FakeAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variable served by the per-variable endpoint (and the index)
    pub fn with_variable(mut self, name: &str, entity: &str) -> Self {
        self.variables.insert(name.to_string(), meta(entity));
        self.index.insert(name.to_string(), meta(entity));
        self
    }

    /// Variable only present in the bulk index (per-variable endpoint 404s)
    pub fn with_index_only_variable(mut self, name: &str, entity: &str) -> Self {
        self.index.insert(name.to_string(), meta(entity));
        self
    }

    /// Variable whose per-variable fetch fails with a transport error
    pub fn with_failing_variable(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn direct_calls(&self) -> usize {
        self.direct_calls.load(Ordering::SeqCst)
    }

    pub fn index_calls(&self) -> usize {
        self.index_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataAuthority for FakeAuthority {
    async fn fetch_variable(&self, variable: &str) -> Result<VariableMetadata, AuthorityError> {
        self.direct_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(variable) {
            return Err(AuthorityError::Network("connection refused".to_string()));
        }
        self.variables
            .get(variable)
            .cloned()
            .ok_or_else(|| AuthorityError::NotFound(variable.to_string()))
    }

    async fn fetch_index(&self) -> Result<HashMap<String, VariableMetadata>, AuthorityError> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.index.clone())
    }
}

/// Test clock advanced by hand
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap();
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock().unwrap()
    }
}
