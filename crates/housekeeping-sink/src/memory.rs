//! In-memory implementation of `VerdictSink`.
//!
//! `InMemorySink` keeps every emitted record in a `Vec` behind an
//! `Arc<Mutex<_>>`. Clones share the same storage, so a caller can hand one
//! clone to the scanner and keep another to inspect what was emitted.

use std::sync::{Arc, Mutex};

use housekeeping_contracts::{
    error::{HousekeepingError, HousekeepingResult},
    verdict::VerdictRecord,
};
use housekeeping_core::traits::VerdictSink;

#[derive(Debug, Clone, Default)]
pub struct InMemorySink {
    records: Arc<Mutex<Vec<VerdictRecord>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of every record emitted so far, in emission order.
    pub fn records(&self) -> Vec<VerdictRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove and return every record emitted so far.
    pub fn drain(&self) -> Vec<VerdictRecord> {
        match self.records.lock() {
            Ok(mut records) => std::mem::take(&mut *records),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl VerdictSink for InMemorySink {
    fn emit(&self, record: &VerdictRecord) -> HousekeepingResult<()> {
        let mut records = self.records.lock().map_err(|e| HousekeepingError::SinkWriteFailed {
            reason: format!("in-memory sink lock poisoned: {}", e),
        })?;
        records.push(record.clone());
        Ok(())
    }
}
