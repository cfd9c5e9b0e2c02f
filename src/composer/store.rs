//! Per-instance keyed store of diagram records, with debounced persistence.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::config::ComposerConfig;
use crate::error::Result;
use crate::syntax::types::DiagramDocument;

use super::scheduler::Debouncer;
use super::state::EditorMode;

/// One open diagram: its text, editor mode and last cached document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceRecord {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub mode: EditorMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_document: Option<Arc<DiagramDocument>>,
}

impl InstanceRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            mode: EditorMode::default(),
            cached_document: None,
        }
    }

    pub fn apply(&mut self, changes: InstanceChanges) {
        if let Some(text) = changes.text {
            self.text = text;
        }
        if let Some(mode) = changes.mode {
            self.mode = mode;
        }
        if let Some(cache) = changes.cached_document {
            self.cached_document = Some(cache);
        }
    }
}

/// Partial update for an [`InstanceRecord`]; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceChanges {
    pub text: Option<String>,
    pub mode: Option<EditorMode>,
    pub cached_document: Option<Arc<DiagramDocument>>,
}

impl InstanceChanges {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn mode(mut self, mode: EditorMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn cached_document(mut self, doc: Arc<DiagramDocument>) -> Self {
        self.cached_document = Some(doc);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.mode.is_none() && self.cached_document.is_none()
    }
}

/// Mutation entry point the composer writes every commit through.
pub trait InstanceHost {
    fn update_instance(&mut self, id: &str, changes: InstanceChanges);
}

/// Serializable image of the whole store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub instances: Vec<InstanceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
}

impl StoreSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Records keyed by instance id. Instances share no mutable state.
#[derive(Debug, Clone)]
pub struct InstanceStore {
    records: BTreeMap<String, InstanceRecord>,
    active: Option<String>,
    persist: Debouncer,
}

impl Default for InstanceStore {
    fn default() -> Self {
        Self::new(ComposerConfig::default().persist_delay)
    }
}

impl InstanceStore {
    pub fn new(persist_delay: Duration) -> Self {
        Self {
            records: BTreeMap::new(),
            active: None,
            persist: Debouncer::new(persist_delay),
        }
    }

    pub fn restore(snapshot: StoreSnapshot, persist_delay: Duration) -> Self {
        let mut store = Self::new(persist_delay);
        for record in snapshot.instances {
            store.records.insert(record.id.clone(), record);
        }
        store.active = snapshot.active.filter(|id| store.records.contains_key(id));
        debug!(instances = store.records.len(); "Restored instance store");
        store
    }

    /// Add or replace a record. The first record inserted becomes active.
    pub fn insert(&mut self, record: InstanceRecord) {
        if self.active.is_none() {
            self.active = Some(record.id.clone());
        }
        self.records.insert(record.id.clone(), record);
        self.touch();
    }

    /// Remove a record; the active id moves to the first remaining record.
    pub fn remove(&mut self, id: &str) -> Option<InstanceRecord> {
        let removed = self.records.remove(id)?;
        if self.active.as_deref() == Some(id) {
            self.active = self.records.keys().next().cloned();
        }
        self.touch();
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<&InstanceRecord> {
        self.records.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn active(&self) -> Option<&InstanceRecord> {
        self.active.as_deref().and_then(|id| self.records.get(id))
    }

    /// Make `id` active. Unknown ids are ignored.
    pub fn set_active(&mut self, id: &str) -> bool {
        if !self.records.contains_key(id) {
            return false;
        }
        self.active = Some(id.to_string());
        self.touch();
        true
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            instances: self.records.values().cloned().collect(),
            active: self.active.clone(),
        }
    }

    pub fn persist_pending(&self) -> bool {
        self.persist.is_pending()
    }

    /// Snapshot to persist once the store has been idle for the persist delay.
    pub fn poll(&mut self, now: Instant) -> Option<StoreSnapshot> {
        self.persist.poll(now).then(|| self.snapshot())
    }

    /// Persist now, dropping any pending timer.
    pub fn flush(&mut self) -> StoreSnapshot {
        self.persist.cancel();
        self.snapshot()
    }

    fn touch(&mut self) {
        self.persist.schedule(Instant::now());
    }
}

impl InstanceHost for InstanceStore {
    fn update_instance(&mut self, id: &str, changes: InstanceChanges) {
        let Some(record) = self.records.get_mut(id) else {
            trace!(id; "Update for unknown instance ignored");
            return;
        };
        if changes.is_empty() {
            return;
        }
        record.apply(changes);
        self.touch();
    }
}

#[cfg(test)]
#[path = "../../tests/rust/test_composer_store.rs"]
mod tests;
