//! Configuration storage
//!
//! Records are kept per `(project, kind)` table. Each table keeps its records in
//! insertion order so wildcard queries list entries the way they were first written.

use super::types::{ApplyOutcome, ConfigMutation, ConfigRecord};
use crate::utils::error::Result;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Local view of the replicated configuration
pub trait ConfigStore: Send + Sync {
    /// Apply a client write, bumping the key's version unless the value is unchanged
    fn apply_local(&self, mutation: &ConfigMutation, origin: &str) -> Result<ApplyOutcome>;

    /// Apply a record produced by another node; returns whether it replaced local state
    fn apply_replicated(&self, record: ConfigRecord) -> Result<bool>;

    fn get(&self, project: &str, kind: &str, id: &str) -> Option<ConfigRecord>;

    /// Every record of a kind in a project, in insertion order
    fn list(&self, project: &str, kind: &str) -> Vec<ConfigRecord>;

    /// Every record in the store
    fn snapshot(&self) -> Vec<ConfigRecord>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
struct KindTable {
    records: HashMap<String, ConfigRecord>,
    order: Vec<String>,
}

impl KindTable {
    fn put(&mut self, record: ConfigRecord) {
        if !self.records.contains_key(&record.id) {
            self.order.push(record.id.clone());
        }
        self.records.insert(record.id.clone(), record);
    }

    fn ordered(&self) -> impl Iterator<Item = &ConfigRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    tables: DashMap<(String, String), Arc<RwLock<KindTable>>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, project: &str, kind: &str) -> Arc<RwLock<KindTable>> {
        self.tables
            .entry((project.to_string(), kind.to_string()))
            .or_default()
            .clone()
    }

    fn existing_table(&self, project: &str, kind: &str) -> Option<Arc<RwLock<KindTable>>> {
        self.tables
            .get(&(project.to_string(), kind.to_string()))
            .map(|table| table.clone())
    }
}

impl ConfigStore for MemoryConfigStore {
    fn apply_local(&self, mutation: &ConfigMutation, origin: &str) -> Result<ApplyOutcome> {
        let table = self.table(&mutation.project, &mutation.kind);
        let mut table = table.write();

        let previous = table.records.get(&mutation.id);
        if let Some(current) = previous {
            if current.value == mutation.value {
                return Ok(ApplyOutcome::Unchanged(current.clone()));
            }
        }

        let record = ConfigRecord {
            project: mutation.project.clone(),
            kind: mutation.kind.clone(),
            id: mutation.id.clone(),
            value: mutation.value.clone(),
            version: previous.map_or(1, |current| current.version + 1),
            origin: origin.to_string(),
            updated_at: Utc::now(),
        };
        let created = previous.is_none();
        table.put(record.clone());

        Ok(if created {
            ApplyOutcome::Created(record)
        } else {
            ApplyOutcome::Updated(record)
        })
    }

    fn apply_replicated(&self, record: ConfigRecord) -> Result<bool> {
        let table = self.table(&record.project, &record.kind);
        let mut table = table.write();

        let newer = table
            .records
            .get(&record.id)
            .is_none_or(|current| record.supersedes(current));
        if newer {
            table.put(record);
        }
        Ok(newer)
    }

    fn get(&self, project: &str, kind: &str, id: &str) -> Option<ConfigRecord> {
        self.existing_table(project, kind)?
            .read()
            .records
            .get(id)
            .cloned()
    }

    fn list(&self, project: &str, kind: &str) -> Vec<ConfigRecord> {
        self.existing_table(project, kind)
            .map(|table| table.read().ordered().cloned().collect())
            .unwrap_or_default()
    }

    fn snapshot(&self) -> Vec<ConfigRecord> {
        let mut tables: Vec<_> = self
            .tables
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        tables.sort_by(|a, b| a.0.cmp(&b.0));

        tables
            .into_iter()
            .flat_map(|(_, table)| table.read().ordered().cloned().collect::<Vec<_>>())
            .collect()
    }

    fn len(&self) -> usize {
        self.tables
            .iter()
            .map(|entry| entry.value().read().records.len())
            .sum()
    }
}
