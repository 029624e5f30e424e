//! Shared test utilities for integration tests

#![allow(dead_code)]

use bqharmony::publish::TableMetadata;
use bqharmony::{Config, TableId, TableSchema, Warehouse, WarehouseError};
use bqharmony::planner::FactsFile;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

/// Load a config fixture from the tests/test_data directory
pub fn load_config(name: &str) -> Config {
    let path = format!("tests/test_data/{}", name);
    Config::from_file(&path).unwrap_or_else(|e| panic!("Failed to load config {}: {}", name, e))
}

/// Load a program facts fixture from the tests/test_data directory
pub fn load_facts(name: &str) -> FactsFile {
    let path = format!("tests/test_data/{}", name);
    bqharmony::load_facts(&path).unwrap_or_else(|e| panic!("Failed to load facts {}: {}", name, e))
}

// =============================================================================
// In-memory warehouse
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct FakeTable {
    pub schema: TableSchema,
    /// Opaque row values; two tables hold the same data iff their row sets match
    pub rows: BTreeSet<String>,
    pub metadata: TableMetadata,
}

#[derive(Debug, Default)]
struct State {
    datasets: BTreeSet<String>,
    tables: BTreeMap<TableId, FakeTable>,
    copies: Vec<(TableId, TableId)>,
    queries: Vec<String>,
}

/// A warehouse kept in memory.
///
/// `run_query` understands only the comparison query: it takes the first two
/// table ids quoted in the SQL and counts the rows found on one side only.
#[derive(Debug, Default)]
pub struct FakeWarehouse {
    state: Mutex<State>,
}

impl FakeWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// A warehouse with every dataset named in the config
    pub fn for_config(config: &Config) -> Self {
        let warehouse = Self::new();
        for dataset in [
            &config.source_dataset,
            &config.dev_dataset,
            &config.current_dataset,
            &config.versioned_dataset,
        ] {
            warehouse.add_dataset(&config.project, dataset);
        }
        warehouse
    }

    pub fn add_dataset(&self, project: &str, dataset: &str) {
        self.state.lock().unwrap().datasets.insert(format!("{project}.{dataset}"));
    }

    pub fn put_table(&self, id: &TableId, rows: &[&str]) {
        self.put_table_with_schema(id, rows, TableSchema::default());
    }

    pub fn put_table_with_schema(&self, id: &TableId, rows: &[&str], schema: TableSchema) {
        let table = FakeTable {
            schema,
            rows: rows.iter().map(|r| r.to_string()).collect(),
            metadata: TableMetadata::default(),
        };
        self.state.lock().unwrap().tables.insert(id.clone(), table);
    }

    pub fn table(&self, id: &TableId) -> Option<FakeTable> {
        self.state.lock().unwrap().tables.get(id).cloned()
    }

    pub fn copies(&self) -> Vec<(TableId, TableId)> {
        self.state.lock().unwrap().copies.clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.state.lock().unwrap().queries.clone()
    }
}

/// Backtick-quoted identifiers that parse as table ids, in order
fn quoted_table_ids(sql: &str) -> Vec<TableId> {
    let mut ids: Vec<TableId> = Vec::new();
    for quoted in sql.split('`').skip(1).step_by(2) {
        if let Ok(id) = quoted.parse::<TableId>() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

#[async_trait::async_trait]
impl Warehouse for FakeWarehouse {
    async fn table_exists(&self, table: &TableId) -> Result<bool, WarehouseError> {
        Ok(self.state.lock().unwrap().tables.contains_key(table))
    }

    async fn dataset_exists(&self, project: &str, dataset: &str) -> Result<bool, WarehouseError> {
        Ok(self.state.lock().unwrap().datasets.contains(&format!("{project}.{dataset}")))
    }

    async fn list_tables(&self, project: &str, dataset: &str) -> Result<Vec<String>, WarehouseError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tables
            .keys()
            .filter(|id| id.project == project && id.dataset == dataset)
            .map(|id| id.table.clone())
            .collect())
    }

    async fn table_schema(&self, table: &TableId) -> Result<TableSchema, WarehouseError> {
        let state = self.state.lock().unwrap();
        state
            .tables
            .get(table)
            .map(|t| t.schema.clone())
            .ok_or_else(|| WarehouseError::NotFound(table.to_string()))
    }

    async fn run_query(&self, sql: &str) -> Result<u64, WarehouseError> {
        let mut state = self.state.lock().unwrap();
        state.queries.push(sql.to_string());
        let ids = quoted_table_ids(sql);
        let [left, right] = ids.as_slice() else {
            return Err(WarehouseError::Job(format!("unsupported query: {sql}")));
        };
        let rows = |id: &TableId| {
            state
                .tables
                .get(id)
                .map(|t| t.rows.clone())
                .ok_or_else(|| WarehouseError::NotFound(id.to_string()))
        };
        let (left, right) = (rows(left)?, rows(right)?);
        let differing = left.symmetric_difference(&right).count() as u64;
        Ok(differing.min(1))
    }

    async fn copy_table(&self, source: &TableId, destination: &TableId) -> Result<(), WarehouseError> {
        let mut state = self.state.lock().unwrap();
        if !state.datasets.contains(&destination.dataset_id()) {
            return Err(WarehouseError::NotFound(destination.dataset_id()));
        }
        let mut copy = state
            .tables
            .get(source)
            .cloned()
            .ok_or_else(|| WarehouseError::NotFound(source.to_string()))?;
        copy.metadata = TableMetadata::default();
        state.tables.insert(destination.clone(), copy);
        state.copies.push((source.clone(), destination.clone()));
        Ok(())
    }

    async fn update_table_metadata(
        &self,
        table: &TableId,
        metadata: &TableMetadata,
    ) -> Result<(), WarehouseError> {
        let mut state = self.state.lock().unwrap();
        let existing = state
            .tables
            .get_mut(table)
            .ok_or_else(|| WarehouseError::NotFound(table.to_string()))?;
        if let Some(name) = &metadata.friendly_name {
            existing.metadata.friendly_name = Some(name.clone());
        }
        if let Some(description) = &metadata.description {
            existing.metadata.description = Some(description.clone());
        }
        existing.metadata.labels.extend(metadata.labels.clone());
        Ok(())
    }
}
