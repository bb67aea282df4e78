//! In-memory partition catalog.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use common_error::{QuarryError, QuarryResult};
use log::{debug, warn};
use quarry_core::{CatalogPartition, SessionTimeZone, TableHandle, TableIdent};
use quarry_logical::{LogicalExpr, evaluate_predicate};

use crate::catalog::PartitionCatalog;
use crate::pushdown::is_pushdown_supported;

#[derive(Debug)]
struct TableEntry {
    table: TableHandle,
    partitions: Vec<CatalogPartition>,
}

/// Partition catalog held in process memory.
///
/// Filtered listing evaluates predicates against each partition's typed
/// values. Predicates outside the push-down subset fail the call unless
/// `fallback_on_unsupported` is set, in which case a warning is logged and
/// they are evaluated like any other predicate.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    tables: HashMap<TableIdent, TableEntry>,
    fallback_on_unsupported: bool,
    /// Number of listing calls served, for observing planner behaviour.
    calls: AtomicUsize,
}

impl InMemoryCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip unsupported predicates instead of failing filtered listings.
    #[must_use]
    pub fn with_fallback_on_unsupported(mut self, fallback: bool) -> Self {
        self.fallback_on_unsupported = fallback;
        self
    }

    /// Register a table. Re-registering replaces the table and drops its
    /// partitions.
    pub fn register_table(&mut self, table: TableHandle) {
        self.tables.insert(
            table.ident.clone(),
            TableEntry {
                table,
                partitions: Vec::new(),
            },
        );
    }

    /// Add a partition to a registered table.
    pub fn add_partition(
        &mut self,
        ident: &TableIdent,
        partition: CatalogPartition,
    ) -> QuarryResult<()> {
        let entry = self
            .tables
            .get_mut(ident)
            .ok_or_else(|| table_not_found(ident))?;
        let expected = entry.table.partition_columns.len();
        if partition.values.len() != expected {
            return Err(QuarryError::oos(format!(
                "partition of {ident} has {} values, expected {expected}",
                partition.values.len()
            )));
        }
        entry.partitions.push(partition);
        Ok(())
    }

    /// Get a registered table.
    pub fn table(&self, ident: &TableIdent) -> Option<&TableHandle> {
        self.tables.get(ident).map(|entry| &entry.table)
    }

    /// Number of listing calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn entry(&self, table: &TableHandle) -> QuarryResult<&TableEntry> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.tables
            .get(&table.ident)
            .ok_or_else(|| table_not_found(&table.ident))
    }
}

impl PartitionCatalog for InMemoryCatalog {
    fn list_partitions(&self, table: &TableHandle) -> QuarryResult<Vec<CatalogPartition>> {
        Ok(self.entry(table)?.partitions.clone())
    }

    fn list_partitions_by_filter(
        &self,
        table: &TableHandle,
        predicates: &[LogicalExpr],
        time_zone: &SessionTimeZone,
    ) -> QuarryResult<Vec<CatalogPartition>> {
        let entry = self.entry(table)?;

        for predicate in predicates {
            if is_pushdown_supported(predicate, &entry.table) {
                continue;
            }
            if !self.fallback_on_unsupported {
                return Err(QuarryError::catalog(format!(
                    "unsupported partition predicate on {}: {predicate}",
                    table.ident
                )));
            }
            warn!(
                "Predicate {predicate} on {} is not push-down capable; evaluating locally",
                table.ident
            );
        }

        let mut matched = Vec::new();
        for partition in &entry.partitions {
            let row = partition
                .to_row(&entry.table, time_zone)
                .map_err(|e| QuarryError::catalog_with_source("invalid partition metadata", e))?;
            let mut keep = true;
            for predicate in predicates {
                if !evaluate_predicate(predicate, &row, time_zone)? {
                    keep = false;
                    break;
                }
            }
            if keep {
                matched.push(partition.clone());
            }
        }

        debug!(
            "Catalog listed {}/{} partitions of {} by filter",
            matched.len(),
            entry.partitions.len(),
            table.ident
        );
        Ok(matched)
    }
}

fn table_not_found(ident: &TableIdent) -> QuarryError {
    QuarryError::catalog(format!("table {ident} not found"))
}
