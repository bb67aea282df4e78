//! Strategies for turning partition predicates into a partition list.

use common_error::{QuarryError, QuarryResult, ensure};
use log::debug;
use quarry_catalog::PartitionCatalog;
use quarry_core::{CatalogPartition, SessionTimeZone, TableHandle};
use quarry_logical::evaluate_predicate;

use super::PartitionPredicateSet;

/// How surviving partitions are determined.
pub trait PruningStrategy: Send + Sync + std::fmt::Debug {
    /// Strategy name, for logs.
    fn name(&self) -> &'static str;

    /// Partitions of `table` that may satisfy every predicate.
    ///
    /// `predicates` must be non-empty. Catalog failures are returned as-is.
    fn prune(
        &self,
        catalog: &dyn PartitionCatalog,
        table: &TableHandle,
        predicates: &PartitionPredicateSet,
        time_zone: &SessionTimeZone,
    ) -> QuarryResult<Vec<CatalogPartition>>;
}

/// Push the predicates down to the catalog's filtered listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogSidePruning;

impl PruningStrategy for CatalogSidePruning {
    fn name(&self) -> &'static str {
        "CatalogSide"
    }

    fn prune(
        &self,
        catalog: &dyn PartitionCatalog,
        table: &TableHandle,
        predicates: &PartitionPredicateSet,
        time_zone: &SessionTimeZone,
    ) -> QuarryResult<Vec<CatalogPartition>> {
        ensure!(!predicates.is_empty(), InternalError: "no partition predicates for {}", table.ident);
        catalog.list_partitions_by_filter(table, predicates.as_slice(), time_zone)
    }
}

/// List every partition and evaluate the predicates locally.
///
/// Partition values are typed using the table schema; temporal values are
/// read in the session time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientSidePruning;

impl PruningStrategy for ClientSidePruning {
    fn name(&self) -> &'static str {
        "ClientSide"
    }

    fn prune(
        &self,
        catalog: &dyn PartitionCatalog,
        table: &TableHandle,
        predicates: &PartitionPredicateSet,
        time_zone: &SessionTimeZone,
    ) -> QuarryResult<Vec<CatalogPartition>> {
        ensure!(!predicates.is_empty(), InternalError: "no partition predicates for {}", table.ident);
        for predicate in predicates {
            let mut foreign: Vec<_> = predicate
                .column_refs()
                .into_iter()
                .filter(|c| !table.is_partition_column(c))
                .collect();
            if !foreign.is_empty() {
                foreign.sort();
                return Err(QuarryError::planning(format!(
                    "expected only partition predicates on {}, but {predicate} references {}",
                    table.ident,
                    foreign.join(", ")
                )));
            }
        }

        let partitions = catalog.list_partitions(table)?;
        let total = partitions.len();

        let mut survivors = Vec::new();
        for partition in partitions {
            let row = partition.to_row(table, time_zone).map_err(|e| {
                QuarryError::catalog_with_source(
                    format!("invalid partition values {:?} for {}", partition.values, table.ident),
                    e,
                )
            })?;
            let mut keep = true;
            for predicate in predicates {
                if !evaluate_predicate(predicate, &row, time_zone)? {
                    keep = false;
                    break;
                }
            }
            if keep {
                survivors.push(partition);
            }
        }

        debug!(
            "Client-side pruning kept {}/{total} partitions of {}",
            survivors.len(),
            table.ident
        );
        Ok(survivors)
    }
}

#[cfg(test)]
mod tests {
    use quarry_catalog::InMemoryCatalog;
    use quarry_core::{ColumnInfo, DataType, Schema, TableIdent};
    use quarry_logical::{col, lit};

    use super::*;

    fn orders() -> TableHandle {
        TableHandle::new(
            TableIdent::new("sales", "orders"),
            Schema::with_columns(vec![
                ColumnInfo::new("revenue", DataType::Float64),
                ColumnInfo::new("year", DataType::Int64),
                ColumnInfo::new("month", DataType::Int64),
            ]),
        )
        .with_partition_columns(["year", "month"])
    }

    fn catalog(values: &[[&str; 2]]) -> InMemoryCatalog {
        let mut catalog = InMemoryCatalog::new();
        catalog.register_table(orders());
        for v in values {
            catalog
                .add_partition(&orders().ident, CatalogPartition::new(*v))
                .unwrap();
        }
        catalog
    }

    fn predicates() -> PartitionPredicateSet {
        let mut set = PartitionPredicateSet::new();
        set.insert(col("year").eq(lit(2020i64)));
        set.insert(col("month").eq(lit(3i64)));
        set
    }

    #[test]
    fn test_strategies_agree() {
        let catalog = catalog(&[["2019", "3"], ["2020", "3"], ["2020", "4"]]);
        let tz = SessionTimeZone::utc();

        let client = ClientSidePruning
            .prune(&catalog, &orders(), &predicates(), &tz)
            .unwrap();
        let pushed = CatalogSidePruning
            .prune(&catalog, &orders(), &predicates(), &tz)
            .unwrap();

        assert_eq!(client, vec![CatalogPartition::new(["2020", "3"])]);
        assert_eq!(client, pushed);
    }

    #[test]
    fn test_empty_predicates_rejected() {
        let catalog = catalog(&[]);
        let empty = PartitionPredicateSet::new();
        let tz = SessionTimeZone::utc();

        for strategy in [&CatalogSidePruning as &dyn PruningStrategy, &ClientSidePruning] {
            let result = strategy.prune(&catalog, &orders(), &empty, &tz);
            assert!(matches!(result, Err(QuarryError::InternalError(_))));
        }
        assert_eq!(catalog.call_count(), 0);
    }

    #[test]
    fn test_client_side_rejects_data_columns() {
        let catalog = catalog(&[["2020", "3"]]);
        let mut set = PartitionPredicateSet::new();
        set.insert(col("revenue").gt(lit(1i64)));

        let result = ClientSidePruning.prune(&catalog, &orders(), &set, &SessionTimeZone::utc());
        assert!(matches!(result, Err(QuarryError::PlanningError { .. })));
        assert_eq!(catalog.call_count(), 0);
    }

    #[test]
    fn test_client_side_bad_partition_value() {
        let catalog = catalog(&[["twenty", "3"]]);
        let result =
            ClientSidePruning.prune(&catalog, &orders(), &predicates(), &SessionTimeZone::utc());
        let err = result.unwrap_err();
        assert!(err.is_catalog_error());
    }
}
