//! The partition catalog trait.

use common_error::QuarryResult;
use quarry_core::{CatalogPartition, SessionTimeZone, TableHandle};
use quarry_logical::LogicalExpr;

/// Source of partition metadata for partitioned tables.
///
/// Calls may block on metadata I/O. Implementations own their timeout, retry
/// and caching policy; failures are reported as `QuarryError::CatalogError`.
pub trait PartitionCatalog: Send + Sync {
    /// List every partition of `table`.
    fn list_partitions(&self, table: &TableHandle) -> QuarryResult<Vec<CatalogPartition>>;

    /// List the partitions of `table` matching all `predicates`.
    ///
    /// Predicates reference partition columns by their unqualified names.
    /// Temporal literals are interpreted in `time_zone`.
    fn list_partitions_by_filter(
        &self,
        table: &TableHandle,
        predicates: &[LogicalExpr],
        time_zone: &SessionTimeZone,
    ) -> QuarryResult<Vec<CatalogPartition>>;
}
