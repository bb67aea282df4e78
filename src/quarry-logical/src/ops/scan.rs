//! Scan operator over a catalog table.

use common_error::{QuarryError, QuarryResult};
use quarry_core::{CatalogPartition, TableHandle};
use serde::{Deserialize, Serialize};

/// Which partitions of a table a scan reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum PruningState {
    /// No pruning has been applied; the scan reads every partition.
    #[default]
    Unpruned,
    /// The scan reads exactly these partitions.
    Pruned(Vec<CatalogPartition>),
}

/// Scan operator - entry point of all plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOp {
    /// Table metadata, including statistics.
    pub table: TableHandle,
    /// Alias the query uses for the table.
    pub alias: Option<String>,
    /// Partition pruning state.
    pub pruning: PruningState,
}

impl ScanOp {
    /// Create an unpruned scan of `table`.
    pub fn new(table: TableHandle) -> Self {
        Self {
            table,
            alias: None,
            pruning: PruningState::Unpruned,
        }
    }

    /// Set the alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Whether partition pruning has already been applied.
    pub fn is_pruned(&self) -> bool {
        matches!(self.pruning, PruningState::Pruned(_))
    }

    /// The pruned partition list, if pruning has been applied.
    pub fn pruned_partitions(&self) -> Option<&[CatalogPartition]> {
        match &self.pruning {
            PruningState::Pruned(partitions) => Some(partitions),
            PruningState::Unpruned => None,
        }
    }

    /// Restrict the scan to `partitions` and replace its table metadata.
    ///
    /// Pruning is one-way: a scan that is already pruned is rejected.
    pub fn into_pruned(
        self,
        table: TableHandle,
        partitions: Vec<CatalogPartition>,
    ) -> QuarryResult<Self> {
        if self.is_pruned() {
            return Err(QuarryError::internal(format!(
                "scan of {} is already pruned",
                self.table.ident
            )));
        }
        Ok(Self {
            table,
            alias: self.alias,
            pruning: PruningState::Pruned(partitions),
        })
    }

    /// Names by which columns of this scan may be qualified.
    pub fn qualifiers(&self) -> Vec<&str> {
        let mut qualifiers = vec![self.table.ident.name.as_str()];
        if let Some(alias) = &self.alias {
            qualifiers.push(alias);
        }
        qualifiers
    }
}

impl std::fmt::Display for ScanOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scan({}", self.table.ident)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        match self.table.size_in_bytes() {
            Some(size) => write!(f, ", size={size}")?,
            None => write!(f, ", size=?")?,
        }
        match &self.pruning {
            PruningState::Unpruned => write!(f, ", unpruned)"),
            PruningState::Pruned(partitions) => {
                let names = partitions
                    .iter()
                    .map(|p| p.name(&self.table.partition_columns))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, ", pruned={} [{names}])", partitions.len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use quarry_core::{ColumnInfo, DataType, Schema, TableIdent, TableStatistics};

    use super::*;

    fn orders() -> TableHandle {
        TableHandle::new(
            TableIdent::new("sales", "orders"),
            Schema::with_columns(vec![
                ColumnInfo::new("amount", DataType::Float64),
                ColumnInfo::new("year", DataType::Int64),
            ]),
        )
        .with_partition_columns(["year"])
        .with_statistics(TableStatistics::with_size(1000))
    }

    #[test]
    fn test_prune_once() {
        let scan = ScanOp::new(orders()).with_alias("o");
        assert!(!scan.is_pruned());
        assert_eq!(scan.qualifiers(), vec!["orders", "o"]);

        let table = orders().with_statistics(TableStatistics::with_size(10));
        let pruned = scan
            .into_pruned(table.clone(), vec![CatalogPartition::new(["2020"])])
            .unwrap();
        assert!(pruned.is_pruned());
        assert_eq!(pruned.pruned_partitions().map(<[_]>::len), Some(1));
        assert_eq!(pruned.alias.as_deref(), Some("o"));

        let again = pruned.into_pruned(table, Vec::new());
        assert!(matches!(again, Err(QuarryError::InternalError(_))));
    }

    #[test]
    fn test_display() {
        let scan = ScanOp::new(orders());
        assert_eq!(scan.to_string(), "Scan(sales.orders, size=1000, unpruned)");

        let pruned = scan
            .into_pruned(orders(), vec![CatalogPartition::new(["2020"])])
            .unwrap();
        assert_eq!(
            pruned.to_string(),
            "Scan(sales.orders, size=1000, pruned=1 [year=2020])"
        );
    }
}
