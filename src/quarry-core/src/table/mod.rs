//! Partitioned-table metadata.
//!
//! A [`TableHandle`] is owned by the catalog and treated as immutable by the
//! planner: every update produces a new handle value.

mod partition;

pub use partition::{CatalogPartition, DEFAULT_PARTITION_NAME, RAW_DATA_SIZE, TOTAL_SIZE};

use common_error::{QuarryError, QuarryResult};
use serde::{Deserialize, Serialize};

use crate::schema::{ColumnInfo, Schema};

/// Fully qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableIdent {
    /// Database (namespace) name.
    pub database: String,
    /// Table name.
    pub name: String,
}

impl TableIdent {
    /// Create a new table identifier.
    pub fn new(database: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for TableIdent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.database, self.name)
    }
}

/// Table-level statistics consumed by the cost-based optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStatistics {
    /// Estimated size of the table data in bytes.
    pub size_in_bytes: u64,
    /// Estimated row count, if known.
    pub row_count: Option<u64>,
}

impl TableStatistics {
    /// Statistics carrying only a size estimate.
    pub const fn with_size(size_in_bytes: u64) -> Self {
        Self {
            size_in_bytes,
            row_count: None,
        }
    }

    /// Attach a row count.
    #[must_use]
    pub const fn with_row_count(mut self, row_count: u64) -> Self {
        self.row_count = Some(row_count);
        self
    }
}

/// Handle to a catalog table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableHandle {
    /// Table identifier.
    pub ident: TableIdent,
    /// Full table schema, data and partition columns alike.
    pub schema: Schema,
    /// Partition column names, in declaration order.
    pub partition_columns: Vec<String>,
    /// Cached statistics, if the catalog has any.
    pub stats: Option<TableStatistics>,
}

impl TableHandle {
    /// Create an unpartitioned table handle.
    pub fn new(ident: TableIdent, schema: Schema) -> Self {
        Self {
            ident,
            schema,
            partition_columns: Vec::new(),
            stats: None,
        }
    }

    /// Declare the partition columns.
    #[must_use]
    pub fn with_partition_columns(
        mut self,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.partition_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the cached statistics.
    #[must_use]
    pub fn with_statistics(mut self, stats: TableStatistics) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Whether the table is declared partitioned.
    pub fn is_partitioned(&self) -> bool {
        !self.partition_columns.is_empty()
    }

    /// Whether `name` is one of the partition columns (ignoring ASCII case).
    pub fn is_partition_column(&self, name: &str) -> bool {
        self.partition_columns
            .iter()
            .any(|c| c.eq_ignore_ascii_case(name))
    }

    /// Cached size statistic, if present.
    pub fn size_in_bytes(&self) -> Option<u64> {
        self.stats.map(|s| s.size_in_bytes)
    }

    /// The schema of the partition columns, in declaration order.
    pub fn partition_schema(&self) -> QuarryResult<Schema> {
        self.partition_columns
            .iter()
            .map(|name| {
                self.schema.find_column(name).cloned().ok_or_else(|| {
                    QuarryError::schema_error(format!(
                        "partition column '{name}' is not part of the schema of {}",
                        self.ident
                    ))
                })
            })
            .collect::<QuarryResult<Vec<ColumnInfo>>>()
            .map(Schema::with_columns)
    }
}
