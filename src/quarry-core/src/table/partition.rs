//! Catalog partitions.

use std::collections::BTreeMap;

use common_error::{QuarryError, QuarryResult};
use serde::{Deserialize, Serialize};

use super::TableHandle;
use crate::types::{Row, SessionTimeZone, Value};

/// Partition parameter holding the uncompressed data size in bytes.
pub const RAW_DATA_SIZE: &str = "rawDataSize";

/// Partition parameter holding the on-disk size in bytes.
pub const TOTAL_SIZE: &str = "totalSize";

/// Partition value used for NULL partition keys.
pub const DEFAULT_PARTITION_NAME: &str = "__HIVE_DEFAULT_PARTITION__";

/// One physical partition of a table, as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPartition {
    /// Partition-column values, aligned with the table's partition columns.
    pub values: Vec<String>,
    /// Free-form catalog parameters (size hints among them).
    pub parameters: BTreeMap<String, String>,
}

impl CatalogPartition {
    /// Create a partition from its ordered partition-column values.
    pub fn new(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            parameters: BTreeMap::new(),
        }
    }

    /// Attach a catalog parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Look up a catalog parameter.
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// Hive-style partition name, e.g. `year=2020/month=3`.
    pub fn name(&self, partition_columns: &[String]) -> String {
        partition_columns
            .iter()
            .zip(&self.values)
            .map(|(column, value)| format!("{column}={value}"))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Convert the partition values into a typed row over the partition columns.
    ///
    /// Values are cast to the declared column types; temporal values are read
    /// in `time_zone`. The default partition name becomes NULL.
    pub fn to_row(&self, table: &TableHandle, time_zone: &SessionTimeZone) -> QuarryResult<Row> {
        let schema = table.partition_schema()?;
        if schema.len() != self.values.len() {
            return Err(QuarryError::oos(format!(
                "partition of {} has {} values but the table has {} partition columns",
                table.ident,
                self.values.len(),
                schema.len()
            )));
        }

        let mut row = Row::new();
        for (column, raw) in schema.columns.iter().zip(&self.values) {
            let value = if raw == DEFAULT_PARTITION_NAME {
                Value::Null
            } else {
                Value::parse_as(raw, &column.data_type, time_zone).map_err(|e| {
                    QuarryError::oos(format!(
                        "partition {} of {}: {e}",
                        self.name(&table.partition_columns),
                        table.ident
                    ))
                })?
            };
            row.push(column.name.clone(), value);
        }
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnInfo, Schema};
    use crate::table::TableIdent;
    use crate::types::DataType;

    fn events() -> TableHandle {
        TableHandle::new(
            TableIdent::new("logs", "events"),
            Schema::with_columns(vec![
                ColumnInfo::new("payload", DataType::String),
                ColumnInfo::new("day", DataType::Date),
                ColumnInfo::new("hour", DataType::Int64),
            ]),
        )
        .with_partition_columns(["day", "hour"])
    }

    #[test]
    fn test_partition_name() {
        let partition = CatalogPartition::new(["2020-03-01", "7"]);
        assert_eq!(
            partition.name(&events().partition_columns),
            "day=2020-03-01/hour=7"
        );
    }

    #[test]
    fn test_to_row_casts_values() {
        let row = CatalogPartition::new(["1970-01-03", "7"])
            .to_row(&events(), &SessionTimeZone::utc())
            .unwrap();

        assert_eq!(row.get("day"), Some(&Value::Date(2)));
        assert_eq!(row.get("hour"), Some(&Value::Int64(7)));
    }

    #[test]
    fn test_default_partition_is_null() {
        let row = CatalogPartition::new(["1970-01-01", DEFAULT_PARTITION_NAME])
            .to_row(&events(), &SessionTimeZone::utc())
            .unwrap();

        assert_eq!(row.get("hour"), Some(&Value::Null));
    }

    #[test]
    fn test_to_row_rejects_malformed_partitions() {
        let tz = SessionTimeZone::utc();

        let arity = CatalogPartition::new(["1970-01-01"]).to_row(&events(), &tz);
        assert!(matches!(arity, Err(QuarryError::OutOfSpec(_))));

        let bad_value = CatalogPartition::new(["yesterday", "7"]).to_row(&events(), &tz);
        assert!(matches!(bad_value, Err(QuarryError::OutOfSpec(_))));
    }

    #[test]
    fn test_parameters() {
        let partition = CatalogPartition::new(["1970-01-01", "0"])
            .with_parameter(RAW_DATA_SIZE, "1000")
            .with_parameter(TOTAL_SIZE, "400");

        assert_eq!(partition.parameter(RAW_DATA_SIZE), Some("1000"));
        assert_eq!(partition.parameter("numRows"), None);
    }
}
