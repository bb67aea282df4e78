//! Table size estimation from partition metadata.

use log::debug;
use quarry_core::{CatalogPartition, RAW_DATA_SIZE, TOTAL_SIZE, TableHandle, TableStatistics};

/// Size hint of one partition in bytes, or 0 when unknown.
///
/// The raw data size is preferred; the total (on-disk) size is used when the
/// raw size is missing or not positive. Unparseable values count as missing.
pub fn partition_size_hint(partition: &CatalogPartition) -> u64 {
    let positive = |key: &str| {
        partition
            .parameter(key)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|size| *size > 0)
            .and_then(|size| u64::try_from(size).ok())
    };
    positive(RAW_DATA_SIZE)
        .or_else(|| positive(TOTAL_SIZE))
        .unwrap_or(0)
}

/// Total size of `partitions`, only when every partition has a known size.
///
/// An empty list has size 0.
pub fn refresh_size(partitions: &[CatalogPartition]) -> Option<u64> {
    partitions.iter().try_fold(0u64, |total, partition| {
        match partition_size_hint(partition) {
            0 => None,
            size => Some(total.saturating_add(size)),
        }
    })
}

/// Copy of `table` with statistics describing only `partitions`.
///
/// When any partition's size is unknown, the table's existing statistics
/// are kept. A refreshed statistic drops the row count, which described the
/// whole table.
pub fn refresh_statistics(table: &TableHandle, partitions: &[CatalogPartition]) -> TableHandle {
    match refresh_size(partitions) {
        Some(size) => {
            debug!(
                "Refreshed size of {} to {size} bytes from {} partitions",
                table.ident,
                partitions.len()
            );
            table.clone().with_statistics(TableStatistics::with_size(size))
        }
        None => {
            debug!(
                "Keeping prior statistics of {}: partition sizes incomplete",
                table.ident
            );
            table.clone()
        }
    }
}
