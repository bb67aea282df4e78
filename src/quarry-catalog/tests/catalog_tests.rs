//! Integration tests for the in-memory partition catalog.

use std::sync::Arc;

use quarry_catalog::{InMemoryCatalog, PartitionCatalog};
use quarry_core::{
    CatalogPartition, ColumnInfo, DEFAULT_PARTITION_NAME, DataType, Schema, SessionTimeZone,
    TableHandle, TableIdent,
};
use quarry_logical::{col, lit};

fn events() -> TableHandle {
    TableHandle::new(
        TableIdent::new("web", "events"),
        Schema::with_columns(vec![
            ColumnInfo::new("payload", DataType::String),
            ColumnInfo::new("day", DataType::Date),
            ColumnInfo::new("hour", DataType::Timestamp),
        ]),
    )
    .with_partition_columns(["day", "hour"])
}

fn events_catalog() -> InMemoryCatalog {
    let mut catalog = InMemoryCatalog::new();
    catalog.register_table(events());
    let ident = events().ident;
    for (day, hour) in [
        ("2024-03-01", "2024-03-01 23:00:00"),
        ("2024-03-02", "2024-03-02 01:00:00"),
        (DEFAULT_PARTITION_NAME, DEFAULT_PARTITION_NAME),
    ] {
        catalog
            .add_partition(&ident, CatalogPartition::new([day, hour]))
            .unwrap();
    }
    catalog
}

#[test]
fn test_temporal_filters_use_session_time_zone() {
    let catalog = events_catalog();
    let predicate = vec![col("hour").gt_eq(lit("2024-03-02 00:00:00"))];

    let utc = catalog
        .list_partitions_by_filter(&events(), &predicate, &SessionTimeZone::utc())
        .unwrap();
    assert_eq!(utc.len(), 1);

    // Partition values and literals shift together, so the result is stable.
    let tokyo: SessionTimeZone = "+09:00".parse().unwrap();
    let shifted = catalog
        .list_partitions_by_filter(&events(), &predicate, &tokyo)
        .unwrap();
    assert_eq!(shifted, utc);
}

#[test]
fn test_default_partition_is_null() {
    let catalog = events_catalog();
    let tz = SessionTimeZone::utc();

    let nulls = catalog
        .list_partitions_by_filter(&events(), &[col("day").is_null()], &tz)
        .unwrap();
    assert_eq!(nulls.len(), 1);

    let dated = catalog
        .list_partitions_by_filter(&events(), &[col("day").lt(lit("2024-03-02"))], &tz)
        .unwrap();
    assert_eq!(dated.len(), 1);
}

#[test]
fn test_catalog_as_trait_object() {
    let catalog: Arc<dyn PartitionCatalog> = Arc::new(events_catalog());
    assert_eq!(catalog.list_partitions(&events()).unwrap().len(), 3);
}
