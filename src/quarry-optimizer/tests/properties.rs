//! Property-based tests for partition pruning.

use std::sync::Arc;

use common_config::PartitionPruningConfig;
use proptest::prelude::*;
use quarry_catalog::{InMemoryCatalog, PartitionCatalog};
use quarry_core::{
    CatalogPartition, ColumnInfo, DataType, RAW_DATA_SIZE, Schema, SessionTimeZone, TOTAL_SIZE,
    TableHandle, TableIdent,
};
use quarry_logical::{
    BinaryOp, FilterOp, LogicalExpr, PlanBuilder, ScanOp, col, lit, split_conjunction,
};
use quarry_optimizer::{
    CatalogSidePruning, ClientSidePruning, OptimizationRule, PartitionPredicateSet,
    PredicateClassifier, PrunePartitions, PruningStrategy, partition_size_hint, refresh_size,
};

const PARTITION_COLUMNS: [&str; 2] = ["year", "month"];

fn orders() -> TableHandle {
    TableHandle::new(
        TableIdent::new("sales", "orders"),
        Schema::with_columns(vec![
            ColumnInfo::new("revenue", DataType::Float64),
            ColumnInfo::new("year", DataType::Int64),
            ColumnInfo::new("month", DataType::Int64),
        ]),
    )
    .with_partition_columns(PARTITION_COLUMNS)
}

// =========================================================================
// Strategies
// =========================================================================

fn arb_comparison() -> impl Strategy<Value = BinaryOp> {
    prop_oneof![
        Just(BinaryOp::Eq),
        Just(BinaryOp::NotEq),
        Just(BinaryOp::Lt),
        Just(BinaryOp::LtEq),
        Just(BinaryOp::Gt),
        Just(BinaryOp::GtEq),
    ]
}

fn arb_partition_column() -> impl Strategy<Value = LogicalExpr> {
    prop_oneof![Just(col("year")), Just(col("month"))]
}

fn arb_literal() -> impl Strategy<Value = LogicalExpr> {
    prop_oneof![(2016i64..2024).prop_map(|v| lit(v)), (0i64..14).prop_map(|v| lit(v))]
}

/// Predicates the catalog can evaluate: partition columns against literals.
fn arb_supported_predicate() -> impl Strategy<Value = LogicalExpr> {
    let leaf = prop_oneof![
        (arb_partition_column(), arb_comparison(), arb_literal())
            .prop_map(|(c, op, v)| LogicalExpr::binary(c, op, v)),
        (arb_partition_column(), prop::collection::vec(arb_literal(), 1..4))
            .prop_map(|(c, list)| c.in_list(list)),
        (arb_partition_column(), arb_literal(), arb_literal())
            .prop_map(|(c, low, high)| c.between(low, high)),
        arb_partition_column().prop_map(LogicalExpr::is_null),
    ];
    leaf.prop_recursive(3, 12, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l.and(r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l.or(r)),
            inner.prop_map(LogicalExpr::logical_not),
        ]
    })
}

/// Arbitrary predicates, including data columns, volatile functions and
/// subqueries.
fn arb_any_predicate() -> impl Strategy<Value = LogicalExpr> {
    let subquery = PlanBuilder::scan(ScanOp::new(orders())).build();
    let leaf = prop_oneof![
        4 => arb_supported_predicate(),
        1 => (arb_comparison(), arb_literal())
            .prop_map(|(op, v)| LogicalExpr::binary(col("revenue"), op, v)),
        1 => arb_partition_column()
            .prop_map(|c| c.gt(LogicalExpr::function("rand", vec![]))),
        1 => arb_partition_column()
            .prop_map(move |c| c.in_subquery(subquery.clone())),
        1 => Just(lit(true)),
    ];
    leaf.prop_recursive(2, 8, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l.and(r)),
            (inner.clone(), inner).prop_map(|(l, r)| l.or(r)),
        ]
    })
}

fn arb_partitions() -> impl Strategy<Value = Vec<CatalogPartition>> {
    prop::collection::btree_set((2017i64..2023, 1i64..13), 0..12).prop_map(|keys| {
        keys.into_iter()
            .map(|(year, month)| CatalogPartition::new([year.to_string(), month.to_string()]))
            .collect()
    })
}

fn arb_sized_partition() -> impl Strategy<Value = CatalogPartition> {
    (
        prop::option::of(-5i64..5000),
        prop::option::of(-5i64..5000),
    )
        .prop_map(|(raw, total)| {
            let mut partition = CatalogPartition::new(["2020", "1"]);
            if let Some(raw) = raw {
                partition = partition.with_parameter(RAW_DATA_SIZE, raw.to_string());
            }
            if let Some(total) = total {
                partition = partition.with_parameter(TOTAL_SIZE, total.to_string());
            }
            partition
        })
}

fn catalog_with(partitions: &[CatalogPartition]) -> InMemoryCatalog {
    let mut catalog = InMemoryCatalog::new();
    catalog.register_table(orders());
    for partition in partitions {
        catalog
            .add_partition(&orders().ident, partition.clone())
            .unwrap();
    }
    catalog
}

// =========================================================================
// Properties
// =========================================================================

proptest! {
    #[test]
    fn classified_predicates_are_safe(filters in prop::collection::vec(arb_any_predicate(), 0..6)) {
        let scan = ScanOp::new(orders());
        let conjuncts: Vec<_> = filters
            .iter()
            .flat_map(split_conjunction)
            .cloned()
            .collect();
        let set = PredicateClassifier::new(&scan).classify(&conjuncts);

        for predicate in &set {
            prop_assert!(predicate.is_deterministic());
            prop_assert!(!predicate.contains_subquery());
            let refs = predicate.column_refs();
            prop_assert!(!refs.is_empty());
            prop_assert!(refs.iter().all(|c| PARTITION_COLUMNS.contains(&c.as_str())));
        }
        prop_assert!(set.len() <= conjuncts.len());
    }

    #[test]
    fn refreshed_size_is_all_or_nothing(partitions in prop::collection::vec(arb_sized_partition(), 0..8)) {
        let hints: Vec<_> = partitions.iter().map(partition_size_hint).collect();
        match refresh_size(&partitions) {
            Some(size) => {
                prop_assert!(hints.iter().all(|h| *h > 0));
                prop_assert_eq!(size, hints.iter().sum::<u64>());
            }
            None => prop_assert!(hints.contains(&0)),
        }

        // A subset of known-size partitions never grows the estimate.
        if let (Some(all), Some(first)) = (refresh_size(&partitions), refresh_size(&partitions[..partitions.len() / 2])) {
            prop_assert!(first <= all);
        }
    }

    #[test]
    fn strategies_agree(
        partitions in arb_partitions(),
        predicates in prop::collection::vec(arb_supported_predicate(), 1..4),
    ) {
        let catalog = catalog_with(&partitions);
        let mut set = PartitionPredicateSet::new();
        for predicate in predicates {
            set.insert(predicate);
        }
        let tz = SessionTimeZone::utc();

        let client = ClientSidePruning.prune(&catalog, &orders(), &set, &tz).unwrap();
        let pushed = CatalogSidePruning.prune(&catalog, &orders(), &set, &tz).unwrap();
        prop_assert_eq!(client, pushed);
    }

    #[test]
    fn rule_is_idempotent(
        partitions in arb_partitions(),
        predicate in arb_any_predicate(),
        catalog_side in any::<bool>(),
    ) {
        let catalog: Arc<dyn PartitionCatalog> = Arc::new(
            catalog_with(&partitions).with_fallback_on_unsupported(true),
        );
        let config = PartitionPruningConfig::default().with_catalog_side_pruning(catalog_side);
        let rule = PrunePartitions::new(catalog, &config).unwrap();
        let plan = PlanBuilder::scan(ScanOp::new(orders()))
            .filter(FilterOp::new(predicate))
            .build();

        let once = rule.apply(plan).unwrap();
        let twice = rule.apply(once.plan.clone()).unwrap();
        prop_assert!(!twice.changed);
        prop_assert_eq!(twice.plan, once.plan);
    }
}
