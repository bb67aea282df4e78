//! Selection of predicates that constrain only partition columns.

use log::debug;
use quarry_core::TableHandle;
use quarry_logical::{BinaryOp, LogicalExpr, ScanOp, normalize_columns};

/// Deduplicated predicates that reference only partition columns.
///
/// Every member is deterministic, free of subqueries, and references a
/// non-empty set of partition columns by their unqualified names. Insertion
/// order is kept for stable output but carries no meaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionPredicateSet {
    predicates: Vec<LogicalExpr>,
}

impl PartitionPredicateSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a predicate unless a structurally equal one is present.
    /// Returns whether the predicate was added.
    pub fn insert(&mut self, predicate: LogicalExpr) -> bool {
        if self.predicates.contains(&predicate) {
            return false;
        }
        self.predicates.push(predicate);
        true
    }

    /// Whether a structurally equal predicate is present.
    pub fn contains(&self, predicate: &LogicalExpr) -> bool {
        self.predicates.contains(predicate)
    }

    /// Number of predicates.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Iterate over the predicates.
    pub fn iter(&self) -> std::slice::Iter<'_, LogicalExpr> {
        self.predicates.iter()
    }

    /// The predicates as a slice.
    pub fn as_slice(&self) -> &[LogicalExpr] {
        &self.predicates
    }
}

impl<'a> IntoIterator for &'a PartitionPredicateSet {
    type Item = &'a LogicalExpr;
    type IntoIter = std::slice::Iter<'a, LogicalExpr>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Classifies filter conjuncts over one scan.
#[derive(Debug)]
pub struct PredicateClassifier<'a> {
    table: &'a TableHandle,
    qualifiers: Vec<&'a str>,
}

impl<'a> PredicateClassifier<'a> {
    /// Classifier for predicates over `scan`'s table.
    pub fn new(scan: &'a ScanOp) -> Self {
        Self {
            table: &scan.table,
            qualifiers: scan.qualifiers(),
        }
    }

    /// Extract the partition-only part of each predicate.
    ///
    /// Non-deterministic predicates and predicates containing subqueries are
    /// dropped before normalization. Never fails: anything that cannot be
    /// proven safe is simply left out.
    pub fn classify(&self, filters: &[LogicalExpr]) -> PartitionPredicateSet {
        let mut set = PartitionPredicateSet::new();

        for filter in filters {
            if !filter.is_deterministic() || filter.contains_subquery() {
                debug!("Skipping non-prunable predicate {filter}");
                continue;
            }
            let normalized = normalize_columns(filter.clone(), &self.table.schema, &self.qualifiers);
            if let Some(extracted) = self.extract(&normalized) {
                set.insert(extracted);
            }
        }

        debug!(
            "Classified {} of {} predicates as partition predicates on {}",
            set.len(),
            filters.len(),
            self.table.ident
        );
        set
    }

    /// The weakest-needed predicate implied by `expr` over partition columns.
    ///
    /// Under `AND` either side may be dropped; under `OR` both sides must
    /// yield a predicate. The result is implied by `expr`, which stays in the
    /// plan, so weakening is safe.
    fn extract(&self, expr: &LogicalExpr) -> Option<LogicalExpr> {
        match expr {
            LogicalExpr::Binary {
                left,
                op: BinaryOp::And,
                right,
            } => match (self.extract(left), self.extract(right)) {
                (Some(l), Some(r)) => Some(l.and(r)),
                (Some(side), None) | (None, Some(side)) => Some(side),
                (None, None) => None,
            },
            LogicalExpr::Binary {
                left,
                op: BinaryOp::Or,
                right,
            } => Some(self.extract(left)?.or(self.extract(right)?)),
            other => self.is_partition_only(other).then(|| other.clone()),
        }
    }

    fn is_partition_only(&self, predicate: &LogicalExpr) -> bool {
        let refs = predicate.column_refs();
        !refs.is_empty() && refs.iter().all(|c| self.table.is_partition_column(c))
    }
}
