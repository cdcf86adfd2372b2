//! Runs every applicable relationship check for one database

use serde::Serialize;

use super::checker::{CheckOutcome, PairwiseIntegrityChecker, RelationshipStats};
use super::cursor::{CursorResult, RowCursor};
use super::relationship::{Relationship, ALIGNMENT_RELATIONSHIPS};
use crate::observability::{log_event_with_fields, Event, ObservationScope};
use crate::report::IntegrityVerdict;
use crate::structure::RowSetMask;
use crate::validate::{StopFlag, ValidateConfig, ValidateError, ValidateResult};

/// Opens row-sets of a database for cursor reads
pub trait RowSetSource {
    /// Opens the named row-set
    fn open_row_set(&self, name: &str) -> CursorResult<Box<dyn RowCursor + '_>>;
}

/// Outcome of one relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipOutcome {
    /// Which columns were checked
    pub relationship: Relationship,
    /// Verdict
    pub verdict: IntegrityVerdict,
    /// Counters
    pub stats: RelationshipStats,
}

impl RelationshipOutcome {
    /// `ONE.COLUMN <-> MANY.COLUMN`
    pub fn label(&self) -> String {
        self.relationship.label()
    }
}

/// Checks the relationships whose row-sets are both present
///
/// Relationships run in `ALIGNMENT_RELATIONSHIPS` order. A failure does not
/// stop the remaining relationships unless `fail_fast` is set. The stop flag
/// is honored between relationships only.
pub struct IntegrityOrchestrator<'a> {
    config: &'a ValidateConfig,
    stop: &'a StopFlag,
    run_id: &'a str,
}

impl<'a> IntegrityOrchestrator<'a> {
    /// Creates an orchestrator for one run
    pub fn new(config: &'a ValidateConfig, stop: &'a StopFlag, run_id: &'a str) -> Self {
        Self {
            config,
            stop,
            run_id,
        }
    }

    /// Checks every applicable relationship
    pub fn run<S>(&self, source: &S, present: RowSetMask) -> ValidateResult<Vec<RelationshipOutcome>>
    where
        S: RowSetSource + ?Sized,
    {
        let checker = PairwiseIntegrityChecker::new(self.config.memory_ceiling_bytes)
            .with_coverage_pass(self.config.coverage_pass);

        let applicable: Vec<&Relationship> = ALIGNMENT_RELATIONSHIPS
            .iter()
            .filter(|relationship| relationship.applies_to(present))
            .collect();
        let count = applicable.len().to_string();
        log_event_with_fields(
            Event::IntegrityBegin,
            &[("relationships", count.as_str()), ("run_id", self.run_id)],
        );

        let mut outcomes = Vec::with_capacity(applicable.len());
        for relationship in applicable {
            let label = relationship.label();
            if self.stop.is_stopped() {
                return Err(ValidateError::interrupted(format!(
                    "stopped before checking {}",
                    label
                )));
            }

            let scope = ObservationScope::begin(
                "INTEGRITY_CHECK",
                &[("relationship", label.as_str()), ("run_id", self.run_id)],
            );
            let outcome = match check_relationship(&checker, source, relationship) {
                Ok(outcome) => outcome,
                Err(e) => CheckOutcome {
                    verdict: IntegrityVerdict::Unexpected {
                        detail: format!("{} can not be read: {}", label, e),
                    },
                    stats: RelationshipStats::default(),
                },
            };

            let failed = !outcome.verdict.status().passed();
            if failed {
                scope.fail(&outcome.verdict.to_string());
            } else {
                let rows = outcome.stats.rows_scanned.to_string();
                scope.complete(&[
                    ("rows_scanned", rows.as_str()),
                    ("status", outcome.verdict.status().as_str()),
                ]);
            }

            outcomes.push(RelationshipOutcome {
                relationship: *relationship,
                verdict: outcome.verdict,
                stats: outcome.stats,
            });

            if failed && self.config.fail_fast {
                break;
            }
        }

        log_event_with_fields(Event::IntegrityComplete, &[("run_id", self.run_id)]);
        Ok(outcomes)
    }
}

fn check_relationship<S>(
    checker: &PairwiseIntegrityChecker,
    source: &S,
    relationship: &Relationship,
) -> CursorResult<CheckOutcome>
where
    S: RowSetSource + ?Sized,
{
    let mut many = source.open_row_set(relationship.many.name())?;
    let many_column = many.add_column(relationship.many_column)?;
    let mut one = source.open_row_set(relationship.one.name())?;
    let one_column = one.add_column(relationship.one_column)?;

    checker.check(many.as_mut(), many_column, one.as_mut(), one_column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrity::cursor::{CellView, ColumnId, CursorError, RowRange};
    use crate::structure::RowSet;
    use std::cell::Cell;
    use std::collections::HashMap;

    /// Row-sets as column name -> (start, rows of ids)
    #[derive(Default)]
    struct MockDatabase {
        tables: HashMap<&'static str, HashMap<&'static str, (i64, Vec<Vec<i64>>)>>,
        opened: Cell<usize>,
    }

    impl MockDatabase {
        fn column(mut self, table: &'static str, column: &'static str, start: i64, rows: Vec<Vec<i64>>) -> Self {
            self.tables
                .entry(table)
                .or_default()
                .insert(column, (start, rows));
            self
        }
    }

    struct MockTable {
        columns: Vec<(i64, Vec<Vec<u8>>, Vec<u32>)>,
        names: HashMap<&'static str, (i64, Vec<Vec<i64>>)>,
    }

    impl RowCursor for MockTable {
        fn add_column(&mut self, name: &str) -> CursorResult<ColumnId> {
            let (start, rows) = self
                .names
                .get(name)
                .cloned()
                .ok_or_else(|| CursorError::ColumnNotFound(name.to_string()))?;
            let counts = rows.iter().map(|r| r.len() as u32).collect();
            let bytes = rows
                .iter()
                .map(|r| r.iter().flat_map(|id| id.to_le_bytes()).collect())
                .collect();
            self.columns.push((start, bytes, counts));
            Ok(ColumnId(self.columns.len() as u32 - 1))
        }

        fn id_range(&self, column: ColumnId) -> CursorResult<RowRange> {
            let (start, rows, _) = &self.columns[column.0 as usize];
            Ok(RowRange::new(*start, rows.len() as u64))
        }

        fn cell(&mut self, column: ColumnId, row: i64) -> CursorResult<CellView<'_>> {
            let (start, rows, counts) = &self.columns[column.0 as usize];
            let index = usize::try_from(row - start).map_err(|_| CursorError::RowNotFound { row })?;
            match rows.get(index) {
                Some(bytes) => Ok(CellView::new(64, counts[index], bytes)),
                None => Err(CursorError::RowNotFound { row }),
            }
        }
    }

    impl RowSetSource for MockDatabase {
        fn open_row_set(&self, name: &str) -> CursorResult<Box<dyn RowCursor + '_>> {
            self.opened.set(self.opened.get() + 1);
            let names = self
                .tables
                .get(name)
                .cloned()
                .ok_or_else(|| CursorError::TableNotFound(name.to_string()))?;
            Ok(Box::new(MockTable {
                columns: Vec::new(),
                names,
            }))
        }
    }

    fn aligned_database() -> MockDatabase {
        MockDatabase::default()
            .column("SEQUENCE", "PRIMARY_ALIGNMENT_ID", 1, vec![vec![1, 2], vec![3, 0]])
            .column("PRIMARY_ALIGNMENT", "SEQ_SPOT_ID", 1, vec![vec![1], vec![1], vec![2]])
            .column("PRIMARY_ALIGNMENT", "REF_ID", 1, vec![vec![1], vec![1], vec![1]])
            .column("REFERENCE", "PRIMARY_ALIGNMENT_IDS", 1, vec![vec![1, 2, 3]])
    }

    fn present(sets: &[RowSet]) -> RowSetMask {
        sets.iter().copied().collect()
    }

    #[test]
    fn test_all_applicable_relationships_checked() {
        let config = ValidateConfig::default();
        let stop = StopFlag::new();
        let outcomes = IntegrityOrchestrator::new(&config, &stop, "run")
            .run(
                &aligned_database(),
                present(&[RowSet::Sequence, RowSet::PrimaryAlignment, RowSet::Reference]),
            )
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.verdict.is_ok()));
        assert_eq!(outcomes[0].relationship.one, RowSet::Sequence);
    }

    #[test]
    fn test_failure_does_not_stop_siblings() {
        let db = MockDatabase::default()
            .column("SEQUENCE", "PRIMARY_ALIGNMENT_ID", 1, vec![vec![1]])
            .column("PRIMARY_ALIGNMENT", "SEQ_SPOT_ID", 1, vec![vec![1], vec![1]])
            .column("PRIMARY_ALIGNMENT", "REF_ID", 1, vec![vec![1], vec![1]])
            .column("REFERENCE", "PRIMARY_ALIGNMENT_IDS", 1, vec![vec![1, 2]]);
        let sets = present(&[RowSet::Sequence, RowSet::PrimaryAlignment, RowSet::Reference]);

        let config = ValidateConfig::default();
        let stop = StopFlag::new();
        let outcomes = IntegrityOrchestrator::new(&config, &stop, "run")
            .run(&db, sets)
            .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(
            outcomes[0].verdict,
            IntegrityVerdict::Inconsistent {
                key: 1,
                origins: vec![2]
            }
        );
        assert!(outcomes[1].verdict.is_ok());

        let fail_fast = ValidateConfig {
            fail_fast: true,
            ..ValidateConfig::default()
        };
        let outcomes = IntegrityOrchestrator::new(&fail_fast, &stop, "run")
            .run(&db, sets)
            .unwrap();
        assert_eq!(outcomes.len(), 1);
    }

    #[test]
    fn test_missing_column_is_unexpected() {
        let db = MockDatabase::default()
            .column("REFERENCE", "PRIMARY_ALIGNMENT_IDS", 1, vec![vec![1]])
            .column("PRIMARY_ALIGNMENT", "SEQ_SPOT_ID", 1, vec![vec![1]]);
        let config = ValidateConfig::default();
        let stop = StopFlag::new();
        let outcomes = IntegrityOrchestrator::new(&config, &stop, "run")
            .run(&db, present(&[RowSet::Reference, RowSet::PrimaryAlignment]))
            .unwrap();

        match &outcomes[0].verdict {
            IntegrityVerdict::Unexpected { detail } => {
                assert!(detail.contains("REF_ID"));
            }
            other => panic!("unexpected verdict {:?}", other),
        }
    }

    #[test]
    fn test_stop_flag_checked_between_relationships() {
        let config = ValidateConfig::default();
        let stop = StopFlag::new();
        stop.stop();
        let db = aligned_database();
        let err = IntegrityOrchestrator::new(&config, &stop, "run")
            .run(
                &db,
                present(&[RowSet::Sequence, RowSet::PrimaryAlignment, RowSet::Reference]),
            )
            .unwrap_err();
        assert_eq!(err.code(), crate::validate::ValidateErrorCode::Interrupted);
        assert_eq!(db.opened.get(), 0);
    }

    #[test]
    fn test_nothing_applicable() {
        let config = ValidateConfig::default();
        let stop = StopFlag::new();
        let outcomes = IntegrityOrchestrator::new(&config, &stop, "run")
            .run(&aligned_database(), present(&[RowSet::Sequence]))
            .unwrap();
        assert!(outcomes.is_empty());
    }
}
