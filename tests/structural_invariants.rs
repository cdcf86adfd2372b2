//! Structural Invariant Tests
//!
//! Tests for invariants:
//! - REFERENCE and PRIMARY_ALIGNMENT are required together in an alignment
//!   database, unless it holds only SEQUENCE
//! - EVIDENCE_ALIGNMENT and EVIDENCE_INTERVAL are both present or both absent
//! - Objects outside the vocabulary warn and never fail
//! - Sequence tables need READ and QUALITY; SPOT_LEN is optional
//! - Schema families other than alignment get no family-specific checks

use std::path::Path;

use dbcheck::container::{
    ColumnManifest, DatabaseManifest, Manifest, ManifestContainer, TableManifest,
};
use dbcheck::report::{
    CheckVerdict, MemorySink, Status, StructuralVerdict, ValidationReport, Verdict,
};
use dbcheck::validate::{ValidateConfig, Validator};

// =============================================================================
// Test Utilities
// =============================================================================

fn table(name: &str, columns: &[&str]) -> TableManifest {
    TableManifest {
        name: name.to_string(),
        schema: String::new(),
        columns: columns
            .iter()
            .map(|column| ColumnManifest::new(*column, 1, Vec::new()))
            .collect(),
        indices: Vec::new(),
        extra: Vec::new(),
    }
}

fn database(schema: &str, tables: &[&str]) -> ManifestContainer {
    let manifest = Manifest::Database(DatabaseManifest {
        name: "db".to_string(),
        schema: schema.to_string(),
        tables: tables.iter().map(|name| table(name, &["COL"])).collect(),
        databases: Vec::new(),
        extra: Vec::new(),
    });
    ManifestContainer::from_manifest("/data/db", manifest).unwrap()
}

fn sequence_table(schema: &str, columns: &[&str]) -> ManifestContainer {
    let mut table = table("run", columns);
    table.schema = schema.to_string();
    ManifestContainer::from_manifest("/data/run", Manifest::Table(table)).unwrap()
}

fn run(container: &ManifestContainer) -> ValidationReport {
    // structure only; the columns here carry no ids
    let config = ValidateConfig {
        referential_integrity: false,
        ..ValidateConfig::default()
    };
    let mut sink = MemorySink::new();
    Validator::new(&config)
        .validate(Path::new("/data"), container, &mut sink)
        .unwrap()
}

fn structural(report: &ValidationReport) -> Vec<&StructuralVerdict> {
    report
        .findings
        .iter()
        .filter_map(|finding| match &finding.verdict {
            Verdict::Structural(verdict) => Some(verdict),
            _ => None,
        })
        .collect()
}

fn warnings(report: &ValidationReport) -> Vec<String> {
    report
        .findings
        .iter()
        .filter(|finding| finding.verdict.is_warning())
        .map(|finding| finding.verdict.to_string())
        .collect()
}

const ALIGNMENT: &str = "NCBI:align:db:alignment_sorted#1.3";

// =============================================================================
// Alignment family
// =============================================================================

#[test]
fn test_complete_alignment_database() {
    let report = run(&database(
        ALIGNMENT,
        &["SEQUENCE", "REFERENCE", "PRIMARY_ALIGNMENT", "SECONDARY_ALIGNMENT"],
    ));
    assert_eq!(report.status, Status::Ok);
    assert!(structural(&report).is_empty());
}

#[test]
fn test_missing_reference_is_incomplete() {
    let report = run(&database(ALIGNMENT, &["SEQUENCE", "PRIMARY_ALIGNMENT"]));
    assert_eq!(report.status, Status::Incomplete);
    assert_eq!(
        structural(&report),
        vec![&StructuralVerdict::Incomplete {
            missing: vec!["REFERENCE".to_string()],
        }]
    );
}

#[test]
fn test_sequence_only_is_unaligned_data() {
    let report = run(&database(ALIGNMENT, &["SEQUENCE"]));
    assert!(report.passed());
    assert!(report.relationships.is_empty());
}

#[test]
fn test_evidence_pair_must_be_complete() {
    let report = run(&database(
        ALIGNMENT,
        &["SEQUENCE", "REFERENCE", "PRIMARY_ALIGNMENT", "EVIDENCE_ALIGNMENT"],
    ));
    assert_eq!(report.status, Status::Incomplete);
    assert_eq!(
        structural(&report),
        vec![&StructuralVerdict::Incomplete {
            missing: vec!["EVIDENCE_INTERVAL".to_string()],
        }]
    );
}

#[test]
fn test_unexpected_table_only_warns() {
    let report = run(&database(
        ALIGNMENT,
        &["SEQUENCE", "REFERENCE", "PRIMARY_ALIGNMENT", "NOTES"],
    ));
    assert!(report.passed());
    assert_eq!(report.warnings, 1);
    assert_eq!(
        structural(&report),
        vec![&StructuralVerdict::Unexpected {
            object: "NOTES".to_string(),
        }]
    );
}

/// Names match exactly; a near miss is an unexpected object, not a row-set.
#[test]
fn test_row_set_names_are_exact() {
    let report = run(&database(ALIGNMENT, &["sequence", "REFERENCE", "PRIMARY_ALIGNMENT"]));
    assert!(report.passed());
    assert_eq!(
        structural(&report),
        vec![&StructuralVerdict::Unexpected {
            object: "sequence".to_string(),
        }]
    );
}

// =============================================================================
// Other families
// =============================================================================

#[test]
fn test_recognized_family_has_no_specific_checks() {
    for schema in ["NCBI:var:db:variation#1", "NCBI:WGS:db:contig", "NCBI:SRA:PacBio:smrt:db#1.0"] {
        let report = run(&database(schema, &["ANYTHING"]));
        assert!(report.passed(), "{} failed: {:?}", schema, report.findings);
        assert_eq!(report.warnings, 0, "{} warned", schema);
    }
}

#[test]
fn test_unrecognized_family_warns() {
    let report = run(&database("acme:db:thing#2", &["SEQUENCE"]));
    assert!(report.passed());
    assert_eq!(warnings(&report), vec!["has unrecognized type 'acme:db:thing'".to_string()]);
}

// =============================================================================
// Sequence tables
// =============================================================================

#[test]
fn test_sequence_table_requires_read_and_quality() {
    let report = run(&sequence_table("NCBI:SRA:Illumina:tbl:v2#1", &["READ", "SPOT_LEN"]));
    assert_eq!(report.status, Status::Incomplete);
    assert_eq!(
        structural(&report),
        vec![&StructuralVerdict::Incomplete {
            missing: vec!["QUALITY".to_string()],
        }]
    );
}

#[test]
fn test_missing_spot_len_is_fasta_only() {
    let report = run(&sequence_table("", &["READ", "QUALITY"]));
    assert!(report.passed());
    assert_eq!(warnings(&report), vec!["column SPOT_LEN is missing; usable for fasta only".to_string()]);
}

#[test]
fn test_foreign_table_schema_is_not_classified() {
    let report = run(&sequence_table("acme:tbl", &["X"]));
    assert!(report.passed());
    assert!(structural(&report).is_empty());
    assert!(!report
        .findings
        .iter()
        .any(|finding| matches!(finding.verdict, Verdict::Check(CheckVerdict::Failed { .. }))));
}
