//! Container Validation Tests
//!
//! Tests for on-disk containers:
//! - Directory, bare-manifest and tar-archive layouts open identically
//! - Damaged blobs and component digests are never ignored
//! - Strictness switches only ever add checks
//! - The CLI exits nonzero iff some object fails

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use dbcheck::cli::{run_command, validate, Command, ValidateArgs, YesNo};
use dbcheck::container::{
    open, ColumnManifest, IndexManifest, Manifest, TableManifest, MANIFEST_FILE_NAME,
};
use dbcheck::report::{CheckVerdict, MemorySink, Status, ValidationReport, Verdict};
use dbcheck::validate::{ValidateConfig, Validator};
use tar::{Builder, Header};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn sealed_table() -> TableManifest {
    let column = |name: &str, rows: Vec<Option<Vec<i64>>>| {
        ColumnManifest::new(name, 1, rows).with_digests().unwrap()
    };
    TableManifest {
        name: "SRR000003".to_string(),
        schema: "NCBI:SRA:Illumina:tbl:v2#1.0.4".to_string(),
        columns: vec![
            column("READ", vec![Some(vec![1, 2, 3]), Some(vec![4])]),
            column("QUALITY", vec![Some(vec![30, 31, 32]), Some(vec![33])]),
            column("SPOT_LEN", vec![Some(vec![3]), Some(vec![1])]),
        ],
        indices: vec![IndexManifest {
            name: "skey".to_string(),
            entries: vec!["spot.1".to_string(), "spot.2".to_string()],
            sha256: None,
        }
        .with_digest()],
        extra: Vec::new(),
    }
}

fn manifest_text(table: TableManifest) -> String {
    Manifest::Table(table).to_json_pretty().unwrap()
}

fn write_dir(root: &Path, name: &str, table: TableManifest) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(MANIFEST_FILE_NAME), manifest_text(table)).unwrap();
    dir
}

fn write_file(root: &Path, name: &str, table: TableManifest) -> PathBuf {
    let path = root.join(name);
    fs::write(&path, manifest_text(table)).unwrap();
    path
}

fn write_archive(root: &Path, name: &str, table: TableManifest) -> PathBuf {
    let path = root.join(name);
    let text = manifest_text(table);
    let mut builder = Builder::new(File::create(&path).unwrap());
    let mut header = Header::new_gnu();
    header.set_size(text.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, format!("{}/{}", name, MANIFEST_FILE_NAME), text.as_bytes())
        .unwrap();
    builder.finish().unwrap();
    path
}

fn check(config: &ValidateConfig, path: &Path) -> ValidationReport {
    let container = open(path).unwrap();
    let mut sink = MemorySink::new();
    Validator::new(config)
        .validate(path, &container, &mut sink)
        .unwrap()
}

fn quiet_args(paths: Vec<PathBuf>) -> ValidateArgs {
    ValidateArgs {
        paths,
        log_level: Some("fatal".to_string()),
        ..ValidateArgs::default()
    }
}

// =============================================================================
// Layouts
// =============================================================================

#[test]
fn test_all_layouts_validate_the_same() {
    let temp = TempDir::new().unwrap();
    let paths = [
        write_dir(temp.path(), "dir", sealed_table()),
        write_file(temp.path(), "bare.json", sealed_table()),
        write_archive(temp.path(), "packed.tar", sealed_table()),
    ];

    for path in &paths {
        let report = check(&ValidateConfig::default(), path);
        assert!(report.passed(), "{}: {:?}", path.display(), report.findings);
        assert_eq!(report.columns_checked, 3);
        assert_eq!(report.name, "SRR000003");
        assert_eq!(report.warnings, 0);
    }
}

// =============================================================================
// Physical damage
// =============================================================================

#[test]
fn test_blob_crc_mismatch_fails_column() {
    let temp = TempDir::new().unwrap();
    let mut table = sealed_table();
    // data changed after sealing: both digests are stale
    table.columns[1].rows[0] = Some(vec![30, 31, 99]);
    let path = write_file(temp.path(), "damaged.json", table);

    let report = check(&ValidateConfig::default(), &path);
    assert_eq!(report.status, Status::Failed);

    let failures: Vec<_> = report.failures().collect();
    assert!(failures.iter().any(|finding| finding.name == "QUALITY"
        && matches!(&finding.verdict, Verdict::Check(CheckVerdict::Failed { code, .. }) if code == "CHECK_CRC_MISMATCH")));
    assert!(failures.iter().any(|finding| matches!(
        &finding.verdict,
        Verdict::Check(CheckVerdict::ChecksumMismatch { file }) if file == "col/QUALITY/data"
    )));
    assert_eq!(report.columns_checked, 2);
}

#[test]
fn test_blob_crc_can_be_switched_off() {
    let temp = TempDir::new().unwrap();
    let mut table = sealed_table();
    table.columns[0].crc32 = Some("crc32:00000000".to_string());
    let path = write_file(temp.path(), "crc.json", table);

    let strict = check(&ValidateConfig::default(), &path);
    assert!(!strict.passed());

    let lenient = ValidateConfig {
        blob_crc: false,
        ..ValidateConfig::default()
    };
    assert!(check(&lenient, &path).passed());
}

#[test]
fn test_index_digest_checked_only_when_asked() {
    let temp = TempDir::new().unwrap();
    let mut table = sealed_table();
    table.indices[0].entries.push("spot.3".to_string());
    let path = write_file(temp.path(), "index.json", table);

    assert!(check(&ValidateConfig::default(), &path).passed());

    let with_index = ValidateConfig {
        index_check: true,
        ..ValidateConfig::default()
    };
    assert!(!check(&with_index, &path).passed());

    let index_only = ValidateConfig {
        index_only: true,
        ..ValidateConfig::default()
    };
    let report = check(&index_only, &path);
    assert!(!report.passed());
    assert_eq!(report.columns_checked, 0);
}

#[test]
fn test_missing_checksums_fail_only_when_required() {
    let temp = TempDir::new().unwrap();
    let mut table = sealed_table();
    for column in &mut table.columns {
        column.sha256 = None;
    }
    let path = write_file(temp.path(), "unsummed.json", table);

    assert!(check(&ValidateConfig::default(), &path).passed());

    let strict = ValidateConfig {
        checksums_required: true,
        ..ValidateConfig::default()
    };
    let report = check(&strict, &path);
    assert_eq!(report.status, Status::Failed);
    assert!(report.failures().any(|finding| finding.verdict.to_string().contains("missing checksum file")));
}

#[test]
fn test_stray_component_warns() {
    let temp = TempDir::new().unwrap();
    let mut table = sealed_table();
    table.extra.push("core.1234".to_string());
    let path = write_dir(temp.path(), "stray", table);

    let report = check(&ValidateConfig::default(), &path);
    assert!(report.passed());
    assert_eq!(report.warnings, 1);
    assert!(report.findings[0].verdict.to_string().contains("core.1234"));
}

// =============================================================================
// CLI
// =============================================================================

#[test]
fn test_directory_search_validates_every_container() {
    let temp = TempDir::new().unwrap();
    write_dir(temp.path(), "a", sealed_table());
    write_archive(temp.path(), "b.tar", sealed_table());
    fs::create_dir_all(temp.path().join("deeper")).unwrap();
    write_file(&temp.path().join("deeper"), "c.json", sealed_table());

    let summary = validate(&quiet_args(vec![temp.path().to_path_buf()])).unwrap();
    assert_eq!(summary.reports.len(), 3);
    assert!(summary.passed());
}

#[test]
fn test_exit_status_follows_aggregate() {
    let temp = TempDir::new().unwrap();
    let good = write_file(temp.path(), "good.json", sealed_table());
    assert!(run_command(Command::Validate(quiet_args(vec![good.clone()]))).is_ok());

    let mut table = sealed_table();
    table.columns.retain(|column| column.name != "QUALITY");
    let incomplete = write_file(temp.path(), "incomplete.json", table);
    let err = run_command(Command::Validate(quiet_args(vec![good, incomplete]))).unwrap_err();
    assert_eq!(err.code_str(), "DBCHECK_CLI_VALIDATION_FAILED");
    assert!(err.message().contains("1 of 2"));
}

#[test]
fn test_cli_switches_reach_the_run() {
    let temp = TempDir::new().unwrap();
    let mut table = sealed_table();
    table.columns[0].crc32 = Some("crc32:00000000".to_string());
    let path = write_file(temp.path(), "crc.json", table);

    let summary = validate(&quiet_args(vec![path.clone()])).unwrap();
    assert!(!summary.passed());

    let mut args = quiet_args(vec![path]);
    args.blob_crc = Some(YesNo::No);
    assert!(validate(&args).unwrap().passed());
}
