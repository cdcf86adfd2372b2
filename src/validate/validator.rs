//! One validation run over one top-level database or table
//!
//! # Phases
//!
//! 1. Census: enumerate-only pre-pass sizing the tree storage
//! 2. Visitation: the container walks itself, the tree is rebuilt and the
//!    container's own physical verdicts are relayed
//! 3. Structure: the rebuilt tree is classified by schema family
//! 4. Integrity: alignment databases get their relationships checked
//!
//! Phases 3 and 4 are skipped only when `fail_fast` is set and the run has
//! already failed.

use std::ops::ControlFlow;
use std::path::Path;

use uuid::Uuid;

use super::config::ValidateConfig;
use super::errors::{ValidateError, ValidateResult};
use super::stop::StopFlag;
use crate::container::Container;
use crate::integrity::IntegrityOrchestrator;
use crate::observability::{log_event_with_fields, Event};
use crate::report::{CheckVerdict, Finding, ReportSink, ValidationReport, Verdict};
use crate::structure::{SchemaFamily, StructuralClassifier};
use crate::tree::{VisitTree, VisitTreeBuilder};
use crate::visit::{
    ObjectKind, VisitOptions, VisitReport, VisitSink, VisitSource, MISSING_CHECKSUMS,
    UNEXPECTED_OBJECT_PREFIX,
};

/// Message reported when a walk checked no column at all
pub const NOTHING_TO_VALIDATE: &str = "nothing to validate";

/// Validates containers under one frozen configuration
pub struct Validator<'a> {
    config: &'a ValidateConfig,
    stop: StopFlag,
    run_id: String,
}

impl<'a> Validator<'a> {
    /// Creates a validator with a fresh run id
    pub fn new(config: &'a ValidateConfig) -> Self {
        Self {
            config,
            stop: StopFlag::new(),
            run_id: Uuid::new_v4().to_string(),
        }
    }

    /// Shares a stop flag with the caller
    pub fn with_stop_flag(mut self, stop: StopFlag) -> Self {
        self.stop = stop;
        self
    }

    /// Overrides the run id
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    /// Identifier attached to every log line and report of this run
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Validates one opened container
    pub fn validate<C>(
        &self,
        path: &Path,
        container: &C,
        sink: &mut dyn ReportSink,
    ) -> ValidateResult<ValidationReport>
    where
        C: Container + ?Sized,
    {
        let path_text = path.display().to_string();
        log_event_with_fields(
            Event::ValidateBegin,
            &[
                ("kind", container.kind().as_str()),
                ("object", container.name()),
                ("path", path_text.as_str()),
                ("run_id", self.run_id.as_str()),
            ],
        );

        let mut recorder = Recorder {
            report: ValidationReport::new(
                self.run_id.as_str(),
                path_text,
                container.kind(),
                container.name(),
            ),
            sink,
        };

        let census = container.census()?;
        let mut walk = TreeSink {
            builder: VisitTreeBuilder::with_capacity(census),
            recorder: &mut recorder,
            config: self.config,
            stop: &self.stop,
            failed: false,
        };
        container.visit(self.config.visit_options(), &mut walk)?;
        let TreeSink {
            builder, failed, ..
        } = walk;

        if failed && self.config.fail_fast {
            return Ok(self.finish(recorder));
        }

        let tree = builder.finish()?;
        if tree.len() != census.objects {
            return Err(ValidateError::contract_violation(format!(
                "census counted {} objects but the walk visited {}",
                census.objects,
                tree.len()
            )));
        }
        let root = tree.root();
        if tree.kind(root) != container.kind() {
            return Err(ValidateError::contract_violation(format!(
                "walk started at a {} but the container is a {}",
                tree.kind(root),
                container.kind()
            )));
        }
        let objects = tree.len().to_string();
        log_event_with_fields(
            Event::TreeBuilt,
            &[("objects", objects.as_str()), ("run_id", self.run_id.as_str())],
        );

        if recorder.report.columns_checked == 0 && !self.config.index_only {
            recorder.record(
                container.kind(),
                container.name(),
                Verdict::Check(CheckVerdict::Warning {
                    message: NOTHING_TO_VALIDATE.to_string(),
                }),
            );
        }

        match container.kind() {
            ObjectKind::Database => self.check_database(container, &tree, &mut recorder)?,
            ObjectKind::Table => check_table(container, &tree, &mut recorder),
            ObjectKind::Column | ObjectKind::Index => {}
        }

        Ok(self.finish(recorder))
    }

    /// Walks a container at metadata level and returns its rebuilt tree
    pub fn build_tree<S>(&self, source: &S) -> ValidateResult<VisitTree>
    where
        S: VisitSource + ?Sized,
    {
        let census = source.census()?;
        let mut walk = StructureOnly {
            builder: VisitTreeBuilder::with_capacity(census),
            stop: &self.stop,
        };
        let options = VisitOptions {
            level: crate::visit::CheckLevel::Metadata,
            index_only: false,
        };
        source.visit(options, &mut walk)?;
        Ok(walk.builder.finish()?)
    }

    fn check_database<C>(
        &self,
        container: &C,
        tree: &VisitTree,
        recorder: &mut Recorder<'_>,
    ) -> ValidateResult<()>
    where
        C: Container + ?Sized,
    {
        let name = container.name();
        let family = SchemaFamily::of_database(container.schema_name());

        match &family {
            SchemaFamily::Alignment => {}
            SchemaFamily::Other(_) => {
                recorder.record(
                    ObjectKind::Database,
                    name,
                    Verdict::Check(CheckVerdict::Warning {
                        message: format!("has {}", family),
                    }),
                );
                return Ok(());
            }
            _ => {
                recorder.record(
                    ObjectKind::Database,
                    name,
                    Verdict::Check(CheckVerdict::Checked {
                        message: Some(format!("{} database; no family-specific checks", family)),
                    }),
                );
                return Ok(());
            }
        }

        let classification = StructuralClassifier::classify_alignment(tree);
        for object in &classification.unexpected {
            recorder.record(object.kind, &object.name, Verdict::Structural(object.verdict()));
        }
        if classification.unaligned_only {
            recorder.record(
                ObjectKind::Database,
                name,
                Verdict::Check(CheckVerdict::Checked {
                    message: Some("contains only unaligned reads".to_string()),
                }),
            );
        }
        recorder.record(
            ObjectKind::Database,
            name,
            Verdict::Structural(classification.verdict.clone()),
        );
        let present: Vec<&str> = classification.present.iter().map(|set| set.name()).collect();
        let present_text = present.join(",");
        log_event_with_fields(
            Event::StructureClassified,
            &[
                ("present", present_text.as_str()),
                ("run_id", self.run_id.as_str()),
                ("status", classification.verdict.status().as_str()),
            ],
        );

        if !self.config.referential_integrity {
            return Ok(());
        }
        if self.config.fail_fast && !recorder.report.passed() {
            return Ok(());
        }

        let outcomes = IntegrityOrchestrator::new(self.config, &self.stop, &self.run_id)
            .run(container, classification.present)?;
        for outcome in &outcomes {
            recorder.record(
                ObjectKind::Database,
                &outcome.label(),
                Verdict::Integrity(outcome.verdict.clone()),
            );
        }
        recorder.report.relationships = outcomes;
        Ok(())
    }

    fn finish(&self, recorder: Recorder<'_>) -> ValidationReport {
        let report = recorder.report;
        let warnings = report.warnings.to_string();
        let fields = [
            ("object", report.name.as_str()),
            ("run_id", self.run_id.as_str()),
            ("status", report.status.as_str()),
            ("warnings", warnings.as_str()),
        ];
        let event = if report.passed() {
            Event::ValidateComplete
        } else {
            Event::ValidateFailed
        };
        log_event_with_fields(event, &fields);
        report
    }
}

fn check_table<C>(container: &C, tree: &VisitTree, recorder: &mut Recorder<'_>)
where
    C: Container + ?Sized,
{
    if SchemaFamily::of_table(container.schema_name()) != SchemaFamily::Sequence {
        return;
    }

    let name = container.name();
    let classification = StructuralClassifier::classify_sequence_table(tree);
    for column in &classification.missing_optional {
        recorder.record(
            ObjectKind::Table,
            name,
            Verdict::Check(CheckVerdict::Warning {
                message: format!("column {} is missing; usable for fasta only", column),
            }),
        );
    }
    recorder.record(
        ObjectKind::Table,
        name,
        Verdict::Structural(classification.verdict),
    );
}

/// Sends each verdict to the sink and folds it into the report
struct Recorder<'s> {
    report: ValidationReport,
    sink: &'s mut dyn ReportSink,
}

impl Recorder<'_> {
    fn record(&mut self, kind: ObjectKind, name: &str, verdict: Verdict) {
        self.sink.report(kind, name, &verdict);
        self.report.record(Finding::new(kind, name, verdict));
    }
}

/// Visitation sink used by `validate`
struct TreeSink<'r, 's, 'c> {
    builder: VisitTreeBuilder,
    recorder: &'r mut Recorder<'s>,
    config: &'c ValidateConfig,
    stop: &'c StopFlag,
    failed: bool,
}

impl TreeSink<'_, '_, '_> {
    fn done(
        &mut self,
        kind: ObjectKind,
        object: &str,
        failure: Option<crate::visit::FailureCode>,
        message: Option<String>,
    ) {
        let verdict = match (failure, message) {
            (Some(code), message) => CheckVerdict::Failed {
                code: code.code().to_string(),
                message: message.unwrap_or_else(|| format!("{} is damaged", kind.label())),
            },
            (None, Some(message)) if message == MISSING_CHECKSUMS => {
                if self.config.checksums_required {
                    CheckVerdict::Failed {
                        code: crate::visit::FailureCode::Missing.code().to_string(),
                        message,
                    }
                } else {
                    CheckVerdict::Checked {
                        message: Some(message),
                    }
                }
            }
            (None, Some(message)) if message.starts_with(UNEXPECTED_OBJECT_PREFIX) => {
                CheckVerdict::Warning { message }
            }
            (None, message) => CheckVerdict::Checked { message },
        };

        let status = verdict.status();
        if !status.passed() {
            self.failed = true;
        } else if kind == ObjectKind::Column {
            self.recorder.report.columns_checked += 1;
        }
        self.recorder.record(kind, object, Verdict::Check(verdict));
    }
}

impl VisitSink for TreeSink<'_, '_, '_> {
    fn report(&mut self, report: VisitReport) -> ValidateResult<ControlFlow<()>> {
        if self.stop.is_stopped() {
            return Err(ValidateError::interrupted("stopped during visitation"));
        }

        match report {
            VisitReport::Visit(event) => {
                self.builder.push(&event)?;
            }
            VisitReport::Checksum {
                kind,
                object,
                file,
                passed,
            } => {
                if !passed {
                    self.failed = true;
                    self.recorder.record(
                        kind,
                        &object,
                        Verdict::Check(CheckVerdict::ChecksumMismatch { file }),
                    );
                }
            }
            VisitReport::Done {
                kind,
                object,
                failure,
                message,
            } => self.done(kind, &object, failure, message),
        }

        if self.failed && self.config.fail_fast {
            Ok(ControlFlow::Break(()))
        } else {
            Ok(ControlFlow::Continue(()))
        }
    }
}

/// Visitation sink used by `build_tree`; ignores everything but structure
struct StructureOnly<'c> {
    builder: VisitTreeBuilder,
    stop: &'c StopFlag,
}

impl VisitSink for StructureOnly<'_> {
    fn report(&mut self, report: VisitReport) -> ValidateResult<ControlFlow<()>> {
        if self.stop.is_stopped() {
            return Err(ValidateError::interrupted("stopped during visitation"));
        }
        if let VisitReport::Visit(event) = report {
            self.builder.push(&event)?;
        }
        Ok(ControlFlow::Continue(()))
    }
}
