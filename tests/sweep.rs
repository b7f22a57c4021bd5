use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{Local, TimeZone};
use folder_sweep::engine;
use folder_sweep::model::{FileOutcome, RelocationOutcome, SweepOptions, SweepRequest};
use folder_sweep::{SweepError, plan};
use rust_xlsxwriter::Workbook;
use tempfile::{TempDir, tempdir};

const MARCH_BUCKET: &str = "03 March 2024";

struct Fixture {
    _root: TempDir,
    reports: PathBuf,
    pool: PathBuf,
    archive: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = tempdir().expect("temporary directory");
        let reports = root.path().join("reports");
        let pool = root.path().join("pool");
        let archive = root.path().join("archive");
        for dir in [&reports, &pool, &archive] {
            fs::create_dir_all(dir).expect("fixture directory");
        }
        Self {
            _root: root,
            reports,
            pool,
            archive,
        }
    }

    fn request(&self) -> SweepRequest {
        SweepRequest::new(&self.reports, &self.pool, &self.archive)
    }

    /// Creates a candidate folder last modified on 2024-03-05.
    fn candidate(&self, name: &str) -> PathBuf {
        let path = self.pool.join(name);
        fs::create_dir_all(&path).expect("candidate folder");
        fs::write(path.join("order.txt"), name).expect("candidate content");
        let stamp = Local
            .with_ymd_and_hms(2024, 3, 5, 12, 0, 0)
            .single()
            .expect("unambiguous local time");
        File::open(&path)
            .expect("candidate opened")
            .set_modified(SystemTime::from(stamp))
            .expect("candidate mtime set");
        path
    }

    fn report(&self, name: &str, tokens: &[&str]) -> PathBuf {
        let path = self.reports.join(name);
        write_report(&path, tokens);
        path
    }

    fn archived(&self, name: &str) -> PathBuf {
        self.archive.join(MARCH_BUCKET).join(name)
    }
}

fn write_report(path: &Path, tokens: &[&str]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "Order").expect("header written");
    worksheet.write_string(0, 1, "Amount").expect("header written");
    for (idx, token) in tokens.iter().enumerate() {
        let row = idx as u32 + 1;
        worksheet.write_string(row, 0, *token).expect("token written");
        worksheet.write_number(row, 1, 10.0).expect("amount written");
    }
    workbook.save(path).expect("report saved");
}

#[test]
fn missing_candidate_pool_fails_before_reading_reports() {
    let fixture = Fixture::new();
    let report = fixture.report("orders.xlsx", &["Acme"]);
    let request = SweepRequest::new(
        &fixture.reports,
        fixture.pool.join("missing"),
        &fixture.archive,
    );

    let mut progress = Vec::new();
    let result = engine::spawn(request)
        .expect("worker started")
        .wait(|percent| progress.push(percent));

    assert!(matches!(result, Err(SweepError::CandidatePool { .. })));
    assert!(progress.is_empty());
    assert!(report.exists());
}

#[test]
fn empty_report_source_completes_at_full_progress() {
    let fixture = Fixture::new();
    fixture.candidate("Acme Corp");

    let mut progress = Vec::new();
    let report = engine::spawn(fixture.request())
        .expect("worker started")
        .wait(|percent| progress.push(percent))
        .expect("sweep finished");

    assert_eq!(progress, [100]);
    assert!(report.files.is_empty());
    assert_eq!(report.moved(), 0);
    assert!(fixture.pool.join("Acme Corp").exists());
}

#[test]
fn repeated_and_overlapping_tokens_relocate_each_folder_once() {
    let fixture = Fixture::new();
    fixture.candidate("Acme Corp");
    fixture.candidate("Acme Corp Annex");
    fixture.candidate("Beta LLC");
    fixture.candidate("Gamma");
    fixture.report("invoiced.xlsx", &["Acme", "Beta LLC", "Acme"]);

    let report = engine::run(&fixture.request(), |_| {}).expect("sweep finished");

    for name in ["Acme Corp", "Acme Corp Annex", "Beta LLC"] {
        assert!(!fixture.pool.join(name).exists(), "{name} left in pool");
        assert!(fixture.archived(name).join("order.txt").exists(), "{name} not archived");
    }
    assert!(fixture.pool.join("Gamma").exists());

    let relocations = report.files[0].relocations();
    let summary: Vec<(&str, &str, bool)> = relocations
        .iter()
        .map(|item| {
            (
                item.matched.token.as_str(),
                item.matched.folder_name.as_str(),
                item.is_moved(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        [
            ("Acme", "Acme Corp", true),
            ("Acme", "Acme Corp Annex", true),
            ("Beta LLC", "Beta LLC", true),
            ("Acme", "Acme Corp", false),
            ("Acme", "Acme Corp Annex", false),
        ]
    );
    assert!(
        relocations[3..]
            .iter()
            .all(|item| item.outcome == RelocationOutcome::SourceMissing)
    );
    assert_eq!(report.moved(), 3);
    assert_eq!(report.failed(), 0);
}

#[test]
fn proper_substring_relocates_only_its_folder() {
    let fixture = Fixture::new();
    fixture.candidate("10452 - Smith");
    fixture.candidate("20881 - Jones");
    fixture.report("orders.xlsx", &["10452"]);

    let report = engine::run(&fixture.request(), |_| {}).expect("sweep finished");

    assert_eq!(report.moved(), 1);
    assert!(fixture.archived("10452 - Smith").exists());
    assert!(fixture.pool.join("20881 - Jones").exists());
}

#[test]
fn numeric_cells_match_as_plain_integers() {
    let fixture = Fixture::new();
    fixture.candidate("Order 10452");
    let path = fixture.reports.join("numbers.xlsx");
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "Order").expect("header written");
    worksheet.write_number(1, 0, 10452.0).expect("number written");
    workbook.save(&path).expect("report saved");

    let report = engine::run(&fixture.request(), |_| {}).expect("sweep finished");

    assert_eq!(report.moved(), 1);
    assert!(fixture.archived("Order 10452").exists());
}

#[test]
fn collisions_in_the_archive_get_numbered_siblings() {
    let fixture = Fixture::new();
    let existing = fixture.archived("Acme Corp");
    fs::create_dir_all(&existing).expect("existing archive entry");
    fs::write(existing.join("keep.txt"), "old").expect("existing content");
    fixture.candidate("Acme Corp");
    fixture.report("orders.xlsx", &["Acme Corp"]);

    let report = engine::run(&fixture.request(), |_| {}).expect("sweep finished");

    let relocation = &report.files[0].relocations()[0];
    assert_eq!(
        relocation.outcome,
        RelocationOutcome::Moved {
            target: fixture.archived("Acme Corp (1)"),
            renamed: true,
        }
    );
    assert_eq!(
        fs::read_to_string(existing.join("keep.txt")).expect("existing content kept"),
        "old"
    );
    assert!(fixture.archived("Acme Corp (1)").join("order.txt").exists());
}

#[test]
fn corrupt_reports_are_skipped_and_later_reports_still_run() {
    let fixture = Fixture::new();
    fixture.candidate("Acme Corp");
    fixture.candidate("Beta LLC");
    fs::write(fixture.reports.join("a-broken.xlsx"), b"not a workbook").expect("corrupt report");
    fs::write(fixture.reports.join("notes.txt"), "Beta LLC").expect("ignored file");
    fixture.report("b-orders.xlsx", &["Acme"]);

    let mut progress = Vec::new();
    let report = engine::run(&fixture.request(), |percent| progress.push(percent))
        .expect("sweep finished");

    assert_eq!(progress, [50, 100]);
    assert_eq!(report.files.len(), 2);
    assert!(matches!(report.files[0].outcome, FileOutcome::Skipped { .. }));
    assert!(report.files[0].relocations().is_empty());
    assert!(matches!(
        report.files[1].outcome,
        FileOutcome::Processed { tokens: 1, .. }
    ));
    assert_eq!(report.skipped_files(), 1);
    assert!(fixture.archived("Acme Corp").exists());
    assert!(fixture.pool.join("Beta LLC").exists());
}

#[test]
fn failed_moves_do_not_stop_the_run() {
    let fixture = Fixture::new();
    fixture.candidate("Acme Corp");
    fixture.candidate("Beta LLC");
    fixture.report("a.xlsx", &["Acme"]);
    fixture.report("b.xlsx", &["Beta"]);
    let archive_file = fixture.archive.join("not-a-directory");
    fs::write(&archive_file, "blocks bucket creation").expect("archive file written");
    let request = SweepRequest::new(&fixture.reports, &fixture.pool, &archive_file);

    let mut progress = Vec::new();
    let report =
        engine::run(&request, |percent| progress.push(percent)).expect("sweep finished");

    assert_eq!(progress, [50, 100]);
    assert_eq!(report.files.len(), 2);
    for file in &report.files {
        assert!(matches!(file.outcome, FileOutcome::Processed { tokens: 1, .. }));
        let relocations = file.relocations();
        assert_eq!(relocations.len(), 1);
        assert!(matches!(
            relocations[0].outcome,
            RelocationOutcome::Failed { .. }
        ));
    }
    assert_eq!(report.failed(), 2);
    assert_eq!(report.moved(), 0);
    assert!(fixture.pool.join("Acme Corp").exists());
    assert!(fixture.pool.join("Beta LLC").exists());
}

#[test]
fn upper_case_extensions_are_read() {
    let fixture = Fixture::new();
    fixture.candidate("Acme Corp");
    fixture.report("ORDERS.XLSX", &["Acme"]);

    let report = engine::run(&fixture.request(), |_| {}).expect("sweep finished");

    assert_eq!(report.files.len(), 1);
    assert!(matches!(
        report.files[0].outcome,
        FileOutcome::Processed { tokens: 1, .. }
    ));
    assert_eq!(report.moved(), 1);
    assert!(fixture.archived("Acme Corp").exists());
}

#[test]
fn header_row_can_be_read_as_a_token() {
    let fixture = Fixture::new();
    fixture.candidate("Order Desk");
    fixture.report("orders.xlsx", &[]);

    let with_header = engine::run(&fixture.request(), |_| {}).expect("sweep finished");
    assert_eq!(with_header.moved(), 0);

    let request = fixture
        .request()
        .with_options(SweepOptions { header_row: false });
    let without_header = engine::run(&request, |_| {}).expect("sweep finished");
    assert_eq!(without_header.moved(), 1);
    assert!(fixture.archived("Order Desk").exists());
}

#[test]
fn plan_reports_targets_without_moving() {
    let fixture = Fixture::new();
    fixture.candidate("Acme Corp");
    fixture.candidate("Acme Corp Annex");
    fs::create_dir_all(fixture.archived("Acme Corp")).expect("existing archive entry");
    fixture.report("orders.xlsx", &["Acme", "Acme Corp"]);

    let planned = plan::plan(&fixture.request()).expect("plan computed");

    let targets: Vec<(&str, PathBuf)> = planned
        .iter()
        .map(|item| (item.matched.folder_name.as_str(), item.target.clone()))
        .collect();
    assert_eq!(
        targets,
        [
            ("Acme Corp", fixture.archived("Acme Corp (1)")),
            ("Acme Corp Annex", fixture.archived("Acme Corp Annex")),
        ]
    );
    assert!(fixture.pool.join("Acme Corp").exists());
    assert!(fixture.pool.join("Acme Corp Annex").exists());
}
