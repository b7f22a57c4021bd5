use std::fs;
use std::path::Path;

use rust_xlsxwriter::{Format, Table, Workbook};

use crate::sweep::error::{Result, SweepError};
use crate::sweep::model::{FileOutcome, RelocationOutcome, RunReport};

const SUMMARY_COLUMNS: [&str; 6] = ["Report", "Token", "Folder", "Source", "Outcome", "Target"];

/// Writes a run report to `path`, choosing JSON or a workbook by extension.
pub fn write_summary(path: &Path, report: &RunReport) -> Result<()> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("json") => {
            fs::write(path, serde_json::to_string_pretty(report)?)?;
            Ok(())
        }
        Some("xlsx") => write_summary_workbook(path, report),
        _ => Err(SweepError::UnsupportedSummary(path.to_path_buf())),
    }
}

/// Writes one row per relocation attempt, plus one row per skipped report.
pub fn write_summary_workbook(path: &Path, report: &RunReport) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Relocations")?;

    let bold = Format::new().set_bold();
    for (col_idx, header) in SUMMARY_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, *header, &bold)?;
    }

    let mut row: u32 = 0;
    for file in &report.files {
        let report_name = file.path.display().to_string();
        match &file.outcome {
            FileOutcome::Processed { relocations, .. } => {
                for relocation in relocations {
                    row += 1;
                    let (status, target) = match &relocation.outcome {
                        RelocationOutcome::Moved { target, .. } => {
                            ("moved".to_string(), target.display().to_string())
                        }
                        RelocationOutcome::SourceMissing => {
                            ("source missing".to_string(), String::new())
                        }
                        RelocationOutcome::Failed { reason } => {
                            (format!("failed: {reason}"), String::new())
                        }
                    };
                    let cells = [
                        report_name.clone(),
                        relocation.matched.token.clone(),
                        relocation.matched.folder_name.clone(),
                        relocation.matched.folder_path.display().to_string(),
                        status,
                        target,
                    ];
                    for (col_idx, cell) in cells.iter().enumerate() {
                        worksheet.write_string(row, col_idx as u16, cell)?;
                    }
                }
            }
            FileOutcome::Skipped { reason } => {
                row += 1;
                worksheet.write_string(row, 0, &report_name)?;
                worksheet.write_string(row, 4, format!("skipped: {reason}"))?;
            }
        }
    }

    if row > 0 {
        let col_end = (SUMMARY_COLUMNS.len() as u16).saturating_sub(1);
        worksheet.add_table(0, 0, row, col_end, &Table::new().set_autofilter(true))?;
    }
    worksheet.autofit();

    workbook.save(path)?;
    Ok(())
}
