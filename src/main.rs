use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use folder_sweep::io::excel_write;
use folder_sweep::model::{SweepOptions, SweepRequest};
use folder_sweep::{Result, SweepError, engine, plan};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run(args) => execute_run(args),
        Command::Plan(args) => execute_plan(args),
    }
}

fn execute_run(args: RunArgs) -> Result<()> {
    init_tracing(args.dirs.debug)?;
    let request = args.dirs.into_request()?;

    let handle = engine::spawn(request)?;
    let report = handle.wait(|percent| {
        eprint!("\rprogress: {percent:>3}%");
        let _ = std::io::stderr().flush();
    });
    eprintln!();
    let report = report?;

    println!(
        "moved {} folder(s), {} failed, {} report(s) skipped",
        report.moved(),
        report.failed(),
        report.skipped_files()
    );

    if let Some(path) = &args.summary {
        excel_write::write_summary(path, &report)?;
        println!("summary written to {}", path.display());
    }
    Ok(())
}

fn execute_plan(args: PlanArgs) -> Result<()> {
    init_tracing(args.dirs.debug)?;
    let request = args.dirs.into_request()?;

    let planned = plan::plan(&request)?;
    for item in &planned {
        println!(
            "{} -> {}  (token \"{}\" in {})",
            item.matched.folder_path.display(),
            item.target.display(),
            item.matched.token,
            item.report.display()
        );
    }
    println!("{} folder(s) would be moved", planned.len());
    Ok(())
}

fn init_tracing(debug: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug {
            "folder_sweep=debug"
        } else {
            "folder_sweep=info"
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| SweepError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "File folders named in spreadsheet reports into a dated archive."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Relocate every candidate folder matched by a report token.
    Run(RunArgs),
    /// Show which folders a run would relocate, without moving anything.
    Plan(PlanArgs),
}

#[derive(clap::Args)]
struct Directories {
    /// Directory containing .xls/.xlsx reports.
    #[arg(long)]
    reports: PathBuf,

    /// Directory whose subfolders are move candidates.
    #[arg(long)]
    candidates: PathBuf,

    /// Directory under which matched folders are filed by month.
    #[arg(long)]
    archive: PathBuf,

    /// Read the first row of each report as a token instead of a heading.
    #[arg(long)]
    no_header: bool,

    /// Emit diagnostic output for every file, token, match and move.
    #[arg(long)]
    debug: bool,
}

#[derive(clap::Args)]
struct RunArgs {
    #[command(flatten)]
    dirs: Directories,

    /// Write a run summary (.json or .xlsx) to this path.
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(clap::Args)]
struct PlanArgs {
    #[command(flatten)]
    dirs: Directories,
}

impl Directories {
    fn into_request(self) -> Result<SweepRequest> {
        for (label, path) in [
            ("reports", &self.reports),
            ("candidates", &self.candidates),
            ("archive", &self.archive),
        ] {
            if path.as_os_str().is_empty() {
                return Err(SweepError::EmptyPath(label));
            }
        }

        let options = SweepOptions {
            header_row: !self.no_header,
        };
        Ok(SweepRequest::new(self.reports, self.candidates, self.archive).with_options(options))
    }
}
