use std::path::{Path, PathBuf};
use std::process::ExitCode;

use scanraster::RasterBuffer;
use scanraster::output::{CancelToken, StageOutput, run_batch};
use tracing_subscriber::EnvFilter;

mod error;
mod io;
mod job;

use job::{JobFile, resolve_path};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage: scanraster <job.yaml>...");
        eprintln!("  Binarize and composite page images according to job files.");
        eprintln!("  Set RUST_LOG (e.g. RUST_LOG=info) for progress logs.");
        return if args.is_empty() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        eprintln!("scanraster {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cancel = CancelToken::new();
    let mut has_error = false;

    for job_file_arg in &args {
        let job_file_path = Path::new(job_file_arg);
        let job = match JobFile::from_file(job_file_path) {
            Ok(j) => j,
            Err(e) => {
                eprintln!("ERROR: Failed to load job file {job_file_arg}: {e}");
                has_error = true;
                continue;
            }
        };

        // Relative page paths are taken from the job file's directory.
        let job_dir = job_file_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        if !run_job(&job, &job_dir, &cancel) {
            has_error = true;
        }
    }

    if has_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Run every page of one job; returns false if any page failed.
fn run_job(job: &JobFile, job_dir: &Path, cancel: &CancelToken) -> bool {
    let mut ok = true;

    let mut loaded: Vec<(PathBuf, PathBuf)> = Vec::new();
    let mut rasters: Vec<RasterBuffer> = Vec::new();
    for page in &job.pages {
        let input_path = resolve_path(job_dir, &page.input);
        let output_path = resolve_path(job_dir, &page.output);
        match io::read_page(&input_path, page.dpi) {
            Ok(raster) => {
                rasters.push(raster);
                loaded.push((input_path, output_path));
            }
            Err(e) => {
                eprintln!("ERROR: Failed to read {}: {e}", input_path.display());
                ok = false;
            }
        }
    }

    let report = run_batch(&rasters, &job.settings, cancel);

    for failure in &report.failures {
        let (input_path, output_path) = &loaded[failure.page];
        eprintln!(
            "ERROR: {} -> {}: {}",
            input_path.display(),
            output_path.display(),
            failure.error
        );
        ok = false;
    }

    for (index, output) in &report.outputs {
        let (input_path, output_path) = &loaded[*index];
        for warning in &output.warnings {
            eprintln!("WARN: {}: {warning}", input_path.display());
        }
        if let Err(e) = write_output(output_path, output) {
            eprintln!("ERROR: Failed to write {}: {e}", output_path.display());
            ok = false;
            continue;
        }
        eprintln!(
            "OK: {} -> {} ({} specks removed)",
            input_path.display(),
            output_path.display(),
            output.despeckle.removed
        );
    }

    ok
}

/// Write the page and, in debug mode, every snapshot next to it as
/// `<stem>.<snapshot>.png`.
fn write_output(output_path: &Path, output: &StageOutput) -> error::Result<()> {
    io::write_page(output_path, &output.image)?;

    let stem = output_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    for snapshot in &output.snapshots {
        let path = output_path.with_file_name(format!("{stem}.{}.png", snapshot.name));
        io::write_page(&path, &snapshot.image)?;
    }
    Ok(())
}
