//! sqlcanon CLI - An opinionated SQL formatter

use clap::Parser;
use miette::{NamedSource, Report};
use sqlcanon::cli::{discover_files, Cli, Commands};
use sqlcanon::{BatchRunner, Error, FormatDiagnostic, Mode, Outcome, SourceUnit};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// One input with the file it came from (`None` for stdin)
struct Input {
    path: Option<PathBuf>,
    unit: SourceUnit,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    let policy = match cli.style.policy() {
        Ok(policy) => policy,
        Err(e) => {
            eprintln!("{:?}", Report::new(e));
            return ExitCode::from(2);
        }
    };
    let runner = BatchRunner::new(policy).with_jobs(cli.style.jobs);

    match cli.command {
        Commands::Fmt { check: true, files, .. } | Commands::Check { files } => run_check(&runner, &files),
        Commands::Fmt { write, files, .. } => run_fmt(&runner, &files, write),
    }
}

/// Run the fmt command
fn run_fmt(runner: &BatchRunner, files: &[PathBuf], write_mode: bool) -> ExitCode {
    let (inputs, mut had_errors) = collect_inputs(files);
    let units: Vec<SourceUnit> = inputs.iter().map(|i| i.unit.clone()).collect();

    let report = match runner.run(&units, Mode::Format) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{:?}", Report::new(e));
            return ExitCode::from(2);
        }
    };

    for (input, unit_report) in inputs.iter().zip(report.units) {
        let changed = unit_report.needs_formatting(&input.unit.bytes);
        match unit_report.result {
            Ok(Outcome::Formatted(formatted)) => {
                print_diagnostics(&input.unit.id, &formatted.diagnostics);
                match (&input.path, write_mode) {
                    (Some(path), true) => {
                        if changed {
                            if let Err(e) = fs::write(path, &formatted.text) {
                                report_error(&input.unit, Error::IoError(e));
                                had_errors = true;
                            } else {
                                log::info!("formatted {}", path.display());
                            }
                        }
                    }
                    _ => print!("{}", formatted.text),
                }
            }
            Ok(Outcome::Checked(_)) => {}
            Err(e) => {
                // The file is left untouched
                report_error(&input.unit, e);
                had_errors = true;
            }
        }
    }

    if had_errors {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}

/// Run the check command
fn run_check(runner: &BatchRunner, files: &[PathBuf]) -> ExitCode {
    let (inputs, mut had_errors) = collect_inputs(files);
    let units: Vec<SourceUnit> = inputs.iter().map(|i| i.unit.clone()).collect();

    let report = match runner.run(&units, Mode::Check) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{:?}", Report::new(e));
            return ExitCode::from(2);
        }
    };

    let mut needs_formatting = false;
    for (input, unit_report) in inputs.iter().zip(report.units) {
        match unit_report.result {
            Ok(Outcome::Checked(outcome)) => {
                print_diagnostics(&input.unit.id, &outcome.diagnostics);
                if !outcome.is_canonical {
                    eprintln!("{}: needs formatting", input.unit.id);
                    if let Some(diff) = &outcome.diff {
                        print!("{}", diff);
                    }
                    needs_formatting = true;
                }
            }
            Ok(Outcome::Formatted(_)) => {}
            Err(e) => {
                report_error(&input.unit, e);
                had_errors = true;
            }
        }
    }

    if had_errors {
        ExitCode::from(2)
    } else if needs_formatting {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

/// Read every input named on the command line
fn collect_inputs(files: &[PathBuf]) -> (Vec<Input>, bool) {
    let mut inputs = Vec::new();
    let mut had_errors = false;

    for file_path in files {
        // Handle stdin
        if file_path == Path::new("-") {
            let mut bytes = Vec::new();
            match io::stdin().read_to_end(&mut bytes) {
                Ok(_) => inputs.push(Input {
                    path: None,
                    unit: SourceUnit::new("<stdin>", bytes),
                }),
                Err(e) => {
                    eprintln!("<stdin>: {}", e);
                    had_errors = true;
                }
            }
            continue;
        }

        let found = discover_files(file_path);
        if found.is_empty() {
            eprintln!("{}: no SQL files found", file_path.display());
            had_errors = true;
        }
        for path in found {
            match fs::read(&path) {
                Ok(bytes) => inputs.push(Input {
                    unit: SourceUnit::new(path.display().to_string(), bytes),
                    path: Some(path),
                }),
                Err(e) => {
                    eprintln!("{}: {}", path.display(), e);
                    had_errors = true;
                }
            }
        }
    }

    (inputs, had_errors)
}

fn print_diagnostics(id: &str, diagnostics: &[FormatDiagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{}:{}", id, diagnostic);
    }
}

/// Print an error as a miette report pointing into the source
fn report_error(unit: &SourceUnit, error: Error) {
    let source = String::from_utf8_lossy(&unit.bytes).into_owned();
    let report = Report::new(error).with_source_code(NamedSource::new(&unit.id, source));
    eprintln!("{:?}", report);
}
