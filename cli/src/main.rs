//! voterroll CLI - electoral roll PDF to spreadsheet extraction

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use voterroll::{ExtractConfig, ExtractEvent, ExtractionResult, ExtractionWorker, IssueKind};

/// Exit code when every input was extracted.
const EXIT_OK: i32 = 0;
/// Exit code when at least one input failed or the run was cancelled.
const EXIT_FAILED: i32 = 1;
/// Exit code for usage errors and failed preconditions.
const EXIT_USAGE: i32 = 2;

#[derive(Parser)]
#[command(name = "voterroll")]
#[command(version)]
#[command(about = "Extract voter records from electoral-roll PDFs into spreadsheets", long_about = None)]
struct Cli {
    /// Input PDF file or directory (repeatable)
    #[arg(short, long = "input", value_name = "PATH", required_unless_present = "gui")]
    inputs: Vec<PathBuf>,

    /// Output directory for the spreadsheets
    #[arg(short, long, value_name = "DIR", required_unless_present = "gui")]
    output: Option<PathBuf>,

    /// Launch the desktop front end
    #[arg(long)]
    gui: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Write log output to a file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE", env = "VOTERROLL_CONFIG")]
    config: Option<PathBuf>,

    /// Only process PDFs directly inside input directories
    #[arg(long)]
    no_recursive: bool,

    /// Write the per-file results as JSON
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(EXIT_USAGE);
    }

    if cli.gui {
        eprintln!(
            "{}",
            "The desktop front end is not bundled with this build; use --input and --output."
                .yellow()
        );
        std::process::exit(EXIT_USAGE);
    }

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            EXIT_USAGE
        }
    };
    std::process::exit(code);
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let default_level = if verbose { "debug" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));

    if let Some(path) = log_file {
        let file = File::create(path)
            .map_err(|e| format!("cannot open log file {}: {}", path.display(), e))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

fn load_config(cli: &Cli) -> voterroll::Result<ExtractConfig> {
    let config = match &cli.config {
        Some(path) => ExtractConfig::from_file(path)?,
        None => ExtractConfig::default(),
    };
    Ok(if cli.no_recursive {
        config.recursive(false)
    } else {
        config
    })
}

fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_config(&cli)?;
    let output = cli.output.clone().ok_or("an output directory is required")?;

    let worker = ExtractionWorker::spawn(cli.inputs.clone(), output, config)?;

    let cancel = worker.cancel_handle();
    if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
        log::warn!("cannot install Ctrl-C handler: {}", e);
    }

    let mut display = ProgressDisplay::new(!cli.no_progress);
    for event in worker.events().iter() {
        display.on_event(event);
    }

    let results = worker.join()?;
    print_summary(&results);

    if let Some(path) = &cli.summary {
        let json = serde_json::to_string_pretty(&results)?;
        fs::write(path, json)?;
        println!("{} {}", "Summary saved to".green(), path.display());
    }

    if display.cancelled || results.iter().any(|r| !r.is_success()) {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_OK)
    }
}

/// Renders worker events as a progress bar.
struct ProgressDisplay {
    show_progress: bool,
    progress_bar: Option<ProgressBar>,
    cancelled: bool,
}

impl ProgressDisplay {
    fn new(show_progress: bool) -> Self {
        Self {
            show_progress,
            progress_bar: None,
            cancelled: false,
        }
    }

    fn on_event(&mut self, event: ExtractEvent) {
        match event {
            ExtractEvent::Started { total } => {
                if self.show_progress {
                    let pb = ProgressBar::new(total as u64);
                    if let Ok(style) = ProgressStyle::default_bar()
                        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    {
                        pb.set_style(style.progress_chars("#>-"));
                    }
                    self.progress_bar = Some(pb);
                }
            }
            ExtractEvent::FileStarted { path, .. } => {
                if let Some(pb) = &self.progress_bar {
                    pb.set_message(display_name(&path));
                }
            }
            ExtractEvent::FileCompleted {
                processed, result, ..
            } => {
                if let Some(pb) = &self.progress_bar {
                    pb.set_position(processed as u64);
                    if let Some(error) = &result.error {
                        pb.println(format!(
                            "{} {}: {}",
                            "✗".red(),
                            display_name(&result.source),
                            error
                        ));
                    }
                }
            }
            ExtractEvent::Cancelled { processed, total } => {
                self.cancelled = true;
                self.finish("Cancelled");
                eprintln!(
                    "{}",
                    format!("Extraction cancelled after {} of {} file(s).", processed, total)
                        .yellow()
                );
            }
            ExtractEvent::Completed { .. } => {
                self.finish("Done!");
            }
        }
    }

    fn finish(&mut self, message: &'static str) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_with_message(message);
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_summary(results: &[ExtractionResult]) {
    if results.is_empty() {
        return;
    }

    println!("\n{}", "Results:".green().bold());
    for (i, result) in results.iter().enumerate() {
        let branch = if i + 1 == results.len() { "└─" } else { "├─" };
        let name = display_name(&result.source);

        match (&result.output, &result.error) {
            (Some(output), None) => println!(
                "  {} {} {} {} ({} records, {} row errors, {} warnings)",
                branch.dimmed(),
                "✓".green(),
                name,
                format!("→ {}", output.display()).dimmed(),
                result.records,
                result.failures,
                result.count(IssueKind::ValidationWarning)
            ),
            (_, error) => println!(
                "  {} {} {}: {}",
                branch.dimmed(),
                "✗".red(),
                name,
                error.as_deref().unwrap_or("failed").red()
            ),
        }
    }

    let succeeded = results.iter().filter(|r| r.is_success()).count();
    let records: usize = results.iter().map(|r| r.records).sum();
    println!(
        "\n{} of {} file(s) extracted, {} records written",
        succeeded,
        results.len(),
        records
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_repeatable_inputs() {
        let cli = Cli::try_parse_from([
            "voterroll", "-i", "a.pdf", "--input", "rolls", "-o", "out", "--no-recursive",
        ])
        .unwrap();
        assert_eq!(cli.inputs, vec![PathBuf::from("a.pdf"), PathBuf::from("rolls")]);
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert!(cli.no_recursive);
        assert!(!load_config(&cli).unwrap().recursive);
    }

    #[test]
    fn test_inputs_required_without_gui() {
        assert!(Cli::try_parse_from(["voterroll", "-o", "out"]).is_err());
        assert!(Cli::try_parse_from(["voterroll", "--gui"]).is_ok());
    }

    #[test]
    fn test_bad_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let cli = Cli::try_parse_from([
            "voterroll",
            "-i",
            "a.pdf",
            "-o",
            "out",
            "--config",
            path.to_str().unwrap(),
        ])
        .unwrap();
        assert!(load_config(&cli).is_err());
    }
}
