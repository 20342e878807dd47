//! pdfoutline CLI - PDF heading outlines and persona ranking

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfoutline::render::to_json;
use pdfoutline::{
    BatchProcessor, Directories, DocumentOutcome, ExtractOptions, JsonFormat, OutlineExtractor,
    PersonaSources,
};

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(author = "iyulab")]
#[command(version)]
#[command(
    about = "Extract PDF heading outlines and rank them for a persona",
    long_about = "Reads every PDF in /app/input (or ./input), writes one outline JSON per \
                  document to /app/output (or ./output) and a combined persona_analysis.json.\n\n\
                  Persona and job come from input/persona_config.json, then the PERSONA and \
                  JOB_TO_BE_DONE environment variables, then the positional arguments."
)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Persona describing the intended reader
    #[arg(value_name = "PERSONA")]
    persona: Option<String>,

    /// Job to be done by the persona
    #[arg(value_name = "JOB")]
    job: Option<String>,

    /// Skip pages whose content cannot be decoded instead of failing the document
    #[arg(long)]
    lenient: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the outline of a single PDF
    Outline {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Skip pages whose content cannot be decoded
        #[arg(long)]
        lenient: bool,
    },

    /// Show version information
    Version,
}

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Outline {
            input,
            output,
            compact,
            lenient,
        }) => cmd_outline(&input, output.as_deref(), compact, lenient),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => cmd_run(cli.persona, cli.job, cli.lenient),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn extract_options(lenient: bool) -> ExtractOptions {
    if lenient {
        ExtractOptions::new().lenient()
    } else {
        ExtractOptions::new()
    }
}

fn cmd_run(
    persona: Option<String>,
    job: Option<String>,
    lenient: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "Starting PDF processing...".cyan());

    let dirs = Directories::detect();
    log::debug!(
        "Input {}, output {}",
        dirs.input.display(),
        dirs.output.display()
    );

    let args: Vec<String> = persona.into_iter().chain(job).collect();
    let config = PersonaSources::from_process_env(&dirs, args).resolve();
    println!("{} {}", "Using persona:".bold(), config.persona);
    println!("{} {}", "Job to be done:".bold(), config.job);

    let processor = BatchProcessor::new(dirs)
        .with_extractor(OutlineExtractor::new(extract_options(lenient)));

    let total = processor.pdf_files().map(|files| files.len()).unwrap_or(0);
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = processor.run(&config, |path, outcome| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        match outcome {
            DocumentOutcome::Extracted(outline) => pb.println(format!(
                "  {} {} ({} headings)",
                "Generated".green(),
                name,
                outline.headings.len()
            )),
            DocumentOutcome::Failed(e) => {
                pb.println(format!("  {} {}: {}", "Failed".red(), name, e))
            }
        }
        pb.set_message(name);
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    if report.input_missing {
        println!(
            "{} {}",
            "Input directory not found:".yellow(),
            processor.directories().input.display()
        );
    }

    println!("\n{}", "Summary:".green().bold());
    println!(
        "  {} {} documents ({} failed)",
        "├─".dimmed(),
        report.processed,
        report.failed
    );
    println!(
        "  {} {} ranked sections",
        "├─".dimmed(),
        report.ranked_sections
    );
    if let Some(path) = &report.analysis_path {
        println!("  {} {}", "└─".dimmed(), path.display());
    }

    println!("{}", "Processing complete!".green().bold());
    Ok(())
}

fn cmd_outline(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    lenient: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let outline = OutlineExtractor::new(extract_options(lenient)).extract_file(input)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = to_json(&outline, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_version() {
    println!(
        "{} {}",
        "pdfoutline".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("PDF heading outlines with persona-driven ranking");
    println!();
    println!("License: MIT");
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
    fn test_positional_persona_and_job() {
        let cli = Cli::try_parse_from(["pdfoutline", "Travel Planner", "Plan a trip"]).unwrap();
        assert_eq!(cli.persona.as_deref(), Some("Travel Planner"));
        assert_eq!(cli.job.as_deref(), Some("Plan a trip"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_outline_subcommand() {
        let cli =
            Cli::try_parse_from(["pdfoutline", "outline", "doc.pdf", "--compact"]).unwrap();
        match cli.command {
            Some(Commands::Outline {
                input, compact, ..
            }) => {
                assert_eq!(input, PathBuf::from("doc.pdf"));
                assert!(compact);
            }
            _ => panic!("expected outline subcommand"),
        }
    }

    #[test]
    fn test_default_log_filter_shows_progress() {
        assert_eq!(DEFAULT_LOG_FILTER, "info");
    }

    #[test]
    fn test_no_arguments() {
        let cli = Cli::try_parse_from(["pdfoutline"]).unwrap();
        assert!(cli.persona.is_none());
        assert!(!cli.lenient);
    }
}
