use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::Level;

use contact_merge::{
    dedupe_union, load_raw_text, load_table, load_tables, parse_quoted_pairs,
    parse_semicolon_list, subtract_asymmetric_with, subtract_symmetric, write_records,
    ContactError, EmailMatch, Layout, PipelineConfig, RecordRepairer,
};

#[derive(Parser)]
#[command(name = "contact-merge")]
#[command(about = "Clean, merge and subtract contact-list CSV exports")]
#[command(version)]
struct Cli {
    /// Log per-row decisions
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Pipeline configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print statistics as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge files, keeping the first record per email
    Combine {
        files: Vec<PathBuf>,

        #[arg(short, long)]
        output: PathBuf,

        /// Inputs are header-less three-column files
        #[arg(long)]
        positional: bool,
    },

    /// Remove rows of BASE whose email appears in EXCLUDE (header-less files)
    Subtract {
        base: PathBuf,
        exclude: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Remove every row whose email appears more than once across all files
    SubtractAll {
        files: Vec<PathBuf>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Convert pasted text to CSV ("-" reads stdin)
    TextToCsv {
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, value_enum, default_value = "quoted")]
        format: TextFormat,
    },

    /// Clean names and emails, dropping unusable rows
    Repair {
        file: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TextFormat {
    /// Name <email>; Name <email>
    Semicolon,
    /// "Name" <email>
    Quoted,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    match &cli.command {
        Commands::Combine {
            files,
            output,
            positional,
        } => run_combine(files, output, *positional, cli.json),
        Commands::Subtract {
            base,
            exclude,
            output,
        } => run_subtract(base, exclude, output, &config, cli.json),
        Commands::SubtractAll { files, output } => run_subtract_all(files, output, cli.json),
        Commands::TextToCsv {
            input,
            output,
            format,
        } => run_text_to_csv(input, output, *format, cli.json),
        Commands::Repair { file, output } => run_repair(file, output, &config, cli.json),
    }
}

fn run_combine(files: &[PathBuf], output: &Path, positional: bool, json: bool) -> Result<()> {
    let layout = if positional {
        Layout::Positional
    } else {
        Layout::Named
    };
    let tables = load_tables(files, layout)?;
    let result = dedupe_union(&tables)?;

    write_records(&result.surviving_records, output, !positional)
        .context("Combined result was computed but could not be saved")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("✓ Files processed: {}", files.len());
        println!("✓ Total rows: {}", result.initial_count);
        println!("✓ Duplicates removed: {}", result.removed_count);
        for email in &result.removed_emails {
            println!("   - {}", email);
        }
    }
    Ok(())
}

fn run_subtract(
    base: &Path,
    exclude: &Path,
    output: &Path,
    config: &PipelineConfig,
    json: bool,
) -> Result<()> {
    let base_table = load_table(base, Layout::Positional)?;
    let exclude_table = load_table(exclude, Layout::Positional)?;
    let policy = EmailMatch::from_case_sensitive(config.subtract.case_sensitive);
    let result = subtract_asymmetric_with(&base_table, &exclude_table, policy)?;

    write_records(&result.surviving_records, output, false)
        .context("Subtraction result was computed but could not be saved")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("✓ Initial rows: {}", result.initial_count);
        println!("✓ Remaining rows: {}", result.remaining_count());
    }
    Ok(())
}

fn run_subtract_all(files: &[PathBuf], output: &Path, json: bool) -> Result<()> {
    let tables = load_tables(files, Layout::Named)?;
    let result = subtract_symmetric(&tables)?;

    write_records(&result.surviving_records, output, true)
        .context("Subtraction result was computed but could not be saved")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("✓ Total rows: {}", result.initial_count);
        println!("✓ Duplicate rows removed: {}", result.removed_count);
        println!("✓ Emails removed: {}", result.removed_emails.join(", "));
    }
    Ok(())
}

fn read_input_text(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read text from stdin")?;
        return Ok(text);
    }
    Ok(load_raw_text(input)?)
}

fn run_text_to_csv(input: &Path, output: &Path, format: TextFormat, json: bool) -> Result<()> {
    let text = read_input_text(input)?;
    let records = match format {
        TextFormat::Quoted => parse_quoted_pairs(&text)?,
        TextFormat::Semicolon => {
            if text.trim().is_empty() {
                return Err(ContactError::NoInput("no text provided".to_string()).into());
            }
            parse_semicolon_list(&text)
        }
    };

    write_records(&records, output, true)?;

    if json {
        println!("{}", entries_json(records.len()));
    } else {
        println!("✓ CSV file saved with {} entries", records.len());
    }
    Ok(())
}

fn entries_json(entries: usize) -> serde_json::Value {
    serde_json::json!({ "entries": entries })
}

fn run_repair(file: &Path, output: &Path, config: &PipelineConfig, json: bool) -> Result<()> {
    let records = load_table(file, Layout::Named)?.records()?;
    let (repaired, report) = RecordRepairer::with_config(config.repair.clone()).repair(&records);

    write_records(&repaired, output, true)
        .context("Repair completed but the result could not be saved")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("✓ Repair complete: {} of {} rows kept", repaired.len(), records.len());
        println!("{}", report.summary());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_to_csv_json_stats() {
        assert_eq!(entries_json(3).to_string(), r#"{"entries":3}"#);
    }
}
