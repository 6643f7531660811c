//! docfill CLI - DOCX template tag tool

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docfill::engine::to_json;
use docfill::{Docfill, JsonFormat, SubstitutionReport, ValueMap};

#[derive(Parser)]
#[command(name = "docfill")]
#[command(version)]
#[command(about = "List and fill {{tag}} placeholders in DOCX templates", long_about = None)]
struct Cli {
    /// Template file (lists its tags)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by commands that read templates.
#[derive(clap::Args, Clone, Copy)]
struct TemplateFlags {
    /// Also scan and fill footnotes and endnotes
    #[arg(long)]
    notes: bool,

    /// Skip textual entries that are not valid UTF-8
    #[arg(long, env = "DOCFILL_LENIENT")]
    lenient: bool,
}

impl TemplateFlags {
    fn builder(self) -> Docfill {
        let builder = Docfill::new().with_notes(self.notes);
        if self.lenient {
            builder.lenient()
        } else {
            builder
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the tags used by a template
    Tags {
        /// Template file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output JSON
        #[arg(long)]
        json: bool,

        /// Group tags by entry
        #[arg(long)]
        by_entry: bool,

        #[command(flatten)]
        flags: TemplateFlags,
    },

    /// Fill a template with values
    Fill {
        /// Template file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output document
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Value for a tag (repeatable)
        #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        set: Vec<(String, String)>,

        /// JSON object with tag values
        #[arg(long, value_name = "FILE")]
        values: Option<PathBuf>,

        /// Remove tags that have no value
        #[arg(long)]
        blank_unknown: bool,

        /// Insert values without XML escaping
        #[arg(long)]
        raw: bool,

        #[command(flatten)]
        flags: TemplateFlags,
    },

    /// Fill a template once per record of a JSON array
    Batch {
        /// Template file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// JSON array of value objects
        #[arg(short, long, value_name = "FILE")]
        records: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Record key used to name output files
        #[arg(long, value_name = "KEY")]
        name_key: Option<String>,

        /// Remove tags that have no value
        #[arg(long)]
        blank_unknown: bool,

        #[command(flatten)]
        flags: TemplateFlags,
    },

    /// Show template information
    Info {
        /// Template file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        flags: TemplateFlags,
    },

    /// Show version information
    Version,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Tags {
            input,
            json,
            by_entry,
            flags,
        }) => cmd_tags(&input, json, by_entry, flags),
        Some(Commands::Fill {
            input,
            output,
            set,
            values,
            blank_unknown,
            raw,
            flags,
        }) => cmd_fill(
            &input,
            &output,
            set,
            values.as_deref(),
            blank_unknown,
            raw,
            flags,
        ),
        Some(Commands::Batch {
            input,
            records,
            output,
            name_key,
            blank_unknown,
            flags,
        }) => cmd_batch(
            &input,
            &records,
            &output,
            name_key.as_deref(),
            blank_unknown,
            flags,
        ),
        Some(Commands::Info { input, flags }) => cmd_info(&input, flags),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: list tags if input is provided
            if let Some(input) = cli.input {
                cmd_tags(
                    &input,
                    false,
                    false,
                    TemplateFlags {
                        notes: false,
                        lenient: false,
                    },
                )
            } else {
                println!("{}", "Usage: docfill <FILE>".yellow());
                println!("       docfill --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_tags(
    input: &Path,
    json: bool,
    by_entry: bool,
    flags: TemplateFlags,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut template = flags.builder().open(input)?;

    if by_entry {
        let report = template.scan()?;
        if json {
            println!("{}", to_json(&report, JsonFormat::Pretty)?);
            return Ok(());
        }
        for entry in &report.entries {
            println!("{}", entry.name.cyan().bold());
            if entry.tags.is_empty() {
                println!("  {}", "(no tags)".dimmed());
            }
            for tag in &entry.tags {
                println!("  {}", tag);
            }
        }
        for name in &report.skipped_entries {
            println!("{} {}", "Skipped".yellow(), name);
        }
        return Ok(());
    }

    let tags = template.tags()?;
    if json {
        println!("{}", to_json(&tags, JsonFormat::Pretty)?);
    } else if tags.is_empty() {
        println!("{}", "No tags found".yellow());
    } else {
        for tag in &tags {
            println!("{}", tag);
        }
    }

    Ok(())
}

fn load_values(path: &Path) -> Result<ValueMap, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    Ok(ValueMap::from_json_str(&text)?)
}

fn print_report(report: &SubstitutionReport) {
    if report.qualifying_entries == 0 {
        println!(
            "{} template has no textual entries; output is an unchanged copy",
            "Warning:".yellow().bold()
        );
    }
    for name in &report.skipped_entries {
        println!("{} {}", "Skipped".yellow(), name);
    }
    if !report.unresolved.is_empty() {
        println!(
            "{} no value for {}",
            "Warning:".yellow().bold(),
            report.unresolved
        );
    }
}

fn cmd_fill(
    input: &Path,
    output: &Path,
    set: Vec<(String, String)>,
    values_file: Option<&Path>,
    blank_unknown: bool,
    raw: bool,
    flags: TemplateFlags,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut values = match values_file {
        Some(path) => load_values(path)?,
        None => ValueMap::new(),
    };
    for (key, value) in set {
        values.insert(key, value);
    }

    let mut builder = flags.builder();
    if blank_unknown {
        builder = builder.blank_unmatched();
    }
    if raw {
        builder = builder.raw_values();
    }

    let mut template = builder.open(input)?;
    let report = template.fill(&values, output)?;

    print_report(&report);
    println!(
        "{} {} ({} replacements)",
        "Saved to".green(),
        output.display(),
        report.replacements
    );

    Ok(())
}

/// File name for one batch record, distinct from every name in `used`.
///
/// Records whose labels clean up to the same text get `_2`, `_3`... suffixes
/// instead of overwriting each other.
fn record_file_name(
    stem: &str,
    index: usize,
    record: &ValueMap,
    name_key: Option<&str>,
    used: &mut HashSet<String>,
) -> String {
    let label = name_key
        .and_then(|key| record.get(key))
        .map(|v| {
            v.chars()
                .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
                .collect::<String>()
        })
        .filter(|v| !v.trim_matches('_').is_empty());

    let base = match label {
        Some(label) => format!("{}_{}", stem, label),
        None => format!("{}_{:03}", stem, index + 1),
    };

    let mut name = format!("{}.docx", base);
    let mut suffix = 2;
    while !used.insert(name.clone()) {
        name = format!("{}_{}.docx", base, suffix);
        suffix += 1;
    }
    name
}

fn cmd_batch(
    input: &Path,
    records_path: &Path,
    output_dir: &Path,
    name_key: Option<&str>,
    blank_unknown: bool,
    flags: TemplateFlags,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(records_path)?;
    let json: serde_json::Value = serde_json::from_str(&text)?;
    let records = json
        .as_array()
        .ok_or("records file must contain a JSON array")?
        .iter()
        .map(ValueMap::from_json_value)
        .collect::<docfill::Result<Vec<_>>>()?;

    fs::create_dir_all(output_dir)?;

    let mut builder = flags.builder();
    if blank_unknown {
        builder = builder.blank_unmatched();
    }
    let mut template = builder.open(input)?;
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut used = HashSet::new();
    let mut incomplete = 0;
    for (index, record) in records.iter().enumerate() {
        let name = record_file_name(&stem, index, record, name_key, &mut used);
        pb.set_message(name.clone());
        let report = template.fill(record, output_dir.join(&name))?;
        if !report.is_complete() {
            log::warn!("{}: no value for {}", name, report.unresolved);
            incomplete += 1;
        }
        pb.inc(1);
    }

    pb.finish_with_message("Done!");

    println!(
        "\n{} {} documents written to {}",
        "Done!".green().bold(),
        records.len(),
        output_dir.display()
    );
    if incomplete > 0 {
        println!(
            "{} {} documents have tags without a value",
            "Warning:".yellow().bold(),
            incomplete
        );
    }

    Ok(())
}

fn cmd_info(input: &Path, flags: TemplateFlags) -> Result<(), Box<dyn std::error::Error>> {
    let mut template = flags.builder().open(input)?;
    let report = template.scan()?;
    let container = template.container();

    println!("{}", "Template Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {:?}", "Package".bold(), container.document_kind());
    println!("{}: {}", "Entries".bold(), container.len());
    println!("{}: {}", "Textual entries".bold(), report.entry_count());
    println!("{}: {}", "Tags".bold(), report.tags().len());

    println!();
    println!("{}", "Entries".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for entry in container.entries() {
        println!(
            "{:<40} {:>9} {:>10} B  {:?}",
            entry.name, entry.compression, entry.size, entry.kind
        );
    }

    println!();
    println!("{}", "Tags by Entry".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for entry in &report.entries {
        let tags = if entry.tags.is_empty() {
            "(none)".dimmed().to_string()
        } else {
            entry.tags.to_string()
        };
        println!("{}: {}", entry.name.bold(), tags);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docfill".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("DOCX template tag tool");
    println!();
    println!("License: MIT");
}
