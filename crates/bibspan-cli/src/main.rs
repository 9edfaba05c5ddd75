use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use bibspan_core::TextRecord;

/// Harvest bibliographic records from COinS spans and XML metadata
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Only log errors
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Harvest every COinS span from one or more HTML pages
    Scan {
        /// HTML files to scan
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Path to output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a MODS XML document into a record
    Mods {
        /// MODS XML file
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Path to output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a Dublin Core XML document into a record
    Dc {
        /// Dublin Core XML file
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Path to output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    /// One key=value&... line per record
    Kev,
    /// A JSON array of records
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "error" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Scan {
            files,
            format,
            output,
        } => scan(&files, format, output),
        Command::Mods {
            file,
            format,
            output,
        } => convert(&file, format, output, bibspan_xml::mods::read),
        Command::Dc {
            file,
            format,
            output,
        } => convert(&file, format, output, bibspan_xml::dc::read),
    }
}

fn scan(
    files: &[PathBuf],
    format: Option<OutputFormat>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut records = Vec::new();
    for path in files {
        if !path.exists() {
            anyhow::bail!("input file not found: {}", path.display());
        }
        let html = std::fs::read_to_string(path)?;
        let found = bibspan_html::harvest(&html);
        tracing::debug!(path = %path.display(), records = found.len(), "scanned page");
        records.extend(found);
    }

    let mut writer = open_writer(output.as_deref())?;
    emit(writer.as_mut(), &records, resolve_format(format))
}

fn convert(
    file: &Path,
    format: Option<OutputFormat>,
    output: Option<PathBuf>,
    read: fn(BufReader<File>) -> Result<TextRecord, bibspan_xml::XmlError>,
) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("input file not found: {}", file.display());
    }
    let record = read(BufReader::new(File::open(file)?))?;

    let mut writer = open_writer(output.as_deref())?;
    emit(writer.as_mut(), &[record], resolve_format(format))
}

/// Resolve the output format: CLI flag > BIBSPAN_FORMAT env var > kev.
fn resolve_format(flag: Option<OutputFormat>) -> OutputFormat {
    flag.or_else(|| {
        std::env::var("BIBSPAN_FORMAT")
            .ok()
            .and_then(|v| match v.to_lowercase().as_str() {
                "kev" => Some(OutputFormat::Kev),
                "json" => Some(OutputFormat::Json),
                _ => None,
            })
    })
    .unwrap_or(OutputFormat::Kev)
}

fn open_writer(output: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(if let Some(output_path) = output {
        Box::new(File::create(output_path)?)
    } else {
        Box::new(std::io::stdout())
    })
}

fn emit(
    writer: &mut dyn Write,
    records: &[TextRecord],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Kev => {
            for record in records {
                writeln!(writer, "{record}")?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, records)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
