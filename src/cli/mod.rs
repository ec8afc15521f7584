use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod check;
mod export;
mod validate;

mod config;

/// biosys - schema checks, record validation and exports for survey datasets
#[derive(Parser)]
#[command(name = "biosys")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Output format of the export command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Comma separated values
    Csv,
    /// Excel workbook (requires the xlsx feature)
    Xlsx,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a schema descriptor or data package
    Check {
        /// Schema descriptor or data package (JSON)
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Skip the observation date and location checks
        #[arg(long)]
        generic: bool,
    },

    /// Validate records against a schema
    Validate {
        /// Schema descriptor or data package (JSON)
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Records file (.json or .csv)
        #[arg(value_name = "RECORDS")]
        records: PathBuf,

        /// Rename columns matching a field alias to the field name first
        #[arg(long)]
        normalize: bool,
    },

    /// Export records as CSV or XLSX
    Export {
        /// Schema descriptor or data package (JSON)
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Records file (.json or .csv)
        #[arg(value_name = "RECORDS")]
        records: PathBuf,

        /// Output file (CSV goes to stdout when omitted)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Output format (defaults to the output extension, then csv)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Produce the bionet flavour of the export
        #[arg(long)]
        bionet: bool,

        /// Cast CSV cells instead of writing raw values
        #[arg(long)]
        cast: bool,

        /// Dataset name used as the worksheet title
        #[arg(long)]
        name: Option<String>,

        /// Rename columns matching a field alias to the field name first
        #[arg(long)]
        normalize: bool,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Check { schema, generic } => check::run(schema, generic),
        Commands::Validate {
            schema,
            records,
            normalize,
        } => validate::run(schema, records, normalize),
        Commands::Export {
            schema,
            records,
            output,
            format,
            bionet,
            cast,
            name,
            normalize,
            config,
        } => export::run(export::ExportArgs {
            schema,
            records,
            output,
            format,
            bionet,
            cast,
            name,
            normalize,
            config,
        }),
    }
}
