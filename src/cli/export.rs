use anyhow::{bail, Context, Result};
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use biosys_schema::export::{BionetExporter, ExportStats, Exporter, Workbook};
use biosys_schema::record::Record;
use biosys_schema::schema::Dataset;

use super::config::Config;
use super::FormatArg;

/// Arguments of the export command
pub struct ExportArgs {
    pub schema: PathBuf,
    pub records: PathBuf,
    pub output: Option<PathBuf>,
    pub format: Option<FormatArg>,
    pub bionet: bool,
    pub cast: bool,
    pub name: Option<String>,
    pub normalize: bool,
    pub config: Option<PathBuf>,
}

/// Export records as CSV or XLSX
pub fn run(args: ExportArgs) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let settings = config.export;

    let dataset = Dataset::from_file(&args.schema)
        .with_context(|| format!("Failed to load schema: {}", args.schema.display()))?;
    let schema = dataset
        .schema()
        .with_context(|| format!("Invalid schema: {}", args.schema.display()))?;

    let mut records = Record::from_file(&args.records)
        .with_context(|| format!("Failed to load records: {}", args.records.display()))?;
    if args.normalize {
        records = records.iter().map(|r| schema.normalize_record(r)).collect();
    }

    // flags override the config file
    let name = args
        .name
        .or(settings.dataset_name.clone())
        .unwrap_or_else(|| dataset.name.clone());
    let bionet = args.bionet || settings.bionet.unwrap_or(false);
    let cast = args.cast || settings.cast.unwrap_or(false);
    let format = resolve_format(args.format, args.output.as_deref());
    let mapping = settings.mapping_funcs()?;

    info!(
        "Exporting {} records of '{}' as {:?}{}",
        records.len(),
        name,
        format,
        if bionet { " (bionet)" } else { "" }
    );

    let exporter = if bionet {
        Export::Bionet(
            BionetExporter::with_mapping(name, schema, records, mapping).with_csv_cast(cast),
        )
    } else {
        Export::Default(Exporter::new(name, schema, records, mapping).with_csv_cast(cast))
    };

    match format {
        FormatArg::Csv => {
            let stats = match &args.output {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    exporter.to_csv(BufWriter::new(file))?
                }
                None => exporter.to_csv(io::stdout().lock())?,
            };
            if stats.cells_uncast > 0 {
                eprintln!(
                    "{} cells could not be cast and were exported as is",
                    stats.cells_uncast
                );
            }
        }
        FormatArg::Xlsx => {
            let Some(path) = &args.output else {
                bail!("XLSX export needs an output file (-o)");
            };
            save_workbook(&exporter.to_workbook(), path)?;
        }
    }
    Ok(())
}

enum Export {
    Default(Exporter),
    Bionet(BionetExporter),
}

impl Export {
    fn to_csv<W: Write>(&self, writer: W) -> Result<ExportStats> {
        let stats = match self {
            Export::Default(e) => e.to_csv(writer),
            Export::Bionet(e) => e.to_csv(writer),
        };
        stats.context("Failed to write CSV")
    }

    fn to_workbook(&self) -> Workbook {
        match self {
            Export::Default(e) => e.to_workbook(),
            Export::Bionet(e) => e.to_workbook(),
        }
    }
}

fn resolve_format(format: Option<FormatArg>, output: Option<&Path>) -> FormatArg {
    if let Some(format) = format {
        return format;
    }
    let is_xlsx = output
        .and_then(Path::extension)
        .map(|ext| ext.eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false);
    if is_xlsx {
        FormatArg::Xlsx
    } else {
        FormatArg::Csv
    }
}

#[cfg(feature = "xlsx")]
fn save_workbook(workbook: &Workbook, path: &Path) -> Result<()> {
    workbook
        .save_xlsx(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(not(feature = "xlsx"))]
fn save_workbook(_workbook: &Workbook, path: &Path) -> Result<()> {
    bail!(
        "Cannot write {}: XLSX export requires the 'xlsx' feature",
        path.display()
    )
}
