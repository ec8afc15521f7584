use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use biosys_schema::record::Record;
use biosys_schema::report::check_records;
use biosys_schema::schema::Dataset;

/// Validate every record against the schema and print the report
pub fn run(schema: PathBuf, records: PathBuf, normalize: bool) -> Result<()> {
    let dataset = Dataset::from_file(&schema)
        .with_context(|| format!("Failed to load schema: {}", schema.display()))?;
    let generic = dataset
        .schema()
        .with_context(|| format!("Invalid schema: {}", schema.display()))?;

    let mut loaded = Record::from_file(&records)
        .with_context(|| format!("Failed to load records: {}", records.display()))?;
    info!("Loaded {} records from {}", loaded.len(), records.display());
    if normalize {
        loaded = loaded.iter().map(|r| generic.normalize_record(r)).collect();
    }

    let report = check_records(&dataset.name, &generic, &loaded);

    println!("{}", report.format_colored());

    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
