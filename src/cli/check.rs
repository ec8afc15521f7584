use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use biosys_schema::report::check_schema;
use biosys_schema::schema::Dataset;

/// Check a schema descriptor and print the report
pub fn run(schema: PathBuf, generic: bool) -> Result<()> {
    info!("Checking schema {}", schema.display());

    let dataset = Dataset::from_file(&schema)
        .with_context(|| format!("Failed to load schema: {}", schema.display()))?;
    let report = check_schema(&dataset, !generic);

    println!("{}", report.format_colored());

    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
