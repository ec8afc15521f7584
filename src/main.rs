//! # biosys
//!
//! Command-line front end for biosys dataset schemas.
//!
//! ## Usage
//!
//! ```bash
//! # Check that a schema resolves its observation date and location fields
//! biosys check fauna.json
//!
//! # Validate records against the schema
//! biosys validate fauna.json records.csv
//!
//! # Export records for a bionet import
//! biosys export fauna.json records.json --bionet -o bionet.csv
//!
//! # Export a workbook (requires the xlsx feature)
//! biosys export fauna.json records.json -o fauna.xlsx --config biosys.toml
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
