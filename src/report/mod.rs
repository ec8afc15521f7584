//! # Validation Reports
//!
//! Human readable reports for schema descriptors and record sets.
//!
//! ## Checks
//!
//! 1. **Schema**: the descriptor builds, field names are unique, biosys tags are
//!    recognised and, for observation datasets, the observation date, latitude
//!    and longitude fields resolve
//! 2. **Records**: every record casts cleanly against the schema; columns the
//!    schema does not know about are reported as warnings
//!
//! ## Usage
//!
//! ```rust,no_run
//! use biosys_schema::report::check_schema;
//! use biosys_schema::schema::Dataset;
//!
//! let dataset = Dataset::from_file("fauna.json")?;
//! let report = check_schema(&dataset, true);
//! println!("{}", report);
//! # Ok::<(), biosys_schema::schema::SchemaError>(())
//! ```

mod checks;

#[cfg(test)]
mod tests;

use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;

pub use checks::{check_records, check_schema};

/// Result status of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed
    Ok,
    /// Check passed with warnings
    Warning(String),
    /// Check failed
    Failed(String),
}

impl CheckStatus {
    fn is_ok(&self) -> bool {
        matches!(self, CheckStatus::Ok)
    }

    fn is_warning(&self) -> bool {
        matches!(self, CheckStatus::Warning(_))
    }

    fn is_failed(&self) -> bool {
        matches!(self, CheckStatus::Failed(_))
    }
}

/// One named check and its outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationCheck {
    /// What was checked
    pub name: String,
    /// Outcome
    pub status: CheckStatus,
}

impl ValidationCheck {
    pub(crate) fn ok(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Ok,
        }
    }

    pub(crate) fn warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Warning(message.into()),
        }
    }

    pub(crate) fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Failed(message.into()),
        }
    }
}

/// Checks run against one dataset
#[derive(Debug)]
pub struct ValidationReport {
    /// Report heading, e.g. "Schema Report"
    pub title: String,
    /// Dataset the checks ran against
    pub dataset: String,
    /// Individual check results in the order they ran
    pub checks: Vec<ValidationCheck>,
}

impl ValidationReport {
    /// Empty report
    pub fn new(title: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            dataset: dataset.into(),
            checks: Vec::new(),
        }
    }

    /// Add a check result
    pub fn add_check(&mut self, check: ValidationCheck) {
        self.checks.push(check);
    }

    /// Any check failed
    pub fn has_failures(&self) -> bool {
        self.checks.iter().any(|c| c.status.is_failed())
    }

    /// Any check warned
    pub fn has_warnings(&self) -> bool {
        self.checks.iter().any(|c| c.status.is_warning())
    }

    /// Number of passed checks
    pub fn success_count(&self) -> usize {
        self.checks.iter().filter(|c| c.status.is_ok()).count()
    }

    /// Number of warnings
    pub fn warning_count(&self) -> usize {
        self.checks.iter().filter(|c| c.status.is_warning()).count()
    }

    /// Number of failures
    pub fn failure_count(&self) -> usize {
        self.checks.iter().filter(|c| c.status.is_failed()).count()
    }

    /// Format the report with colors (plain text without `colorized_output`)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            use console::Emoji;

            static OK: Emoji<'_, '_> = Emoji("✓", "[OK]");
            static WARN: Emoji<'_, '_> = Emoji("⚠", "[WARN]");
            static FAIL: Emoji<'_, '_> = Emoji("✗", "[FAIL]");

            let rule = "=".repeat(self.title.chars().count());
            let mut output = String::new();
            output.push_str(&format!("{}\n", style(&self.title).bold().cyan()));
            output.push_str(&format!("{}\n", style(rule).cyan()));
            output.push_str(&format!("{}: {}\n\n", style("Dataset").bold(), self.dataset));

            for check in &self.checks {
                match &check.status {
                    CheckStatus::Ok => {
                        output.push_str(&format!("[{}] {}\n", OK, style(&check.name).green()));
                    }
                    CheckStatus::Warning(msg) => {
                        output.push_str(&format!(
                            "[{}] {} - {}: {}\n",
                            WARN,
                            style(&check.name).yellow(),
                            style("WARNING").yellow().bold(),
                            msg
                        ));
                    }
                    CheckStatus::Failed(msg) => {
                        output.push_str(&format!(
                            "[{}] {} - {}: {}\n",
                            FAIL,
                            style(&check.name).red(),
                            style("FAILED").red().bold(),
                            msg
                        ));
                    }
                }
            }

            output.push('\n');
            output.push_str(&format!(
                "{}: {} passed, {} warnings, {} failed\n\n",
                style("Summary").bold(),
                style(self.success_count()).green(),
                style(self.warning_count()).yellow(),
                style(self.failure_count()).red()
            ));
            let verdict = self.verdict();
            let verdict = if self.has_failures() {
                style(verdict).red().bold()
            } else if self.has_warnings() {
                style(verdict).yellow().bold()
            } else {
                style(verdict).green().bold()
            };
            output.push_str(&format!("{}\n", verdict));
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            self.to_string()
        }
    }

    fn verdict(&self) -> &'static str {
        if self.has_failures() {
            "Validation FAILED"
        } else if self.has_warnings() {
            "Validation PASSED with warnings"
        } else {
            "Validation PASSED"
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.chars().count()))?;
        writeln!(f, "Dataset: {}", self.dataset)?;
        writeln!(f)?;

        for check in &self.checks {
            match &check.status {
                CheckStatus::Ok => writeln!(f, "[✓] {}", check.name)?,
                CheckStatus::Warning(msg) => writeln!(f, "[⚠] {} - WARNING: {}", check.name, msg)?,
                CheckStatus::Failed(msg) => writeln!(f, "[✗] {} - FAILED: {}", check.name, msg)?,
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "Summary: {} passed, {} warnings, {} failed",
            self.success_count(),
            self.warning_count(),
            self.failure_count()
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.verdict())
    }
}
