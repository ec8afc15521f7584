use std::fmt;

use super::CellOutcome;

/// Statistics from a completed export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Number of record rows written, headers and marker rows excluded
    pub rows_written: usize,
    /// Cells written as a typed value
    pub cells_typed: usize,
    /// Cells left as their raw value because casting or mapping failed
    pub cells_uncast: usize,
}

impl ExportStats {
    pub(crate) fn record_row(&mut self, row: &[CellOutcome]) {
        self.rows_written += 1;
        for cell in row {
            match cell {
                CellOutcome::Value(_) => self.cells_typed += 1,
                CellOutcome::Raw { error: Some(_), .. } => self.cells_uncast += 1,
                CellOutcome::Raw { error: None, .. } => {}
            }
        }
    }
}

impl fmt::Display for ExportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Exported {} rows ({} typed cells, {} cells left uncast)",
            self.rows_written, self.cells_typed, self.cells_uncast
        )
    }
}
