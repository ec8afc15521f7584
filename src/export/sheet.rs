//! In-memory spreadsheet model filled by the exporter.
//!
//! The model only holds what an export needs: named worksheets made of rows of
//! typed cells, with an optional bold flag. Writing an `.xlsx` file is available
//! with the `xlsx` feature.

use log::warn;

use crate::schema::FieldValue;

/// Longest worksheet title spreadsheet applications accept
pub const MAX_TITLE_LEN: usize = 31;

const INVALID_TITLE_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// One cell of a worksheet
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Cell content
    pub value: FieldValue,
    /// Rendered in a bold font
    pub bold: bool,
}

impl Cell {
    /// Plain cell
    pub fn new(value: impl Into<FieldValue>) -> Self {
        Self {
            value: value.into(),
            bold: false,
        }
    }

    /// Bold cell, used for headers
    pub fn bold(value: impl Into<FieldValue>) -> Self {
        Self {
            value: value.into(),
            bold: true,
        }
    }
}

/// A titled sheet of rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Worksheet {
    title: String,
    rows: Vec<Vec<Cell>>,
}

impl Worksheet {
    /// Empty sheet; the title is made safe for spreadsheet applications
    pub fn new(title: &str) -> Self {
        Self {
            title: sanitize_title(title),
            rows: Vec::new(),
        }
    }

    /// Sheet title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Append a row after the last one
    pub fn append(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Rows in order
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of rows, header included
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// A set of worksheets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
}

impl Workbook {
    /// Workbook without sheets
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet and return it for filling
    pub fn create_sheet(&mut self, title: &str) -> &mut Worksheet {
        self.sheets.push(Worksheet::new(title));
        let last = self.sheets.len() - 1;
        &mut self.sheets[last]
    }

    /// Sheets in order
    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    /// Sheet by title
    pub fn sheet(&self, title: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|s| s.title == title)
    }

    /// Write the workbook to an `.xlsx` file
    #[cfg(feature = "xlsx")]
    pub fn save_xlsx<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), super::ExportError> {
        let mut workbook = self.to_xlsx()?;
        workbook.save(path.as_ref())?;
        Ok(())
    }

    /// Serialize the workbook to `.xlsx` bytes
    #[cfg(feature = "xlsx")]
    pub fn to_xlsx_buffer(&self) -> Result<Vec<u8>, super::ExportError> {
        let mut workbook = self.to_xlsx()?;
        Ok(workbook.save_to_buffer()?)
    }

    #[cfg(feature = "xlsx")]
    fn to_xlsx(&self) -> Result<rust_xlsxwriter::Workbook, rust_xlsxwriter::XlsxError> {
        use rust_xlsxwriter::{Format, XlsxError};

        let plain = Format::new();
        let bold = Format::new().set_bold();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let bold_date_format = Format::new().set_bold().set_num_format("yyyy-mm-dd");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.title)?;
            for (r, row) in sheet.rows.iter().enumerate() {
                let r = u32::try_from(r).map_err(|_| XlsxError::RowColumnLimitError)?;
                for (c, cell) in row.iter().enumerate() {
                    let c = u16::try_from(c).map_err(|_| XlsxError::RowColumnLimitError)?;
                    let format = if cell.bold { &bold } else { &plain };
                    match &cell.value {
                        FieldValue::Null => {}
                        FieldValue::Boolean(b) => {
                            worksheet.write_boolean_with_format(r, c, *b, format)?;
                        }
                        FieldValue::Number(_) | FieldValue::Integer(_) | FieldValue::Year(_) => {
                            let n = cell.value.as_f64().unwrap_or_default();
                            worksheet.write_number_with_format(r, c, n, format)?;
                        }
                        FieldValue::Date(d) => {
                            let format = if cell.bold { &bold_date_format } else { &date_format };
                            match excel_date(*d) {
                                Some(date) => {
                                    worksheet.write_datetime_with_format(r, c, &date, format)?;
                                }
                                None => {
                                    worksheet.write_string_with_format(r, c, d.to_string(), format)?;
                                }
                            }
                        }
                        other => {
                            worksheet.write_string_with_format(r, c, other.to_string(), format)?;
                        }
                    }
                }
            }
        }
        Ok(workbook)
    }
}

/// Dates before 1900 have no spreadsheet serial number
#[cfg(feature = "xlsx")]
fn excel_date(date: chrono::NaiveDate) -> Option<rust_xlsxwriter::ExcelDateTime> {
    use chrono::Datelike;
    let year = u16::try_from(date.year()).ok()?;
    let month = u8::try_from(date.month()).ok()?;
    let day = u8::try_from(date.day()).ok()?;
    rust_xlsxwriter::ExcelDateTime::from_ymd(year, month, day).ok()
}

/// Replace characters spreadsheet applications reject in sheet titles and
/// truncate to [`MAX_TITLE_LEN`] characters.
pub fn sanitize_title(title: &str) -> String {
    let mut cleaned: String = title
        .chars()
        .map(|c| if INVALID_TITLE_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_TITLE_LEN)
        .collect();
    cleaned = cleaned.trim_matches('\'').to_string();
    if cleaned.is_empty() {
        cleaned = "Sheet1".to_string();
    }
    if cleaned != title {
        warn!("Worksheet title '{}' changed to '{}'", title, cleaned);
    }
    cleaned
}
