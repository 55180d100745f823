use log::info;
use rust_xlsxwriter::{Workbook, XlsxError};
use std::path::Path;
use thiserror::Error;

use crate::entry::Entry;
use crate::labels;

/// Export failure
///
/// None of these touch stored entries.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{}", labels::NOTHING_TO_EXPORT)]
    Empty,

    #[error("xlsx generation failed: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("csv generation failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("writing export failed: {0}")]
    Io(#[from] std::io::Error),
}

/// One data row of an export, in column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    /// 1-based position in the exported list
    pub index: usize,
    pub full_name: String,
    pub id_number: String,
    pub phone: String,
    /// Localized gender label
    pub gender: &'static str,
}

impl ExportRow {
    fn fields(&self) -> [String; 5] {
        [
            self.index.to_string(),
            self.full_name.clone(),
            self.id_number.clone(),
            self.phone.clone(),
            self.gender.to_string(),
        ]
    }
}

/// Build the export table for a list of entries
///
/// Rows follow the order of `entries` and are numbered from 1.
///
/// # Arguments
/// * `entries` - Entries to export, in display order
///
/// # Returns
/// * `Result<Vec<ExportRow>, ExportError>` - One row per entry, or `ExportError::Empty`
pub fn export_rows(entries: &[Entry]) -> Result<Vec<ExportRow>, ExportError> {
    if entries.is_empty() {
        return Err(ExportError::Empty);
    }

    Ok(entries
        .iter()
        .enumerate()
        .map(|(i, entry)| ExportRow {
            index: i + 1,
            full_name: entry.full_name.clone(),
            id_number: entry.id_number.clone(),
            phone: entry.phone.clone(),
            gender: entry.gender.label(),
        })
        .collect())
}

/// Convert entries to XLSX format
///
/// Produces a workbook with a single sheet: the localized header row followed
/// by one row per entry. The index column is numeric; ID numbers and phones
/// are written as text so leading zeros survive.
///
/// # Arguments
/// * `entries` - Entries to export
///
/// # Returns
/// * `Result<Vec<u8>, ExportError>` - XLSX file content as bytes or an error
///
/// # Examples
/// ```
/// use registration::downloader::{to_xlsx, ExportError};
///
/// assert!(matches!(to_xlsx(&[]), Err(ExportError::Empty)));
/// ```
pub fn to_xlsx(entries: &[Entry]) -> Result<Vec<u8>, ExportError> {
    let rows = export_rows(entries)?;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(labels::SHEET_NAME)?;
    worksheet.set_right_to_left(true);

    for (col, title) in labels::EXPORT_HEADER.iter().enumerate() {
        worksheet.write_string(0, col as u16, *title)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_number(r, 0, row.index as f64)?;
        worksheet.write_string(r, 1, row.full_name.as_str())?;
        worksheet.write_string(r, 2, row.id_number.as_str())?;
        worksheet.write_string(r, 3, row.phone.as_str())?;
        worksheet.write_string(r, 4, row.gender)?;
    }

    let buffer = workbook.save_to_buffer()?;
    info!("Exported {} entries to xlsx ({} bytes)", rows.len(), buffer.len());

    Ok(buffer)
}

/// Convert entries to CSV format, with the same header and columns as the workbook
pub fn to_csv(entries: &[Entry]) -> Result<String, ExportError> {
    let rows = export_rows(entries)?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(labels::EXPORT_HEADER)?;
    for row in &rows {
        writer.write_record(row.fields())?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    info!("Exported {} entries to csv", rows.len());

    // Every field went in as UTF-8
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write the XLSX export to `path`
///
/// Fails with `ExportError::Empty` before touching the filesystem when there
/// is nothing to export.
pub fn export_spreadsheet(entries: &[Entry], path: &Path) -> Result<(), ExportError> {
    let buffer = to_xlsx(entries)?;
    std::fs::write(path, buffer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Gender;
    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn sample() -> Vec<Entry> {
        vec![
            Entry {
                full_name: "Ahmed Ali".to_string(),
                id_number: "01234567890123".to_string(),
                phone: "01012345678".to_string(),
                gender: Gender::Male,
            },
            Entry {
                full_name: "منى حسن".to_string(),
                id_number: "29901011234567".to_string(),
                phone: "01198765432".to_string(),
                gender: Gender::Female,
            },
        ]
    }

    #[test]
    fn test_rows_are_numbered_in_order() {
        let rows = export_rows(&sample()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].full_name, "Ahmed Ali");
        assert_eq!(rows[1].index, 2);
        assert_eq!(rows[1].gender, labels::FEMALE);
    }

    #[test]
    fn test_empty_export_fails() {
        assert!(matches!(export_rows(&[]), Err(ExportError::Empty)));
        assert!(matches!(to_csv(&[]), Err(ExportError::Empty)));
        assert_eq!(ExportError::Empty.to_string(), labels::NOTHING_TO_EXPORT);
    }

    #[test]
    fn test_empty_export_writes_no_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xlsx");

        assert!(matches!(export_spreadsheet(&[], &path), Err(ExportError::Empty)));
        assert!(!path.exists());
    }

    #[test]
    fn test_xlsx_has_header_and_two_rows() {
        let bytes = to_xlsx(&sample()).unwrap();
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range(labels::SHEET_NAME).unwrap();

        let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
        assert_eq!(rows.len(), 3);

        let header: Vec<String> = rows[0].iter().map(|c| c.to_string()).collect();
        assert_eq!(header, labels::EXPORT_HEADER);

        assert_eq!(rows[1][0], Data::Float(1.0));
        assert_eq!(rows[1][1], Data::String("Ahmed Ali".to_string()));
        assert_eq!(rows[1][2], Data::String("01234567890123".to_string()));
        assert_eq!(rows[1][3], Data::String("01012345678".to_string()));
        assert_eq!(rows[1][4], Data::String(labels::MALE.to_string()));

        assert_eq!(rows[2][0], Data::Float(2.0));
        assert_eq!(rows[2][1], Data::String("منى حسن".to_string()));
        assert_eq!(rows[2][4], Data::String(labels::FEMALE.to_string()));
    }

    #[test]
    fn test_export_spreadsheet_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(labels::EXPORT_FILE_NAME);

        export_spreadsheet(&sample(), &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_csv_columns() {
        let csv = to_csv(&sample()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "#,الاسم الكامل,رقم الهوية,رقم الهاتف,الجنس");
        assert_eq!(lines[1], "1,Ahmed Ali,01234567890123,01012345678,ذكر");
        assert_eq!(lines[2], "2,منى حسن,29901011234567,01198765432,أنثى");
    }
}
