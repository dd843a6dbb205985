//! Spreadsheet downloads. Each record becomes one row and each serialized
//! field one column, so the sheet mirrors whatever the record carries.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::Serialize;
use serde_json::{Map, Value};

pub const SHEET_NAME: &str = "Datos";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to serialize row: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to build workbook: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Rows flattened to cells under a shared header.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl SheetTable {
    /// Header is the union of field names in first-seen order. Non-object
    /// rows land in a single `value` column.
    pub fn from_records<T: Serialize>(records: &[T]) -> Result<Self, ExportError> {
        let objects = records
            .iter()
            .map(|record| -> Result<Map<String, Value>, ExportError> {
                match serde_json::to_value(record)? {
                    Value::Object(map) => Ok(map),
                    other => {
                        let mut map = Map::new();
                        map.insert("value".to_string(), other);
                        Ok(map)
                    }
                }
            })
            .collect::<Result<Vec<_>, ExportError>>()?;

        let mut headers: Vec<String> = Vec::new();
        for object in &objects {
            for key in object.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }

        let rows = objects
            .into_iter()
            .map(|mut object| {
                headers
                    .iter()
                    .map(|key| object.remove(key).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Ok(Self { headers, rows })
    }

    pub fn to_xlsx(&self) -> Result<Vec<u8>, ExportError> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col, header) in self.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
        }
        for (index, row) in self.rows.iter().enumerate() {
            let row_num = index as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Value::Null => {}
                    Value::Bool(value) => {
                        worksheet.write_boolean(row_num, col, *value)?;
                    }
                    Value::Number(number) => match number.as_f64() {
                        Some(value) => {
                            worksheet.write_number(row_num, col, value)?;
                        }
                        None => {
                            worksheet.write_string(row_num, col, number.to_string())?;
                        }
                    },
                    Value::String(text) => {
                        worksheet.write_string(row_num, col, text)?;
                    }
                    nested => {
                        worksheet.write_string(row_num, col, nested.to_string())?;
                    }
                }
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}

pub fn workbook_bytes<T: Serialize>(records: &[T]) -> Result<Vec<u8>, ExportError> {
    SheetTable::from_records(records)?.to_xlsx()
}

const FILENAME_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_');

/// `Content-Disposition` value for `{base}.xlsx`, with an ASCII fallback and
/// the exact UTF-8 name in `filename*`.
pub fn content_disposition(base: &str) -> String {
    let file_name = format!("{base}.xlsx");
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '.' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        utf8_percent_encode(&file_name, FILENAME_ESCAPE)
    )
}
