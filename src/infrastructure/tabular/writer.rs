use rust_xlsxwriter::{Format, Workbook, XlsxError};

use super::{COLUMNS, ExportFormat, user_row};
use crate::domain::{errors::DomainError, models::UserRecord};

const SHEET_NAME: &str = "Users";

/// Serializes the records, in order, under the standard header row.
pub fn export_users(users: &[UserRecord], format: ExportFormat) -> Result<Vec<u8>, DomainError> {
    match format {
        ExportFormat::Csv => write_csv(users),
        ExportFormat::Xlsx => write_xlsx(users).map_err(|e| DomainError::Export(e.to_string())),
    }
}

fn write_csv(users: &[UserRecord]) -> Result<Vec<u8>, DomainError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(COLUMNS)
        .map_err(|e| DomainError::Export(e.to_string()))?;
    for user in users {
        writer
            .write_record(user_row(user))
            .map_err(|e| DomainError::Export(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| DomainError::Export(e.to_string()))
}

fn write_xlsx(users: &[UserRecord]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;
        for (col, title) in COLUMNS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *title, &header)?;
        }
        for (index, user) in users.iter().enumerate() {
            let row = index as u32 + 1;
            for (col, value) in user_row(user).into_iter().enumerate() {
                if !value.is_empty() {
                    sheet.write_string(row, col as u16, value)?;
                }
            }
        }
    }
    workbook.save_to_buffer()
}
