//! Spreadsheet import and export of user records.
//!
//! Both directions use the same column set, named after the record fields:
//! `id,name,username,email,birthday,role`. Headers are matched
//! case-sensitively on import.

mod reader;
mod writer;

use std::path::Path;

use crate::domain::models::{UserRecord, user::DATE_FORMAT};

pub use reader::import_users;
pub use writer::export_users;

pub const COLUMNS: [&str; 6] = ["id", "name", "username", "email", "birthday", "role"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// `.xlsx` files get a workbook, anything else comma-separated text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => ExportFormat::Xlsx,
            _ => ExportFormat::Csv,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

fn user_row(user: &UserRecord) -> [String; 6] {
    [
        user.id.to_string(),
        user.name.clone(),
        user.username.clone(),
        user.email.clone(),
        user.birthday
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        user.role.to_string(),
    ]
}
