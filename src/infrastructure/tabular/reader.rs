use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use super::COLUMNS;
use crate::domain::{
    errors::DomainError,
    models::{Role, UserId, UserRecord, user::DATE_FORMAT},
};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Text formats tried, in order, for birthday cells that hold text.
const DATE_TEXT_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

static EMPTY_CELL: Cell = Cell::Empty;

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

/// Parses the first sheet of a workbook (xlsx, xls, ods) or comma-separated
/// text into records. Rows are taken as they are: missing cells become empty
/// fields and nothing is validated.
pub fn import_users(bytes: &[u8]) -> Result<Vec<UserRecord>, DomainError> {
    let rows = if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
        read_workbook(bytes)?
    } else {
        read_delimited(bytes)?
    };
    let users = rows_to_users(rows);
    debug!(count = users.len(), "parsed import rows");
    Ok(users)
}

fn read_workbook(bytes: &[u8]) -> Result<Vec<Vec<Cell>>, DomainError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| DomainError::Parse(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DomainError::Parse("workbook has no sheets".to_string()))?
        .map_err(|e| DomainError::Parse(e.to_string()))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect())
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        // calamine applies the workbook's date system (1900 or 1904)
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(stamp) => Cell::Date(stamp.date()),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        _ => Cell::Empty,
    }
}

fn read_delimited(bytes: &[u8]) -> Result<Vec<Vec<Cell>>, DomainError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|e| DomainError::Parse(e.to_string()))?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(String::from_utf8_lossy(field).into_owned())
                    }
                })
                .collect(),
        );
    }
    Ok(rows)
}

fn is_blank(row: &[Cell]) -> bool {
    row.iter().all(|c| match c {
        Cell::Empty => true,
        Cell::Text(s) => s.trim().is_empty(),
        _ => false,
    })
}

/// Column index of each known field, in `COLUMNS` order.
fn header_positions(header: &[Cell]) -> [Option<usize>; 6] {
    let mut positions = [None; 6];
    for (field, slot) in COLUMNS.iter().zip(positions.iter_mut()) {
        *slot = header
            .iter()
            .position(|cell| matches!(cell, Cell::Text(s) if s.trim() == *field));
    }
    positions
}

fn rows_to_users(rows: Vec<Vec<Cell>>) -> Vec<UserRecord> {
    let mut rows = rows.into_iter().skip_while(|row| is_blank(row));
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let [id_col, name_col, username_col, email_col, birthday_col, role_col] =
        header_positions(&header);

    let rows: Vec<Vec<Cell>> = rows.filter(|row| !is_blank(row)).collect();
    let ids: Vec<String> = rows
        .iter()
        .map(|row| cell_text(cell_in(row, id_col)).trim().to_string())
        .collect();

    // placeholders continue above the largest numeric id in the sheet
    let mut next_id = ids
        .iter()
        .filter_map(|id| id.parse::<u64>().ok())
        .max()
        .unwrap_or(0);

    rows.iter()
        .zip(ids)
        .map(|(row, id)| {
            let cell = |col: Option<usize>| cell_in(row, col);

            let id = if id.is_empty() {
                next_id = next_id.saturating_add(1);
                UserId::from(next_id)
            } else {
                UserId::new(id)
            };

            UserRecord {
                id,
                name: cell_text(cell(name_col)),
                username: cell_text(cell(username_col)),
                email: cell_text(cell(email_col)),
                birthday: normalize_birthday(cell(birthday_col)),
                role: normalize_role(cell(role_col)),
            }
        })
        .collect()
}

fn cell_in(row: &[Cell], col: Option<usize>) -> &Cell {
    col.and_then(|c| row.get(c)).unwrap_or(&EMPTY_CELL)
}

fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(s) => s.clone(),
        Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        Cell::Number(n) => n.to_string(),
        Cell::Bool(b) => b.to_string(),
        Cell::Date(date) => date.format(DATE_FORMAT).to_string(),
    }
}

fn normalize_role(cell: &Cell) -> Role {
    let text = cell_text(cell);
    if text.trim().is_empty() {
        return Role::default();
    }
    text.parse().unwrap_or_else(|err| {
        warn!("{err}; importing as {}", Role::default());
        Role::default()
    })
}

fn normalize_birthday(cell: &Cell) -> Option<NaiveDate> {
    let date = match cell {
        Cell::Empty | Cell::Bool(_) => return None,
        Cell::Date(date) => Some(*date),
        Cell::Number(serial) => serial_to_date(*serial),
        Cell::Text(text) => parse_date_text(text.trim()),
    };
    if date.is_none() {
        warn!(?cell, "birthday is not a recognisable date, leaving it empty");
    }
    date
}

/// Excel 1900 date system. Serials up to 60 sit before the phantom
/// 1900-02-29 and count from one day later.
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let days = serial.floor() as u64;
    let base = if days <= 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    base.checked_add_days(Days::new(days))
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    for format in DATE_TEXT_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(text, format) {
            return Some(stamp.date());
        }
    }
    text.parse::<f64>().ok().and_then(serial_to_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn two_row_sheet() {
        let csv = "id,name,username,email,birthday,role\n\
                   1,Ann,ann1,a@x.com,1990-05-01,Admin\n\
                   2,Bob,bob,b@x.com,1985-12-31,User\n";

        let users = import_users(csv.as_bytes()).unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, UserId::from(1));
        assert_eq!(users[0].birthday, date(1990, 5, 1));
        assert_eq!(users[1].role, Role::User);
    }

    #[test]
    fn empty_birthday_cell_yields_none() {
        let csv = "id,name,username,email,birthday,role\n3,Cy,cy,c@x.com,,Admin\n";
        let users = import_users(csv.as_bytes()).unwrap();
        assert_eq!(users[0].birthday, None);
        assert_eq!(users[0].role, Role::Admin);
    }

    #[test]
    fn missing_columns_and_cells_become_empty_fields() {
        let csv = "name,email\nDee\n,e@x.com\n";

        let users = import_users(csv.as_bytes()).unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "Dee");
        assert_eq!(users[0].email, "");
        assert_eq!(users[1].name, "");
        assert_eq!(users[1].email, "e@x.com");
        assert_eq!(users[1].username, "");
        assert_eq!(users[1].role, Role::User);
        // positional placeholders for missing ids
        assert_eq!(users[0].id, UserId::from(1));
        assert_eq!(users[1].id, UserId::from(2));
    }

    #[test]
    fn headers_are_case_sensitive_and_extra_columns_ignored() {
        let csv = "ID,Name,name,notes\n7,Wrong,Right,x\n";
        let users = import_users(csv.as_bytes()).unwrap();
        assert_eq!(users[0].name, "Right");
        assert_eq!(users[0].id, UserId::from(1));
    }

    #[test]
    fn blank_rows_are_skipped_and_bom_stripped() {
        let csv = "\u{feff}\n,,\nid,name\n\n1,Ann\n,,\n";
        let users = import_users(csv.as_bytes()).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Ann");
    }

    #[test]
    fn header_only_or_empty_input_is_empty() {
        assert!(import_users(b"").unwrap().is_empty());
        assert!(import_users(b"id,name,username,email,birthday,role\n").unwrap().is_empty());
    }

    #[test]
    fn unknown_role_falls_back_to_user() {
        let csv = "id,role\n1,superuser\n2,admin\n";
        let users = import_users(csv.as_bytes()).unwrap();
        assert_eq!(users[0].role, Role::User);
        assert_eq!(users[1].role, Role::Admin);
    }

    #[test]
    fn birthday_representations() {
        assert_eq!(normalize_birthday(&Cell::Number(32994.0)), date(1990, 5, 1));
        assert_eq!(normalize_birthday(&Cell::Number(32994.75)), date(1990, 5, 1));
        assert_eq!(normalize_birthday(&Cell::Number(1.0)), date(1900, 1, 1));
        assert_eq!(normalize_birthday(&Cell::Number(59.0)), date(1900, 2, 28));
        assert_eq!(normalize_birthday(&Cell::Number(61.0)), date(1900, 3, 1));
        assert_eq!(normalize_birthday(&Cell::Number(0.0)), None);

        for text in [
            "1990-05-01",
            "1990/05/01",
            "05/01/1990",
            "5/1/1990",
            "01.05.1990",
            "1990-05-01T10:00:00+02:00",
            "1990-05-01T00:00:00.000Z",
            "1990-05-01T00:00:00",
            "1990-05-01 08:30:00",
            "32994",
        ] {
            assert_eq!(
                normalize_birthday(&Cell::Text(text.into())),
                date(1990, 5, 1),
                "{text}"
            );
        }

        assert_eq!(normalize_birthday(&Cell::Text("someday".into())), None);
        assert_eq!(normalize_birthday(&Cell::Text("2023-02-30".into())), None);
        assert_eq!(normalize_birthday(&Cell::Empty), None);
    }

    #[test]
    fn numeric_ids_drop_the_fraction() {
        assert_eq!(cell_text(&Cell::Number(12.0)), "12");
        assert_eq!(cell_text(&Cell::Number(1.5)), "1.5");
    }

    #[test]
    fn placeholder_ids_skip_past_explicit_ids() {
        let csv = "id,name\n,Ann\n2,Bob\n,Cy\nabc,Dee\n";
        let users = import_users(csv.as_bytes()).unwrap();
        let ids: Vec<String> = users.iter().map(|u| u.id.to_string()).collect();
        assert_eq!(ids, ["3", "2", "4", "abc"]);
    }

    #[test]
    fn id_and_role_are_trimmed_but_text_fields_are_not() {
        let csv = "id,name,role\n 5 ,  Ann , admin \n";
        let users = import_users(csv.as_bytes()).unwrap();
        assert_eq!(users[0].id, UserId::from(5));
        assert_eq!(users[0].name, "  Ann ");
        assert_eq!(users[0].role, Role::Admin);
    }

    #[test]
    fn workbook_dates_follow_the_date_system() {
        use calamine::{ExcelDateTime, ExcelDateTimeType};

        let serial = |value, is_1904| {
            Data::DateTime(ExcelDateTime::new(value, ExcelDateTimeType::DateTime, is_1904))
        };
        let in_1900 = serial(32994.0, false);
        let in_1904 = serial(31532.0, true);

        assert_eq!(normalize_birthday(&cell_from_data(&in_1900)), date(1990, 5, 1));
        assert_eq!(normalize_birthday(&cell_from_data(&in_1904)), date(1990, 5, 1));
    }

    #[test]
    fn only_the_first_sheet_is_read() {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let birthday = ExcelDateTime::from_ymd(1990, 5, 1).unwrap();

        let first = workbook.add_worksheet();
        for (col, title) in COLUMNS.iter().enumerate() {
            first.write_string(0, col as u16, *title).unwrap();
        }
        first.write_number(1, 0, 1.0).unwrap();
        first.write_string(1, 1, "Ann").unwrap();
        first.write_string(1, 2, "ann1").unwrap();
        first.write_string(1, 3, "a@x.com").unwrap();
        first
            .write_datetime_with_format(1, 4, &birthday, &date_format)
            .unwrap();
        first.write_string(1, 5, "Admin").unwrap();

        let second = workbook.add_worksheet();
        second.write_string(0, 0, "id").unwrap();
        second.write_string(0, 1, "name").unwrap();
        second.write_number(1, 0, 9.0).unwrap();
        second.write_string(1, 1, "Other").unwrap();

        let bytes = workbook.save_to_buffer().unwrap();
        let users = import_users(&bytes).unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, UserId::from(1));
        assert_eq!(users[0].name, "Ann");
        assert_eq!(users[0].birthday, date(1990, 5, 1));
        assert_eq!(users[0].role, Role::Admin);
    }

    #[test]
    fn corrupt_workbook_is_a_parse_error() {
        let mut bytes = ZIP_MAGIC.to_vec();
        bytes.extend_from_slice(b"definitely not a zip archive");
        assert!(matches!(import_users(&bytes), Err(DomainError::Parse(_))));
    }
}
