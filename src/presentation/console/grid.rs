use crate::domain::models::{UserRecord, user::DATE_FORMAT};

const HEADERS: [&str; 6] = ["ID", "Name", "Username", "Email", "Birthday", "Role"];

fn cells(user: &UserRecord) -> [String; 6] {
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

/// Renders the collection as a fixed-width text table.
pub fn render_grid(users: &[UserRecord]) -> String {
    let rows: Vec<[String; 6]> = users.iter().map(cells).collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |values: &[&str]| -> String {
        values
            .iter()
            .zip(widths.iter())
            .map(|(value, &width)| format!("{value:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(&HEADERS[..]));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for row in &rows {
        let values: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&line(&values[..]));
        out.push('\n');
    }
    if rows.is_empty() {
        out.push_str("(no users)\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::models::{Role, UserId};

    #[test]
    fn columns_are_aligned() {
        let users = vec![UserRecord {
            id: UserId::from(1),
            name: "Ann".into(),
            username: "ann1".into(),
            email: "a@x.com".into(),
            birthday: NaiveDate::from_ymd_opt(1990, 5, 1),
            role: Role::Admin,
        }];

        let grid = render_grid(&users);
        let lines: Vec<&str> = grid.lines().collect();

        assert_eq!(lines[0], "ID | Name | Username | Email   | Birthday   | Role");
        assert_eq!(lines[2], "1  | Ann  | ann1     | a@x.com | 1990-05-01 | Admin");
    }

    #[test]
    fn empty_collection_says_so() {
        assert!(render_grid(&[]).ends_with("(no users)\n"));
    }
}
