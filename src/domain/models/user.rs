use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Store-assigned identity. The wire may carry it as a string or a number;
/// it is always held and sent as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_number(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Int(i64),
            Float(f64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => UserId(s),
            RawId::Int(n) => UserId(n.to_string()),
            RawId::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
                UserId(format!("{}", f as i64))
            }
            RawId::Float(f) => UserId(f.to_string()),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::User => "User",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role '{other}', expected Admin or User")),
        }
    }
}

/// A user as held in the collection and exchanged with the store.
///
/// `birthday` is `None` only for imported rows whose cell was empty or
/// could not be read as a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, with = "optional_date")]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub role: Role,
}

impl UserRecord {
    pub fn from_form(id: UserId, form: UserForm) -> Self {
        Self {
            id,
            name: form.name,
            username: form.username,
            email: form.email,
            birthday: Some(form.birthday),
            role: form.role,
        }
    }

    /// Form values for editing this record; `fallback_birthday` fills an
    /// absent date.
    pub fn to_form(&self, fallback_birthday: NaiveDate) -> UserForm {
        UserForm {
            name: self.name.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            birthday: self.birthday.unwrap_or(fallback_birthday),
            role: self.role,
        }
    }
}

/// Create payload. `id` is only a proposal; the store's answer wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub name: String,
    pub username: String,
    pub email: String,
    pub birthday: NaiveDate,
    pub role: Role,
}

impl NewUser {
    pub fn from_form(id: Option<UserId>, form: UserForm) -> Self {
        Self {
            id,
            name: form.name,
            username: form.username,
            email: form.email,
            birthday: form.birthday,
            role: form.role,
        }
    }

    pub fn into_record(self, id: UserId) -> UserRecord {
        UserRecord {
            id,
            name: self.name,
            username: self.username,
            email: self.email,
            birthday: Some(self.birthday),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    pub name: String,
    pub username: String,
    pub email: String,
    pub birthday: NaiveDate,
    pub role: Role,
}

mod optional_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DATE_FORMAT;

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&date.format(DATE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        // stores that keep full timestamps still start with the date
        let date_part = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, DATE_FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}
