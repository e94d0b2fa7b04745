//! User directory record.
//!
//! # Responsibility
//! - Define the stored `User` shape and the editable `UserFields` subset.
//! - Own the persisted JSON wire names (camelCase).
//!
//! # Invariants
//! - `id` and `date_created` are assigned by the store and never change.
//! - `last_login` is carried through untouched; nothing in core sets it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Stable user identifier. Opaque text so that ids from older blobs load.
pub type UserId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when text is not one of the enumerated genders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGender(pub String);

impl Display for UnknownGender {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown gender `{}`; expected Male|Female", self.0)
    }
}

impl std::error::Error for UnknownGender {}

impl FromStr for Gender {
    type Err = UnknownGender;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Male" => Ok(Self::Male),
            "Female" => Ok(Self::Female),
            other => Err(UnknownGender(other.to_string())),
        }
    }
}

/// Editable part of a user, as submitted by the create/edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub city: Option<String>,
    pub phone: String,
    pub email: String,
}

/// Stored user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    /// Written as `YYYY-MM-DD`; full timestamps are accepted on read.
    #[serde(deserialize_with = "deserialize_birth_date")]
    pub date_of_birth: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub phone: String,
    pub email: String,
    pub date_created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Builds a fresh record from already-validated fields.
    pub fn from_fields(id: UserId, fields: UserFields, date_created: DateTime<Utc>) -> Self {
        Self {
            id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            gender: fields.gender,
            date_of_birth: fields.date_of_birth,
            city: normalize_city(fields.city),
            phone: fields.phone,
            email: fields.email,
            date_created,
            last_login: None,
        }
    }

    /// Replaces every mutable attribute; `id`, `date_created` and
    /// `last_login` are kept.
    pub fn apply_fields(&mut self, fields: UserFields) {
        self.first_name = fields.first_name;
        self.last_name = fields.last_name;
        self.gender = fields.gender;
        self.date_of_birth = fields.date_of_birth;
        self.city = normalize_city(fields.city);
        self.phone = fields.phone;
        self.email = fields.email;
    }

    /// `"first last"`, the projection used by name filtering and sorting.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Current editable values, e.g. to pre-fill an edit form.
    pub fn fields(&self) -> UserFields {
        UserFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            gender: self.gender,
            date_of_birth: self.date_of_birth,
            city: self.city.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
        }
    }
}

// The form submits an empty string for a blank city.
fn normalize_city(city: Option<String>) -> Option<String> {
    city.filter(|value| !value.trim().is_empty())
}

fn deserialize_birth_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_birth_date(&raw).map_err(serde::de::Error::custom)
}

/// Parses `YYYY-MM-DD` or an RFC 3339 timestamp (date part in UTC).
pub fn parse_birth_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|timestamp| timestamp.with_timezone(&Utc).date_naive())
        .map_err(|_| format!("invalid date of birth `{trimmed}`"))
}

#[cfg(test)]
mod tests {
    use super::{parse_birth_date, Gender, User, UserFields};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn fields() -> UserFields {
        UserFields {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            gender: Gender::Female,
            date_of_birth: NaiveDate::from_ymd_opt(1990, 12, 10).unwrap(),
            city: Some("  ".to_string()),
            phone: "+44 20 7946 0000".to_string(),
            email: "ada@example.org".to_string(),
        }
    }

    #[test]
    fn blank_city_is_stored_as_none() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let user = User::from_fields("u1".to_string(), fields(), created);
        assert_eq!(user.city, None);
        assert_eq!(user.full_name(), "Ada Lovelace");
    }

    #[test]
    fn apply_fields_keeps_identity_and_creation_time() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut user = User::from_fields("u1".to_string(), fields(), created);

        let mut changed = fields();
        changed.first_name = "Augusta".to_string();
        changed.city = Some("London".to_string());
        user.apply_fields(changed);

        assert_eq!(user.id, "u1");
        assert_eq!(user.date_created, created);
        assert_eq!(user.first_name, "Augusta");
        assert_eq!(user.city.as_deref(), Some("London"));
    }

    #[test]
    fn parse_birth_date_accepts_plain_and_timestamp_forms() {
        let expected = NaiveDate::from_ymd_opt(1990, 5, 15).unwrap();
        assert_eq!(parse_birth_date("1990-05-15").unwrap(), expected);
        assert_eq!(
            parse_birth_date("1990-05-15T00:00:00.000Z").unwrap(),
            expected
        );
        assert!(parse_birth_date("15/05/1990").is_err());
    }

    #[test]
    fn gender_parses_only_enumerated_values() {
        assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
        assert!("female".parse::<Gender>().is_err());
        assert!("".parse::<Gender>().is_err());
    }
}
