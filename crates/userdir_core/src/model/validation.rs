//! Field validity rules applied at create and update.
//!
//! # Responsibility
//! - Keep every rule as a named, pure predicate in one fixed table.
//! - Report all failing fields at once, one rule per field.
//!
//! # Invariants
//! - Rules never read the clock; "today" is an explicit argument.
//! - For a given field, only the first failing rule is reported.

use crate::model::user::UserFields;
use chrono::{Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
pub const MAX_AGE_YEARS: u32 = 100;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9\s\-()]{10,}$").expect("valid phone regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("valid email regex"));

/// Validated attribute of a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    FirstName,
    LastName,
    DateOfBirth,
    Phone,
    Email,
}

impl UserField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::DateOfBirth => "dateOfBirth",
            Self::Phone => "phone",
            Self::Email => "email",
        }
    }
}

/// Which constraint a field broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRule {
    Required,
    Length { min: usize, max: usize },
    DateRange,
    PhoneShape,
    EmailShape,
}

impl Display for FieldRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => f.write_str("is required"),
            Self::Length { min, max } => write!(f, "must be {min}-{max} characters"),
            Self::DateRange => write!(
                f,
                "must be within the last {MAX_AGE_YEARS} years and not in the future"
            ),
            Self::PhoneShape => f.write_str("must be a valid phone number"),
            Self::EmailShape => f.write_str("must be a valid email address"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: UserField,
    pub rule: FieldRule,
}

/// One or more fields failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Returns the rule `field` failed, if it failed.
    pub fn rule_for(&self, field: UserField) -> Option<FieldRule> {
        self.violations
            .iter()
            .find(|violation| violation.field == field)
            .map(|violation| violation.rule)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("invalid user fields: ")?;
        for (index, violation) in self.violations.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{} {}", violation.field.as_str(), violation.rule)?;
        }
        Ok(())
    }
}

impl Error for ValidationError {}

struct NamedRule {
    field: UserField,
    rule: FieldRule,
    check: fn(&UserFields, NaiveDate) -> bool,
}

const NAME_LENGTH: FieldRule = FieldRule::Length {
    min: NAME_MIN_CHARS,
    max: NAME_MAX_CHARS,
};

const FIELD_RULES: &[NamedRule] = &[
    NamedRule {
        field: UserField::FirstName,
        rule: FieldRule::Required,
        check: |fields, _| is_present(&fields.first_name),
    },
    NamedRule {
        field: UserField::FirstName,
        rule: NAME_LENGTH,
        check: |fields, _| name_length_ok(&fields.first_name),
    },
    NamedRule {
        field: UserField::LastName,
        rule: FieldRule::Required,
        check: |fields, _| is_present(&fields.last_name),
    },
    NamedRule {
        field: UserField::LastName,
        rule: NAME_LENGTH,
        check: |fields, _| name_length_ok(&fields.last_name),
    },
    NamedRule {
        field: UserField::DateOfBirth,
        rule: FieldRule::DateRange,
        check: |fields, today| birth_date_in_range(fields.date_of_birth, today),
    },
    NamedRule {
        field: UserField::Phone,
        rule: FieldRule::Required,
        check: |fields, _| is_present(&fields.phone),
    },
    NamedRule {
        field: UserField::Phone,
        rule: FieldRule::PhoneShape,
        check: |fields, _| phone_shape_ok(&fields.phone),
    },
    NamedRule {
        field: UserField::Email,
        rule: FieldRule::Required,
        check: |fields, _| is_present(&fields.email),
    },
    NamedRule {
        field: UserField::Email,
        rule: FieldRule::EmailShape,
        check: |fields, _| email_shape_ok(&fields.email),
    },
];

/// Checks `fields` against every rule, relative to `today`.
pub fn validate_fields(fields: &UserFields, today: NaiveDate) -> Result<(), ValidationError> {
    let mut violations: Vec<FieldViolation> = Vec::new();
    for named in FIELD_RULES {
        if violations.iter().any(|v| v.field == named.field) {
            continue;
        }
        if !(named.check)(fields, today) {
            violations.push(FieldViolation {
                field: named.field,
                rule: named.rule,
            });
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn name_length_ok(value: &str) -> bool {
    (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&value.chars().count())
}

/// Inclusive on both ends: exactly 100 years ago and today both pass.
pub fn birth_date_in_range(date: NaiveDate, today: NaiveDate) -> bool {
    let earliest = today
        .checked_sub_months(Months::new(MAX_AGE_YEARS * 12))
        .unwrap_or(NaiveDate::MIN);
    earliest <= date && date <= today
}

pub fn phone_shape_ok(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

pub fn email_shape_ok(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}
