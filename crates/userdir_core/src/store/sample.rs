//! Demo records installed into an empty directory.

use crate::model::user::{Gender, User, UserFields, UserId};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

struct SampleUser {
    first_name: &'static str,
    last_name: &'static str,
    gender: Gender,
    born: (i32, u32, u32),
    city: &'static str,
    phone: &'static str,
    email: &'static str,
    created: (i32, u32, u32),
    last_login: (i32, u32, u32),
}

const SAMPLE_USERS: &[SampleUser] = &[
    SampleUser {
        first_name: "John",
        last_name: "Doe",
        gender: Gender::Male,
        born: (1990, 5, 15),
        city: "New York",
        phone: "+1234567890",
        email: "john.doe@example.com",
        created: (2023, 1, 15),
        last_login: (2024, 1, 20),
    },
    SampleUser {
        first_name: "Jane",
        last_name: "Smith",
        gender: Gender::Female,
        born: (1985, 8, 22),
        city: "Los Angeles",
        phone: "+1987654321",
        email: "jane.smith@example.com",
        created: (2023, 2, 10),
        last_login: (2024, 1, 19),
    },
    SampleUser {
        first_name: "Michael",
        last_name: "Johnson",
        gender: Gender::Male,
        born: (1992, 12, 3),
        city: "Chicago",
        phone: "+1555123456",
        email: "michael.johnson@example.com",
        created: (2023, 3, 5),
        last_login: (2024, 1, 18),
    },
];

/// Builds the sample users, drawing one fresh id per record from `next_id`.
pub(super) fn sample_users(mut next_id: impl FnMut() -> UserId) -> Vec<User> {
    SAMPLE_USERS
        .iter()
        .filter_map(|sample| {
            let (y, m, d) = sample.born;
            let fields = UserFields {
                first_name: sample.first_name.to_string(),
                last_name: sample.last_name.to_string(),
                gender: sample.gender,
                date_of_birth: NaiveDate::from_ymd_opt(y, m, d)?,
                city: Some(sample.city.to_string()),
                phone: sample.phone.to_string(),
                email: sample.email.to_string(),
            };
            let mut user = User::from_fields(next_id(), fields, midnight(sample.created)?);
            user.last_login = midnight(sample.last_login);
            Some(user)
        })
        .collect()
}

fn midnight((y, m, d): (i32, u32, u32)) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).single()
}
