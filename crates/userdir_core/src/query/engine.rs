//! Query evaluation over a borrowed user slice.
//!
//! # Responsibility
//! - Filter, order and window records for `UserStore::query`.
//!
//! # Invariants
//! - Filters are AND-ed; inside `search_term` the fields are OR-ed.
//! - Text matching is case-insensitive, except phone which is matched verbatim.
//! - Only records on the returned page are cloned.

use super::{PageRequest, QueryPage, SortDirection, SortField, UserFilters, UserSort};
use crate::model::user::User;
use std::cmp::Ordering;

/// Runs filter, sort and pagination over `users`, cloning only the records
/// on the requested page.
pub fn run_query(
    users: &[User],
    filters: &UserFilters,
    sort: &UserSort,
    page: &PageRequest,
) -> QueryPage<User> {
    let filters = LoweredFilters::new(filters);
    let mut matched: Vec<(String, &User)> = users
        .iter()
        .filter(|user| filters.matches(user))
        .map(|user| (sort_key(user, sort.field), user))
        .collect();

    matched.sort_by(|(left, _), (right, _)| directed(left.cmp(right), sort.direction));

    let total = matched.len();
    let records = matched
        .into_iter()
        .skip(page.start())
        .take(page.page_size.max(1))
        .map(|(_, user)| user.clone())
        .collect();

    QueryPage { records, total }
}

/// Whether `user` satisfies every non-empty criterion in `filters`.
pub fn matches_filters(user: &User, filters: &UserFilters) -> bool {
    LoweredFilters::new(filters).matches(user)
}

/// Lowercased projection compared when sorting by `field`.
pub fn sort_key(user: &User, field: SortField) -> String {
    match field {
        SortField::Name => user.full_name().to_lowercase(),
        SortField::Email => user.email.to_lowercase(),
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

// Filters lowercased once per query rather than once per record.
struct LoweredFilters {
    search_raw: String,
    search: String,
    name: String,
    email: String,
}

impl LoweredFilters {
    fn new(filters: &UserFilters) -> Self {
        Self {
            search_raw: filters.search_term.clone(),
            search: filters.search_term.to_lowercase(),
            name: filters.name_filter.to_lowercase(),
            email: filters.email_filter.to_lowercase(),
        }
    }

    fn matches(&self, user: &User) -> bool {
        self.matches_search(user) && self.matches_name(user) && self.matches_email(user)
    }

    fn matches_search(&self, user: &User) -> bool {
        if self.search.is_empty() {
            return true;
        }
        user.first_name.to_lowercase().contains(&self.search)
            || user.last_name.to_lowercase().contains(&self.search)
            || user.email.to_lowercase().contains(&self.search)
            // Phone is matched verbatim against the term as typed.
            || user.phone.contains(&self.search_raw)
    }

    fn matches_name(&self, user: &User) -> bool {
        self.name.is_empty() || user.full_name().to_lowercase().contains(&self.name)
    }

    fn matches_email(&self, user: &User) -> bool {
        self.email.is_empty() || user.email.to_lowercase().contains(&self.email)
    }
}
