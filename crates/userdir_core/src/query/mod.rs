//! In-memory query over a user snapshot: filter, sort, then paginate.
//!
//! # Responsibility
//! - Define filter, sort and page request shapes used by list views.
//! - Evaluate them as pure functions over a borrowed slice.
//!
//! # Invariants
//! - `total` counts matches before pagination.
//! - Out-of-range pages yield an empty page, never an error.
//! - Sorting is stable, so equal keys keep snapshot order.

mod engine;

pub use engine::{matches_filters, run_query, sort_key};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Optional text filters; an empty string places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilters {
    /// Case-insensitive match on first name, last name or email; substring
    /// match on phone.
    pub search_term: String,
    /// Case-insensitive match on `"first last"`.
    pub name_filter: String,
    /// Case-insensitive match on email.
    pub email_filter: String,
}

impl UserFilters {
    pub fn is_empty(&self) -> bool {
        self.search_term.is_empty() && self.name_filter.is_empty() && self.email_filter.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// `"first last"`.
    Name,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl UserSort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Switches between name and email, keeping the direction.
    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            SortField::Name => SortField::Email,
            SortField::Email => SortField::Name,
        };
    }

    pub fn toggle_direction(&mut self) {
        self.direction = self.direction.reversed();
    }
}

/// The list view opens sorted by name, descending.
impl Default for UserSort {
    fn default() -> Self {
        Self {
            field: SortField::Name,
            direction: SortDirection::Desc,
        }
    }
}

/// 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    /// `page` 0 is read as page 1 and `page_size` 0 as 1.
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn first(page_size: usize) -> Self {
        Self::new(1, page_size)
    }

    /// Zero-based index of the first record on this page.
    pub fn start(&self) -> usize {
        self.page
            .max(1)
            .saturating_sub(1)
            .saturating_mul(self.page_size.max(1))
    }

    /// Page to show after one record was removed from a result set that
    /// held `total_before` records: steps back when this trailing page
    /// would become empty, never below page 1.
    pub fn after_removal(&self, total_before: usize) -> Self {
        let remaining = total_before.saturating_sub(1);
        if self.page > 1 && remaining <= self.start() {
            Self::new(self.page - 1, self.page_size)
        } else {
            *self
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPage<T> {
    pub records: Vec<T>,
    /// Matching records before pagination.
    pub total: usize,
}

impl<T> QueryPage<T> {
    /// Number of pages needed to show `total` records at `page_size`.
    pub fn page_count(&self, page_size: usize) -> usize {
        self.total.div_ceil(page_size.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::{PageRequest, QueryPage, SortDirection, SortField, UserSort};

    #[test]
    fn default_sort_is_name_descending() {
        let sort = UserSort::default();
        assert_eq!(sort.field, SortField::Name);
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn toggles_flip_one_axis_each() {
        let mut sort = UserSort::default();
        sort.toggle_field();
        assert_eq!(sort, UserSort::new(SortField::Email, SortDirection::Desc));
        sort.toggle_direction();
        assert_eq!(sort, UserSort::new(SortField::Email, SortDirection::Asc));
    }

    #[test]
    fn page_request_clamps_zero_values() {
        let request = PageRequest::new(0, 0);
        assert_eq!(request, PageRequest::new(1, 1));
        assert_eq!(request.start(), 0);
        assert_eq!(PageRequest::new(3, 10).start(), 20);
    }

    #[test]
    fn after_removal_steps_back_from_emptied_trailing_page() {
        // 21 records, page 3 holds exactly one.
        let page = PageRequest::new(3, 10);
        assert_eq!(page.after_removal(21), PageRequest::new(2, 10));
        assert_eq!(page.after_removal(25), page);
        assert_eq!(PageRequest::first(10).after_removal(1), PageRequest::first(10));
    }

    #[test]
    fn page_count_rounds_up() {
        let page: QueryPage<()> = QueryPage {
            records: Vec::new(),
            total: 21,
        };
        assert_eq!(page.page_count(10), 3);
        assert_eq!(page.page_count(7), 3);
        let empty: QueryPage<()> = QueryPage {
            records: Vec::new(),
            total: 0,
        };
        assert_eq!(empty.page_count(10), 0);
    }
}
