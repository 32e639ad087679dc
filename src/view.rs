//! Everything the dashboard table shows is derived here from the cached records:
//! filter, then search, then sort, then slice into a page.

use crate::data::student::StudentRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const ALLOWED_PAGE_SIZES: [usize; 4] = [5, 10, 20, 50];

/// Value the selectors use for "don't filter".
pub const NO_FILTER: &str = "All";

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Cache order.
    #[default]
    Unsorted,
    FirstName,
    LastName,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// The whole client-side state of the table, carried in the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub search: String,
    pub sort: SortKey,
    pub order: SortDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

impl TableQuery {
    pub fn gender_filter(&self) -> Option<&str> {
        selected(self.gender.as_deref())
    }

    pub fn department_filter(&self) -> Option<&str> {
        selected(self.department.as_deref())
    }

    pub fn current_page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    /// Falls back to `default` when the requested size isn't one we offer.
    pub fn page_size_or(&self, default: usize) -> usize {
        self.page_size
            .filter(|size| ALLOWED_PAGE_SIZES.contains(size))
            .unwrap_or(default)
    }

    pub fn at_page(&self, page: usize) -> Self {
        Self {
            page: Some(page),
            ..self.clone()
        }
    }
}

fn selected(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != NO_FILTER)
}

pub fn matches_filters(record: &StudentRecord, gender: Option<&str>, department: Option<&str>) -> bool {
    gender.is_none_or(|gender| record.gender == gender)
        && department.is_none_or(|department| record.department == department)
}

/// Plain substring match, whitespace included.
pub fn matches_search(record: &StudentRecord, search: &str) -> bool {
    let needle = search.to_lowercase();
    needle.is_empty()
        || record.first_name.to_lowercase().contains(&needle)
        || record.last_name.to_lowercase().contains(&needle)
}

fn compare(a: &StudentRecord, b: &StudentRecord, key: SortKey) -> Ordering {
    let (a, b) = match key {
        SortKey::Unsorted => return Ordering::Equal,
        SortKey::FirstName => (&a.first_name, &b.first_name),
        SortKey::LastName => (&a.last_name, &b.last_name),
    };
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Filters, searches and sorts, keeping cache order otherwise.
pub fn visible_records<'a>(records: &'a [StudentRecord], query: &TableQuery) -> Vec<&'a StudentRecord> {
    let gender = query.gender_filter();
    let department = query.department_filter();

    let mut visible: Vec<_> = records
        .iter()
        .filter(|record| matches_filters(record, gender, department))
        .filter(|record| matches_search(record, &query.search))
        .collect();

    if query.sort != SortKey::Unsorted {
        visible.sort_by(|a, b| compare(a, b, query.sort));
        if query.order == SortDirection::Desc {
            visible.reverse();
        }
    }

    visible
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub number: usize,
    pub size: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    /// Pages past the end come back empty rather than being clamped.
    pub fn slice(all: Vec<T>, number: usize, size: usize) -> Self {
        let number = number.max(1);
        let size = size.max(1);
        let total_items = all.len();

        let first = (number - 1).saturating_mul(size);
        let items = all.into_iter().skip(first).take(size).collect();

        Self {
            items,
            number,
            size,
            total_items,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.size).max(1)
    }

    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number.saturating_mul(self.size) < self.total_items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
