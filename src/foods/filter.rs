//! Builds the "available foods" filter from the optional `sort` and `search`
//! query-string parameters.

use serde::Deserialize;
use std::cmp::Ordering;
use utoipa::IntoParams;

use super::models::{Food, FoodStatus};

/// Raw query-string parameters of the available-listings endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailableQuery {
    /// `asc` sorts by expiry ascending; any other value sorts descending.
    pub sort: Option<String>,
    /// Case-insensitive substring of the food name.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn from_param(value: &str) -> Self {
        if value == "asc" {
            Self::Ascending
        } else {
            Self::Descending
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableFilter {
    pub status: FoodStatus,
    pub name_contains: Option<String>,
    pub expiry_order: Option<SortOrder>,
}

impl AvailableFilter {
    #[must_use]
    pub fn from_query(query: &AvailableQuery) -> Self {
        Self {
            status: FoodStatus::Available,
            name_contains: query
                .search
                .as_deref()
                .filter(|term| !term.is_empty())
                .map(str::to_string),
            expiry_order: query
                .sort
                .as_deref()
                .filter(|sort| !sort.is_empty())
                .map(SortOrder::from_param),
        }
    }

    /// In-process evaluation of the filter, used by the in-memory store.
    #[must_use]
    pub fn matches(&self, food: &Food) -> bool {
        if food.status != self.status {
            return false;
        }
        match &self.name_contains {
            Some(term) => food
                .food_name
                .to_lowercase()
                .contains(&term.to_lowercase()),
            None => true,
        }
    }

    /// Expiry ordering with the document-store convention: missing values sort lowest.
    #[must_use]
    pub fn compare(&self, left: &Food, right: &Food) -> Ordering {
        match self.expiry_order {
            Some(SortOrder::Ascending) => left.expired_date_time.cmp(&right.expired_date_time),
            Some(SortOrder::Descending) => right.expired_date_time.cmp(&left.expired_date_time),
            None => Ordering::Equal,
        }
    }

    /// `ILIKE` pattern for the name clause, with wildcard characters in the term escaped.
    #[must_use]
    pub fn name_pattern(&self) -> Option<String> {
        self.name_contains
            .as_deref()
            .map(|term| format!("%{}%", escape_like(term)))
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foods::models::{FoodId, FoodListing, Timestamp};
    use chrono::{TimeZone, Utc};

    fn query(sort: Option<&str>, search: Option<&str>) -> AvailableQuery {
        AvailableQuery {
            sort: sort.map(str::to_string),
            search: search.map(str::to_string),
        }
    }

    fn food(name: &str, status: FoodStatus, day: Option<u32>) -> Food {
        Food::from_listing(
            FoodId::new(),
            FoodListing {
                food_name: name.to_string(),
                status,
                expired_date_time: day
                    .and_then(|day| Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).single())
                    .map(Timestamp::from_instant),
                ..FoodListing::default()
            },
        )
    }

    #[test]
    fn empty_query_only_restricts_status() {
        let filter = AvailableFilter::from_query(&AvailableQuery::default());
        assert_eq!(filter.status, FoodStatus::Available);
        assert_eq!(filter.name_contains, None);
        assert_eq!(filter.expiry_order, None);
        assert!(filter.matches(&food("Soup", FoodStatus::Available, None)));
        assert!(!filter.matches(&food("Soup", FoodStatus::Requested, None)));
    }

    #[test]
    fn sort_other_than_asc_is_descending() {
        let asc = AvailableFilter::from_query(&query(Some("asc"), None));
        assert_eq!(asc.expiry_order, Some(SortOrder::Ascending));
        for value in ["desc", "ASC", "random"] {
            let filter = AvailableFilter::from_query(&query(Some(value), None));
            assert_eq!(filter.expiry_order, Some(SortOrder::Descending), "{value}");
        }
    }

    #[test]
    fn blank_search_is_ignored() {
        let filter = AvailableFilter::from_query(&query(None, Some("")));
        assert_eq!(filter.name_contains, None);
        assert_eq!(filter.name_pattern(), None);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let filter = AvailableFilter::from_query(&query(None, Some("BRE")));
        assert!(filter.matches(&food("Fresh bread", FoodStatus::Available, None)));
        assert!(!filter.matches(&food("Rice", FoodStatus::Available, None)));
        assert!(!filter.matches(&food("Bread", FoodStatus::Cancelled, None)));
    }

    #[test]
    fn compare_inverts_between_directions() {
        let early = food("A", FoodStatus::Available, Some(1));
        let late = food("B", FoodStatus::Available, Some(9));
        let asc = AvailableFilter::from_query(&query(Some("asc"), None));
        let desc = AvailableFilter::from_query(&query(Some("desc"), None));
        assert_eq!(asc.compare(&early, &late), Ordering::Less);
        assert_eq!(desc.compare(&early, &late), Ordering::Greater);

        let undated = food("C", FoodStatus::Available, None);
        assert_eq!(asc.compare(&undated, &early), Ordering::Less);
    }

    #[test]
    fn name_pattern_escapes_wildcards() {
        let filter = AvailableFilter::from_query(&query(None, Some("50%_off\\")));
        assert_eq!(filter.name_pattern().as_deref(), Some("%50\\%\\_off\\\\%"));
    }
}
