//! Client-side filtering and aggregation of fetched lists
//!
//! The same filter is sent to the backend as query parameters and applied
//! again locally to the page that came back.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::api::QueryParams;
use crate::models::{Expense, OutstandingBalance, Salary, TuitionPayment};

/// What a record exposes to [`ListFilter`]
pub trait Filterable {
    /// Fields matched by the free-text search
    fn search_fields(&self) -> Vec<&str>;

    /// `None` when the record has no date dimension; date bounds then do
    /// not apply to it
    fn effective_date(&self) -> Option<NaiveDate> {
        None
    }

    fn amount(&self) -> Decimal;
}

/// Search text, inclusive date range and inclusive amount range
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub search: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    /// Server-side only
    pub current_year_only: bool,
}

impl ListFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches<T: Filterable>(&self, item: &T) -> bool {
        self.matches_search(item) && self.matches_date(item) && self.matches_amount(item)
    }

    fn matches_search<T: Filterable>(&self, item: &T) -> bool {
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || item
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
    }

    fn matches_date<T: Filterable>(&self, item: &T) -> bool {
        let Some(date) = item.effective_date() else {
            return true;
        };
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }

    fn matches_amount<T: Filterable>(&self, item: &T) -> bool {
        let amount = item.amount();
        self.min_amount.map_or(true, |min| amount >= min)
            && self.max_amount.map_or(true, |max| amount <= max)
    }

    pub fn apply<'a, T: Filterable>(&self, items: &'a [T]) -> FilteredList<'a, T> {
        FilteredList {
            items: items.iter().filter(|item| self.matches(*item)).collect(),
        }
    }

    /// Backend parameter names
    pub fn to_query_params(&self) -> QueryParams {
        let mut params = Vec::new();
        let search = self.search.trim();
        if !search.is_empty() {
            params.push(("search".to_string(), search.to_string()));
        }
        if let Some(start) = self.start {
            params.push(("date_after".to_string(), start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end {
            params.push(("date_before".to_string(), end.format("%Y-%m-%d").to_string()));
        }
        if let Some(min) = self.min_amount {
            params.push(("amount_min".to_string(), min.to_string()));
        }
        if let Some(max) = self.max_amount {
            params.push(("amount_max".to_string(), max.to_string()));
        }
        if self.current_year_only {
            params.push(("current_year_only".to_string(), "true".to_string()));
        }
        params
    }
}

/// Records that passed a filter
#[derive(Debug)]
pub struct FilteredList<'a, T> {
    items: Vec<&'a T>,
}

impl<'a, T: Filterable> FilteredList<'a, T> {
    pub fn items(&self) -> &[&'a T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.items.iter().map(|item| item.amount()).sum()
    }
}

impl Filterable for Salary {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.employee_name.as_str(), self.status.as_str()]
    }

    fn effective_date(&self) -> Option<NaiveDate> {
        self.period_start()
    }

    fn amount(&self) -> Decimal {
        self.net_salary
    }
}

impl Filterable for Expense {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.description.as_str(), self.category.as_str()]
    }

    fn effective_date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }

    fn amount(&self) -> Decimal {
        self.amount
    }
}

impl Filterable for OutstandingBalance {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.student_name.as_str(), self.student_matricule.as_str()]
    }

    fn amount(&self) -> Decimal {
        self.balance
    }
}

impl Filterable for TuitionPayment {
    fn search_fields(&self) -> Vec<&str> {
        [
            &self.student_name,
            &self.student_matricule,
            &self.reference,
            &self.status,
        ]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .collect()
    }

    fn effective_date(&self) -> Option<NaiveDate> {
        self.payment_date
    }

    fn amount(&self) -> Decimal {
        self.amount
    }
}
