use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::property::{AvailabilityPeriod, PaymentType, Property};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    Name,
    Location,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Catalog query: substring filters, exact term and activity filters, sorting and paging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyFilter {
    pub name: Option<String>,
    pub location: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub availability_period: Option<AvailabilityPeriod>,
    pub is_active: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

impl PropertyFilter {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }

    /// Case-insensitive substring match on name/location, exact match on terms and the activity flag.
    pub fn matches(&self, property: &Property) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            needle
                .as_ref()
                .map_or(true, |n| haystack.to_lowercase().contains(&n.to_lowercase()))
        }

        contains(&property.name, &self.name)
            && contains(&property.location, &self.location)
            && self.payment_type.map_or(true, |t| property.payment_type == t)
            && self.availability_period.map_or(true, |p| property.availability_period == p)
            && self.is_active.map_or(true, |active| property.is_active == active)
    }

    pub fn compare(&self, a: &Property, b: &Property) -> Ordering {
        let ordering = match self.sort_by.unwrap_or_default() {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Name => a.name.cmp(&b.name),
            SortField::Location => a.location.cmp(&b.location),
        };
        match self.sort_order.unwrap_or_default() {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(limit.max(1)));
        Self { page, limit, total, total_pages }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
