//! Listing filters, pagination and list responses

use serde::{Deserialize, Serialize};

use super::car::{Car, CarResponse};

/// Page size used when the client does not ask for one
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Upper bound on the page size
pub const MAX_PAGE_SIZE: u32 = 100;

/// Optional, independent search predicates combined with AND
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarFilters {
    /// Fragment of "year make model series"
    pub name: Option<String>,
    /// Exact VIN, case-insensitive
    pub vin: Option<String>,
    /// Fragment of the city or the branch
    pub location: Option<String>,
}

impl CarFilters {
    /// Build filters, dropping values that are blank once trimmed
    pub fn new(name: Option<&str>, vin: Option<&str>, location: Option<&str>) -> Self {
        Self {
            name: non_blank(name),
            vin: non_blank(vin),
            location: non_blank(location),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.vin.is_none() && self.location.is_none()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// 1-based page number and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Clamp a requested page into range: page >= 1, 1 <= limit <= MAX_PAGE_SIZE
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    /// ceil(total / limit)
    pub fn total_pages(&self, total: i64) -> i64 {
        let limit = self.limit as i64;
        (total.max(0) + limit - 1) / limit
    }
}

/// Query string of `GET /cars`
///
/// Everything arrives as text so that garbage falls back to defaults instead
/// of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarListParams {
    pub name: Option<String>,
    pub vin: Option<String>,
    pub location: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    #[serde(rename = "showInactive")]
    pub show_inactive: Option<String>,
}

impl CarListParams {
    pub fn filters(&self) -> CarFilters {
        CarFilters::new(
            self.name.as_deref(),
            self.vin.as_deref(),
            self.location.as_deref(),
        )
    }

    pub fn page_request(&self) -> PageRequest {
        let page = positive(self.page.as_deref()).unwrap_or(1);
        let limit = positive(self.limit.as_deref()).unwrap_or(DEFAULT_PAGE_SIZE);
        PageRequest::new(page, limit)
    }

    pub fn include_inactive(&self) -> bool {
        self.show_inactive
            .as_deref()
            .map(str::trim)
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
    }
}

fn positive(value: Option<&str>) -> Option<u32> {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v > 0)
}

/// One page of listing results
#[derive(Debug, Clone)]
pub struct CarPage {
    pub items: Vec<Car>,
    /// Matching rows before pagination
    pub total: i64,
    pub total_pages: i64,
    pub page: PageRequest,
}

/// Pagination block of the list response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub total: i64,
    pub total_pages: i64,
    pub current_page: u32,
    pub limit: u32,
}

/// Response for car listing with pagination
#[derive(Debug, Clone, Serialize)]
pub struct CarListResponse {
    pub data: Vec<CarResponse>,
    pub pagination: PaginationInfo,
}

impl From<CarPage> for CarListResponse {
    fn from(page: CarPage) -> Self {
        Self {
            pagination: PaginationInfo {
                total: page.total,
                total_pages: page.total_pages,
                current_page: page.page.page,
                limit: page.page.limit,
            },
            data: page.items.into_iter().map(CarResponse::from).collect(),
        }
    }
}
